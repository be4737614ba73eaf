//! Build script for vportal-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates portal.toml at compile time
//! - Embeds the validated configuration as postcard bytes

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use vportal_core::config::{PortalConfig, CONFIG_VERSION};

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    setup_linker(&out_dir);
    let config = validate_config();
    embed_config(&out_dir, &config);
}

/// Set up linker search paths for memory.x
fn setup_linker(out_dir: &Path) {
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate portal.toml and decode it into a [`PortalConfig`]
fn validate_config() -> PortalConfig {
    println!("cargo:rerun-if-changed=portal.toml");

    let config_path = Path::new("portal.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: portal.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a portal.toml configuration file.         ║\n\
            ║  Please create one in the vportal-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read portal.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let value: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in portal.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    validate_fields(&value);

    let config: PortalConfig = match value.try_into() {
        Ok(config) => config,
        Err(e) => report_errors("Invalid portal configuration", &[e.to_string()]),
    };

    if let Err(e) = config.validate() {
        report_errors("Invalid portal configuration", &[format!("{:?}", e)]);
    }

    println!("cargo:warning=portal.toml validated successfully");
    config
}

/// Check required keys and ranges, collecting every problem
fn validate_fields(config: &toml::Value) {
    let mut errors = Vec::new();

    match config.get("version") {
        Some(toml::Value::Integer(v)) if *v == CONFIG_VERSION as i64 => {}
        Some(toml::Value::Integer(v)) => errors.push(format!(
            "version is {}, this firmware expects {}",
            v, CONFIG_VERSION
        )),
        Some(_) => errors.push("version must be an integer".to_string()),
        None => errors.push("missing 'version'".to_string()),
    }

    check_range(config, "fade_tick_ms", 1, 100, &mut errors);
    check_range(config, "status_interval_ms", 1, 1000, &mut errors);

    if !errors.is_empty() {
        report_errors("Invalid portal configuration", &errors);
    }
}

fn check_range(config: &toml::Value, key: &str, min: i64, max: i64, errors: &mut Vec<String>) {
    match config.get(key) {
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => {}
        Some(toml::Value::Integer(_)) => errors.push(format!("{} must be {}-{}", key, min, max)),
        Some(_) => errors.push(format!("{} must be an integer", key)),
        None => errors.push(format!("missing '{}'", key)),
    }
}

/// Serialize the configuration into OUT_DIR for `include_bytes!`
fn embed_config(out_dir: &Path, config: &PortalConfig) {
    let bytes = match postcard::to_stdvec(config) {
        Ok(bytes) => bytes,
        Err(e) => report_errors("Failed to encode portal configuration", &[e.to_string()]),
    };
    fs::write(out_dir.join("portal.bin"), bytes).unwrap();
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn report_errors(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}
