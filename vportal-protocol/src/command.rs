//! Request frame decoding
//!
//! Every request starts with a single ASCII opcode byte. Decoding checks the
//! frame is long enough for the opcode's arguments and yields a typed
//! [`Command`], so the dispatcher can match over a closed set of variants.

use crate::{Block, BLOCK_SIZE, FRAME_SIZE, SLOT_INDEX_MASK};

/// Request opcodes understood by the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Opcode {
    /// Activate / deactivate the portal
    Activate = b'A',
    /// Set the ring color immediately
    Color = b'C',
    /// Set a lighting zone with a fade duration
    ZoneLight = b'J',
    /// Legacy light command (ring or backlight, no fade)
    Light = b'L',
    /// Speaker flag
    Speaker = b'M',
    /// Read one block of a token
    Query = b'Q',
    /// Reset the portal
    Reset = b'R',
    /// Status report
    Status = b'S',
    /// Accepted and ignored
    V = b'V',
    /// Write one block of a token
    Write = b'W',
    /// Accepted and ignored
    Z = b'Z',
}

impl Opcode {
    /// Get the opcode as its wire byte
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create an opcode from its wire byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            b'A' => Some(Opcode::Activate),
            b'C' => Some(Opcode::Color),
            b'J' => Some(Opcode::ZoneLight),
            b'L' => Some(Opcode::Light),
            b'M' => Some(Opcode::Speaker),
            b'Q' => Some(Opcode::Query),
            b'R' => Some(Opcode::Reset),
            b'S' => Some(Opcode::Status),
            b'V' => Some(Opcode::V),
            b'W' => Some(Opcode::Write),
            b'Z' => Some(Opcode::Z),
            _ => None,
        }
    }

    /// Minimum frame length (opcode included) this opcode needs
    ///
    /// `Light` needs more bytes depending on its side selector; see
    /// [`Command::parse`].
    pub fn min_len(self) -> usize {
        match self {
            Opcode::Activate | Opcode::Speaker | Opcode::Light => 2,
            Opcode::Query => 3,
            Opcode::Color => 4,
            Opcode::ZoneLight => 7,
            Opcode::Write => 3 + BLOCK_SIZE,
            Opcode::Reset | Opcode::Status | Opcode::V | Opcode::Z => 1,
        }
    }
}

/// Errors produced while decoding or executing a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// Frame contained no bytes at all
    Empty,
    /// Frame exceeds the protocol frame size
    Oversized { len: usize },
    /// Opcode byte is not part of the protocol
    UnknownOpcode(u8),
    /// Frame too short for its opcode
    Malformed { opcode: Opcode, len: usize, min: usize },
    /// Block index beyond the token's block count
    BlockOutOfRange { slot: u8, block: u8, count: usize },
}

/// An RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// All channels off
    pub const OFF: Rgb = Rgb::new(0, 0, 0);

    /// Create a color from its channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Read a color from three consecutive bytes
    fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    /// Channels as an array in R, G, B order
    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Zone addressed by the `J` command's side byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ZoneSelector {
    /// Side byte 0
    Right,
    /// Side byte 1
    Trap,
    /// Side byte 2
    Left,
    /// Any other side byte (recorded nowhere)
    Other(u8),
}

impl ZoneSelector {
    /// Decode the side byte
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => ZoneSelector::Right,
            1 => ZoneSelector::Trap,
            2 => ZoneSelector::Left,
            other => ZoneSelector::Other(other),
        }
    }
}

/// Decoded form of the legacy `L` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LegacyLight {
    /// Side 0 or 2: ring color, no fade
    Ring(Rgb),
    /// Side 1: backlight level
    Backlight(u8),
    /// Side 3: backlight fully on
    BacklightFull,
    /// Unused side byte
    Ignored(u8),
}

/// A decoded request
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `A`: set the active flag (raw byte is echoed back)
    Activate { raw: u8 },
    /// `C`: ring color with no fade
    Color(Rgb),
    /// `J`: zone color with a fade duration in milliseconds
    ZoneLight {
        zone: ZoneSelector,
        color: Rgb,
        delay_ms: u16,
    },
    /// `L`: legacy light command
    Light(LegacyLight),
    /// `M`: speaker flag (raw byte is echoed back)
    Speaker { raw: u8 },
    /// `Q`: read a block
    Query { slot: u8, block: u8 },
    /// `R`: reset
    Reset,
    /// `S`: status report
    Status,
    /// `V` / `Z`: accepted with no reply
    Ignored(Opcode),
    /// `W`: write a block
    Write { slot: u8, block: u8, data: Block },
}

impl Command {
    /// Decode a request frame
    ///
    /// Frames may be shorter than [`FRAME_SIZE`] as long as they carry the
    /// bytes the opcode reads.
    pub fn parse(frame: &[u8]) -> Result<Self, RequestError> {
        if frame.len() > FRAME_SIZE {
            return Err(RequestError::Oversized { len: frame.len() });
        }
        let &first = frame.first().ok_or(RequestError::Empty)?;
        let opcode = Opcode::from_u8(first).ok_or(RequestError::UnknownOpcode(first))?;
        require(opcode, frame, opcode.min_len())?;

        let command = match opcode {
            Opcode::Activate => Command::Activate { raw: frame[1] },
            Opcode::Color => Command::Color(Rgb::from_bytes(&frame[1..4])),
            Opcode::ZoneLight => Command::ZoneLight {
                zone: ZoneSelector::from_u8(frame[1]),
                color: Rgb::from_bytes(&frame[2..5]),
                delay_ms: u16::from_le_bytes([frame[5], frame[6]]),
            },
            Opcode::Light => Command::Light(match frame[1] {
                0 | 2 => {
                    require(opcode, frame, 5)?;
                    LegacyLight::Ring(Rgb::from_bytes(&frame[2..5]))
                }
                1 => {
                    require(opcode, frame, 3)?;
                    LegacyLight::Backlight(frame[2])
                }
                3 => LegacyLight::BacklightFull,
                other => LegacyLight::Ignored(other),
            }),
            Opcode::Speaker => Command::Speaker { raw: frame[1] },
            Opcode::Query => Command::Query {
                slot: frame[1] & SLOT_INDEX_MASK,
                block: frame[2],
            },
            Opcode::Reset => Command::Reset,
            Opcode::Status => Command::Status,
            Opcode::V | Opcode::Z => Command::Ignored(opcode),
            Opcode::Write => {
                let mut data = [0u8; BLOCK_SIZE];
                data.copy_from_slice(&frame[3..3 + BLOCK_SIZE]);
                Command::Write {
                    slot: frame[1] & SLOT_INDEX_MASK,
                    block: frame[2],
                    data,
                }
            }
        };

        Ok(command)
    }

    /// Opcode this command was decoded from
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::Activate { .. } => Opcode::Activate,
            Command::Color(_) => Opcode::Color,
            Command::ZoneLight { .. } => Opcode::ZoneLight,
            Command::Light(_) => Opcode::Light,
            Command::Speaker { .. } => Opcode::Speaker,
            Command::Query { .. } => Opcode::Query,
            Command::Reset => Opcode::Reset,
            Command::Status => Opcode::Status,
            Command::Ignored(opcode) => *opcode,
            Command::Write { .. } => Opcode::Write,
        }
    }
}

fn require(opcode: Opcode, frame: &[u8], min: usize) -> Result<(), RequestError> {
    if frame.len() < min {
        return Err(RequestError::Malformed {
            opcode,
            len: frame.len(),
            min,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(bytes: &[u8]) -> [u8; FRAME_SIZE] {
        let mut frame = [0u8; FRAME_SIZE];
        frame[..bytes.len()].copy_from_slice(bytes);
        frame
    }

    #[test]
    fn test_opcode_byte_mapping() {
        for byte in [b'A', b'C', b'J', b'L', b'M', b'Q', b'R', b'S', b'V', b'W', b'Z'] {
            let opcode = Opcode::from_u8(byte).unwrap();
            assert_eq!(opcode.as_u8(), byte);
        }
        assert_eq!(Opcode::from_u8(b'X'), None);
        assert_eq!(Opcode::from_u8(0), None);
    }

    #[test]
    fn test_parse_activate() {
        let cmd = Command::parse(&frame(&[b'A', 1])).unwrap();
        assert_eq!(cmd, Command::Activate { raw: 1 });
    }

    #[test]
    fn test_parse_zone_light_delay_little_endian() {
        // Sample from a host capture: left zone, green, 0x1000 ms
        let cmd = Command::parse(b"J\x02\x00\xff\x00\x00\x10").unwrap();
        assert_eq!(
            cmd,
            Command::ZoneLight {
                zone: ZoneSelector::Left,
                color: Rgb::new(0, 0xFF, 0),
                delay_ms: 0x1000,
            }
        );
    }

    #[test]
    fn test_parse_short_color_frame() {
        let cmd = Command::parse(b"C\xff\x00\x00").unwrap();
        assert_eq!(cmd, Command::Color(Rgb::new(0xFF, 0, 0)));
    }

    #[test]
    fn test_parse_legacy_light_sides() {
        assert_eq!(
            Command::parse(&frame(&[b'L', 0, 1, 2, 3])).unwrap(),
            Command::Light(LegacyLight::Ring(Rgb::new(1, 2, 3)))
        );
        assert_eq!(
            Command::parse(&frame(&[b'L', 2, 4, 5, 6])).unwrap(),
            Command::Light(LegacyLight::Ring(Rgb::new(4, 5, 6)))
        );
        assert_eq!(
            Command::parse(&frame(&[b'L', 1, 0x80])).unwrap(),
            Command::Light(LegacyLight::Backlight(0x80))
        );
        assert_eq!(
            Command::parse(&[b'L', 3]).unwrap(),
            Command::Light(LegacyLight::BacklightFull)
        );
        assert_eq!(
            Command::parse(&[b'L', 9]).unwrap(),
            Command::Light(LegacyLight::Ignored(9))
        );
    }

    #[test]
    fn test_parse_slot_uses_low_nibble() {
        let cmd = Command::parse(&frame(&[b'Q', 0x12, 7])).unwrap();
        assert_eq!(cmd, Command::Query { slot: 2, block: 7 });
    }

    #[test]
    fn test_parse_write_payload() {
        let mut bytes = [0u8; 19];
        bytes[0] = b'W';
        bytes[1] = 0x01;
        bytes[2] = 5;
        for (i, byte) in bytes[3..].iter_mut().enumerate() {
            *byte = i as u8 + 1;
        }
        match Command::parse(&bytes).unwrap() {
            Command::Write { slot, block, data } => {
                assert_eq!(slot, 1);
                assert_eq!(block, 5);
                assert_eq!(data[0], 1);
                assert_eq!(data[15], 16);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_opcode() {
        assert_eq!(
            Command::parse(&frame(&[b'X'])),
            Err(RequestError::UnknownOpcode(b'X'))
        );
    }

    #[test]
    fn test_empty_and_oversized_frames() {
        assert_eq!(Command::parse(&[]), Err(RequestError::Empty));
        let big = [b'S'; FRAME_SIZE + 1];
        assert_eq!(
            Command::parse(&big),
            Err(RequestError::Oversized { len: FRAME_SIZE + 1 })
        );
    }

    #[test]
    fn test_short_frames_are_malformed() {
        assert_eq!(
            Command::parse(&[b'W', 0, 1, 2]),
            Err(RequestError::Malformed {
                opcode: Opcode::Write,
                len: 4,
                min: 19,
            })
        );
        assert_eq!(
            Command::parse(&[b'J', 2, 0, 0]),
            Err(RequestError::Malformed {
                opcode: Opcode::ZoneLight,
                len: 4,
                min: 7,
            })
        );
        assert_eq!(
            Command::parse(&[b'L', 0, 1]),
            Err(RequestError::Malformed {
                opcode: Opcode::Light,
                len: 3,
                min: 5,
            })
        );
        assert!(matches!(
            Command::parse(&[b'Q', 1]),
            Err(RequestError::Malformed { opcode: Opcode::Query, .. })
        ));
    }

    #[test]
    fn test_command_reports_its_opcode() {
        let cmd = Command::parse(&frame(&[b'Z'])).unwrap();
        assert_eq!(cmd, Command::Ignored(Opcode::Z));
        assert_eq!(cmd.opcode(), Opcode::Z);
        assert_eq!(Command::Status.opcode(), Opcode::Status);
    }
}
