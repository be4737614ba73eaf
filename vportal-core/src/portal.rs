//! Command dispatcher
//!
//! [`Portal`] owns the slot table, the status counter and the lighting zones,
//! and answers host requests. Processing is synchronous and bounded: ring
//! color changes are handed to the fade engine through a [`LedLink`] and
//! take effect on the engine's own schedule.

use vportal_protocol::{Command, LegacyLight, RequestError, Response, StatusReport, ZoneSelector};

use crate::lighting::{apply_sequence, Zone, Zones, STARTUP_SEQUENCE, TEARDOWN_SEQUENCE};
use crate::slots::{LoadOutcome, SlotError, SlotTable};
use crate::status::{encode_status, SequenceCounter};
use crate::storage;
use crate::token::TokenDescriptor;
use crate::traits::{LedLink, LightChannel, LightOutput, TagStorage};
use crate::Rgb;

/// Portal state and request handling
///
/// - `T`: tag storage of each token
/// - `L`: link to the LED fade engine
/// - `B`: output driving the backlight
pub struct Portal<T, L, B> {
    slots: SlotTable<T>,
    counter: SequenceCounter,
    zones: Zones,
    active: bool,
    speaker: bool,
    leds: L,
    backlight: B,
}

impl<T, L, B> Portal<T, L, B>
where
    T: TagStorage + Default,
    L: LedLink,
    B: LightOutput,
{
    /// Create a portal with every slot empty
    ///
    /// Plays the startup sequence on the backlight output.
    pub fn new(leds: L, mut backlight: B) -> Self {
        apply_sequence(&mut backlight, STARTUP_SEQUENCE);
        Self {
            slots: SlotTable::new(),
            counter: SequenceCounter::new(),
            zones: Zones::default(),
            active: false,
            speaker: false,
            leds,
            backlight,
        }
    }

    /// Decode and handle one request frame
    pub fn process(&mut self, frame: &[u8]) -> Result<Response, RequestError> {
        let command = Command::parse(frame)?;
        self.dispatch(command)
    }

    /// Handle a decoded request
    pub fn dispatch(&mut self, command: Command) -> Result<Response, RequestError> {
        match command {
            Command::Activate { raw } => {
                self.active = raw != 0;
                Ok(Response::activate(raw))
            }
            Command::Color(color) => {
                self.set_left(color, 0);
                Ok(Response::empty())
            }
            Command::ZoneLight {
                zone,
                color,
                delay_ms,
            } => {
                let settings = Zone { color, delay_ms };
                match zone {
                    ZoneSelector::Left => self.set_left(color, delay_ms),
                    ZoneSelector::Right => self.zones.right = settings,
                    ZoneSelector::Trap => self.zones.trap = settings,
                    ZoneSelector::Other(_) => {}
                }
                Ok(Response::light())
            }
            Command::Light(light) => {
                match light {
                    LegacyLight::Ring(color) => self.set_left(color, 0),
                    LegacyLight::Backlight(level) => {
                        self.backlight.set_channel(LightChannel::Backlight, level)
                    }
                    LegacyLight::BacklightFull => {
                        self.backlight.set_channel(LightChannel::Backlight, 0xFF)
                    }
                    LegacyLight::Ignored(_) => {}
                }
                Ok(Response::light())
            }
            Command::Speaker { raw } => {
                self.speaker = raw == 1;
                Ok(Response::speaker(raw))
            }
            Command::Query { slot, block } => storage::query(&self.slots, slot, block),
            Command::Reset => {
                self.reset();
                Ok(Response::reset())
            }
            Command::Status => Ok(self.encode_status().to_response()),
            Command::Ignored(_) => Ok(Response::empty()),
            Command::Write { slot, block, data } => {
                storage::write(&mut self.slots, slot, block, &data)
            }
        }
    }

    /// Store the left zone and hand it to the fade engine
    fn set_left(&mut self, color: Rgb, delay_ms: u16) {
        self.zones.left = Zone { color, delay_ms };
        self.leds.request(self.zones.left.request());
    }

    /// Deactivate and re-announce every present token
    fn reset(&mut self) {
        self.active = false;
        self.slots.mark_loaded_changed();
    }

    /// Build a status report, consuming change flags
    pub fn encode_status(&mut self) -> StatusReport {
        encode_status(&mut self.slots, &mut self.counter)
    }

    /// Unsolicited status report
    ///
    /// Returns `None` while the host has not activated the portal.
    pub fn poll_status(&mut self) -> Option<Response> {
        if !self.active {
            return None;
        }
        Some(self.encode_status().to_response())
    }

    /// Place a detected token into a slot
    pub fn load(&mut self, descriptor: TokenDescriptor<T>) -> Result<LoadOutcome, SlotError> {
        self.slots.load(descriptor)
    }

    /// Mark a slot's token as removed
    pub fn unload(&mut self, slot: usize) -> Result<(), SlotError> {
        self.slots.unload(slot)
    }

    /// Play the teardown sequence on the backlight output
    ///
    /// The ring channels belong to the fade engine; the owner resets them
    /// after the engine has stopped.
    pub fn teardown(&mut self) {
        apply_sequence(&mut self.backlight, TEARDOWN_SEQUENCE);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn speaker_enabled(&self) -> bool {
        self.speaker
    }

    pub fn zones(&self) -> &Zones {
        &self.zones
    }

    pub fn slots(&self) -> &SlotTable<T> {
        &self.slots
    }

    pub fn leds(&self) -> &L {
        &self.leds
    }

    pub fn backlight(&self) -> &B {
        &self.backlight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::testing::RecordingOutput;
    use crate::lighting::FadeRequest;
    use crate::tag::{ClassicTag, CLASSIC_1K_BLOCKS};
    use crate::token::{Label, Uid};
    use crate::{FRAME_SIZE, TOKEN_LIMIT};
    use heapless::Vec;

    #[derive(Default)]
    struct QueuedRequests {
        sent: Vec<FadeRequest, 16>,
    }

    impl LedLink for QueuedRequests {
        fn request(&mut self, request: FadeRequest) {
            let _ = self.sent.push(request);
        }
    }

    type TestPortal = Portal<ClassicTag, QueuedRequests, RecordingOutput>;

    fn portal() -> TestPortal {
        Portal::new(QueuedRequests::default(), RecordingOutput::default())
    }

    fn frame(bytes: &[u8]) -> [u8; FRAME_SIZE] {
        let mut frame = [0u8; FRAME_SIZE];
        frame[..bytes.len()].copy_from_slice(bytes);
        frame
    }

    fn place(portal: &mut TestPortal, id: u8) -> usize {
        let descriptor = TokenDescriptor::placed(
            Uid([id, 0xAA, 0xBB, 0xCC]),
            Label::new(),
            ClassicTag::blank(CLASSIC_1K_BLOCKS),
        );
        portal.load(descriptor).unwrap().slot()
    }

    #[test]
    fn test_new_plays_startup_sequence() {
        let portal = portal();
        assert_eq!(portal.backlight().level(LightChannel::Backlight), 0xFF);
        assert_eq!(portal.backlight().keep_awake, 2);
        assert!(!portal.is_active());
    }

    #[test]
    fn test_activate() {
        let mut portal = portal();
        let response = portal.process(&frame(&[b'A', 1])).unwrap();
        assert_eq!(response.as_bytes(), &[b'A', 1, 0xFF, 0x77]);
        assert!(portal.is_active());

        let response = portal.process(&frame(&[b'A', 0])).unwrap();
        assert_eq!(response.as_bytes(), &[b'A', 0, 0xFF, 0x77]);
        assert!(!portal.is_active());
    }

    #[test]
    fn test_reset_reannounces_loaded_tokens() {
        let mut portal = portal();
        place(&mut portal, 1);
        place(&mut portal, 2);
        portal.unload(1).unwrap();
        portal.process(&frame(&[b'A', 1])).unwrap();
        portal.encode_status();

        let response = portal.process(&frame(&[b'R'])).unwrap();

        assert_eq!(response.as_bytes(), &[b'R', 0x02, 0x1B]);
        assert!(!portal.is_active());
        assert!(portal.slots().get(0).unwrap().is_changed());
        assert!(!portal.slots().get(1).unwrap().is_changed());
    }

    #[test]
    fn test_status_with_slot_zero_changed() {
        let mut portal = portal();
        place(&mut portal, 1);

        let response = portal.process(&frame(&[b'S'])).unwrap();
        let bytes = response.as_bytes();
        assert_eq!(bytes.len(), 7);
        assert_eq!(bytes[1], 0x03);
        assert_eq!(&bytes[2..5], &[0, 0, 0]);
        assert_eq!(bytes[6], 1);

        // Second report: still loaded, no longer changed
        let response = portal.process(&frame(&[b'S'])).unwrap();
        assert_eq!(response.as_bytes()[1], 0x01);
        assert_eq!(response.as_bytes()[5], 1);
    }

    #[test]
    fn test_query_unloaded_slot() {
        let mut portal = portal();
        let response = portal.process(&frame(&[b'Q', 2, 7])).unwrap();
        assert_eq!(response.as_bytes(), &[b'Q', 0x02, 7]);
    }

    #[test]
    fn test_write_then_query() {
        let mut portal = portal();
        let slot = place(&mut portal, 1) as u8;
        let data = [0x5A; 16];

        let mut write = [0u8; FRAME_SIZE];
        write[..3].copy_from_slice(&[b'W', slot, 5]);
        write[3..19].copy_from_slice(&data);
        let ack = portal.process(&write).unwrap();
        assert_eq!(ack.as_bytes(), &[b'W', 0x10 | slot, 5]);

        let response = portal.process(&frame(&[b'Q', slot, 5])).unwrap();
        assert_eq!(response.len(), 19);
        assert_eq!(response.as_bytes()[1], 0x10 | slot);
        assert_eq!(&response.as_bytes()[3..], &data);
    }

    #[test]
    fn test_color_signals_engine_without_reply() {
        let mut portal = portal();
        let response = portal.process(b"C\xff\x00\x00").unwrap();
        assert!(response.is_empty());
        assert_eq!(
            portal.leds().sent.as_slice(),
            &[FadeRequest::immediate(Rgb::new(0xFF, 0, 0))]
        );
        assert_eq!(portal.zones().left.color, Rgb::new(0xFF, 0, 0));
    }

    #[test]
    fn test_zone_light_left_is_animated() {
        let mut portal = portal();
        let response = portal.process(b"J\x02\x00\xff\x00\x00\x10").unwrap();
        assert_eq!(response.as_bytes(), &[b'J']);
        assert_eq!(
            portal.leds().sent.as_slice(),
            &[FadeRequest::new(Rgb::new(0, 0xFF, 0), 0x1000)]
        );
    }

    #[test]
    fn test_zone_light_other_zones_only_recorded() {
        let mut portal = portal();
        portal.process(&frame(&[b'J', 0, 1, 2, 3, 0x10, 0])).unwrap();
        portal.process(&frame(&[b'J', 1, 4, 5, 6, 0x20, 0])).unwrap();
        let response = portal.process(&frame(&[b'J', 7, 7, 7, 7, 0, 0])).unwrap();

        assert_eq!(response.as_bytes(), &[b'J']);
        assert!(portal.leds().sent.is_empty());
        assert_eq!(
            portal.zones().right,
            Zone {
                color: Rgb::new(1, 2, 3),
                delay_ms: 0x10
            }
        );
        assert_eq!(
            portal.zones().trap,
            Zone {
                color: Rgb::new(4, 5, 6),
                delay_ms: 0x20
            }
        );
        assert_eq!(portal.zones().left, Zone::default());
    }

    #[test]
    fn test_legacy_light() {
        let mut portal = portal();

        let response = portal.process(&frame(&[b'L', 0, 9, 8, 7])).unwrap();
        assert_eq!(response.as_bytes(), &[b'J']);
        assert_eq!(
            portal.leds().sent.as_slice(),
            &[FadeRequest::immediate(Rgb::new(9, 8, 7))]
        );

        portal.process(&frame(&[b'L', 1, 0x40])).unwrap();
        assert_eq!(portal.backlight().level(LightChannel::Backlight), 0x40);

        portal.process(&frame(&[b'L', 3])).unwrap();
        assert_eq!(portal.backlight().level(LightChannel::Backlight), 0xFF);
        assert_eq!(portal.leds().sent.len(), 1);
    }

    #[test]
    fn test_speaker() {
        let mut portal = portal();
        let response = portal.process(&frame(&[b'M', 1])).unwrap();
        assert_eq!(response.as_bytes(), &[b'M', 1, 0x00, 0x19]);
        assert!(portal.speaker_enabled());

        portal.process(&frame(&[b'M', 2])).unwrap();
        assert!(!portal.speaker_enabled());
    }

    #[test]
    fn test_ignored_and_unknown_opcodes() {
        let mut portal = portal();
        assert!(portal.process(&frame(&[b'V'])).unwrap().is_empty());
        assert!(portal.process(&frame(&[b'Z'])).unwrap().is_empty());
        assert_eq!(
            portal.process(&frame(&[b'?'])),
            Err(RequestError::UnknownOpcode(b'?'))
        );
    }

    #[test]
    fn test_poll_status_only_when_active() {
        let mut portal = portal();
        place(&mut portal, 1);
        assert_eq!(portal.poll_status(), None);
        // Inactive polls leave change flags alone
        assert!(portal.slots().get(0).unwrap().is_changed());

        portal.process(&frame(&[b'A', 1])).unwrap();
        let response = portal.poll_status().unwrap();
        let report = StatusReport::parse(response.as_bytes()).unwrap();
        assert!(report.is_loaded(0));
        assert!(report.is_changed(0));
    }

    #[test]
    fn test_table_full_reported_to_loader() {
        let mut portal = portal();
        for id in 0..TOKEN_LIMIT as u8 {
            place(&mut portal, id + 1);
        }
        let descriptor = TokenDescriptor::placed(
            Uid([99, 0, 0, 0]),
            Label::new(),
            ClassicTag::blank(CLASSIC_1K_BLOCKS),
        );
        assert_eq!(portal.load(descriptor).unwrap_err(), SlotError::TableFull);
    }

    #[test]
    fn test_teardown_restores_backlight() {
        let mut portal = portal();
        portal.process(&frame(&[b'L', 1, 0])).unwrap();
        assert_eq!(portal.backlight().level(LightChannel::Backlight), 0);
        portal.teardown();
        assert_eq!(portal.backlight().level(LightChannel::Backlight), 0xFF);
    }
}
