//! Protocol tests against the in-memory accelerator stand-in.
//!
//! These exercise the full streaming and decoding paths without a board:
//! the software bus consumes trigger writes instantly and counts them.

use std::time::Duration;
use zybo_chip::{Frame, Region, CHUNK_CAPACITY, FRAME_WORDS, LINE_SIZE, NUM_LINES};
use zybo_driver::{
    read_features, stream_frame, EngineConfig, OrbBus, OrbEngine, OrbError, PollMode, Result,
    SoftwareBus,
};

const FRAME_WORD_COUNT: usize = NUM_LINES * LINE_SIZE / 8;

/// A bus whose accelerator never clears the trigger flag, as a wedged
/// fabric would look to the host.
struct StuckBus(SoftwareBus);

impl OrbBus for StuckBus {
    fn read_u32(&self, region: Region, index: usize) -> Result<u32> {
        self.0.read_u32(region, index)
    }

    fn write_u32(&mut self, region: Region, index: usize, value: u32) -> Result<()> {
        self.0.write_u32(region, index, value)
    }

    fn read_u64(&self, region: Region, index: usize) -> Result<u64> {
        if region == Region::FrameBuffer && index == 0 {
            return Ok(1);
        }
        self.0.read_u64(region, index)
    }

    fn write_u64(&mut self, region: Region, index: usize, value: u64) -> Result<()> {
        self.0.write_u64(region, index, value)
    }
}

#[test]
fn full_frame_trigger_count() {
    let mut bus = SoftwareBus::new();
    let report = stream_frame(&mut bus, &Frame::solid(128), 15, -15, PollMode::default())
        .expect("streaming against the software bus");

    // 38400 words at 8191 per chunk: four full chunks plus one partial.
    let expected = FRAME_WORD_COUNT.div_ceil(FRAME_WORDS) as u32;
    assert_eq!(expected, 5);
    assert_eq!(report.triggers, expected);
    assert_eq!(bus.trigger_count(), expected);
}

#[test]
fn reset_is_pulsed_once_per_frame() {
    let mut bus = SoftwareBus::new();
    stream_frame(&mut bus, &Frame::solid(0), 15, -15, PollMode::default()).unwrap();
    assert_eq!(bus.reset_edges(), 1);
    assert_eq!(bus.read_u64(Region::Reset, 0).unwrap(), 1);
}

#[test]
fn thresholds_are_sign_extended() {
    let mut bus = SoftwareBus::new();
    stream_frame(&mut bus, &Frame::solid(0), 15, -15, PollMode::default()).unwrap();
    assert_eq!(bus.read_u64(Region::CornerThresh, 0).unwrap(), 15);
    assert_eq!(
        bus.read_u64(Region::CornerThresh, 1).unwrap(),
        0xFFFF_FFFF_FFFF_FFF1
    );
}

#[test]
fn pixel_words_mirror_into_both_buffers() {
    // Deterministic non-uniform frame so every word is distinguishable.
    let raw: Vec<u8> = (0..NUM_LINES * LINE_SIZE).map(|i| (i % 251) as u8).collect();
    let frame = Frame::from_raw(raw.clone()).unwrap();

    let mut bus = SoftwareBus::new();
    stream_frame(&mut bus, &frame, 15, -15, PollMode::default()).unwrap();

    // The software bus retains the final partial chunk: frame words
    // 4 * FRAME_WORDS .. 38400 at cursor positions 1..=5636.
    let full_chunks = FRAME_WORD_COUNT / FRAME_WORDS;
    let tail = FRAME_WORD_COUNT % FRAME_WORDS;
    assert_eq!(tail, 5636);

    for local in [1usize, 2, tail] {
        let word_index = full_chunks * FRAME_WORDS + (local - 1);
        let mut expected = 0u64;
        for byte in 0..8 {
            expected |= u64::from(raw[word_index * 8 + byte]) << (8 * byte);
        }
        assert_eq!(bus.read_u64(Region::FrameBuffer, local).unwrap(), expected);
        assert_eq!(bus.read_u64(Region::InputStaging, local).unwrap(), expected);
    }
}

#[test]
fn cursor_never_reaches_the_trigger_slot() {
    // CHUNK_CAPACITY rewinds to 1, so slot 0 only ever sees the handshake.
    assert_eq!(CHUNK_CAPACITY, FRAME_WORDS + 1);
    let mut bus = SoftwareBus::new();
    stream_frame(&mut bus, &Frame::solid(0xFF), 15, -15, PollMode::default()).unwrap();
    // After the final handshake the flag was consumed back to idle.
    assert_eq!(bus.read_u64(Region::FrameBuffer, 0).unwrap(), 0);
}

#[test]
fn bounded_poll_reports_a_hung_handshake() {
    let mut bus = StuckBus(SoftwareBus::new());
    let err = stream_frame(
        &mut bus,
        &Frame::solid(0),
        15,
        -15,
        PollMode::Bounded(Duration::from_millis(20)),
    )
    .unwrap_err();

    match err {
        OrbError::ProtocolHang { timeout_ms } => assert_eq!(timeout_ms, 20),
        other => panic!("expected a protocol hang, got {other}"),
    }
}

#[test]
fn end_to_end_uniform_frame_yields_no_features() {
    let bus = SoftwareBus::new();
    let mut engine = OrbEngine::new(bus, EngineConfig::default());

    let report = engine.process(&Frame::solid(128)).expect("software frame");

    assert!(report.features.is_empty());
    assert_eq!(report.timing.triggers, 5);
    assert_eq!(report.artifact_name(), "features_image15[0].bmp");

    // Reclaiming the bus closes the engine and keeps its counters.
    let bus = engine.into_bus();
    assert_eq!(bus.trigger_count(), 5);
}

#[test]
fn end_to_end_decodes_preloaded_features() {
    // Results survive in the software bus only if written after streaming
    // would have cleared them, so drive the stages directly.
    let mut bus = SoftwareBus::new();
    stream_frame(&mut bus, &Frame::solid(200), 20, -20, PollMode::default()).unwrap();

    bus.write_u32(Region::DescriptorPos, 0, (100 << 16) | 250).unwrap();
    bus.write_u32(Region::ScoreAngle, 0, (1u32 << 30) | (0x200 << 16) | 0x000D).unwrap();
    bus.write_u32(Region::DescriptorBits1, 3, 0xAAAA_5555).unwrap();

    let features = read_features(&bus).unwrap();
    assert_eq!(features.len(), 1);
    let f = &features[0];
    assert_eq!((f.row, f.col), (100, 250));
    assert_eq!(f.score, 0x200);
    assert_eq!(f.theta, 1); // 0xD & 3
    assert_eq!(f.quadrant, 3); // (0xD & 0xC) >> 2
    assert_eq!(f.scale, 1);
    assert_eq!(f.orientation, -11.0 + 360.0);
    // Section 1 component 3 is read out first.
    assert_eq!(f.descriptor[0], 0xAAAA_5555);
    assert_eq!(f.descriptor_hex().len(), 64);
}

#[test]
fn custom_threshold_flows_into_the_artifact_name() {
    let bus = SoftwareBus::new();
    let config = EngineConfig {
        corner_thresh: 30,
        corner_thresh_n: -30,
        ..EngineConfig::default()
    };
    let mut engine = OrbEngine::new(bus, config);
    let report = engine.process(&Frame::solid(0)).unwrap();
    assert_eq!(report.artifact_name(), "features_image30[0].bmp");
}
