//! Frame streaming engine: pixel packing, chunked upload, and the
//! trigger/poll handshake that hands each chunk to the accelerator.
//!
//! The handshake is the timing-critical part of the host contract. The
//! host writes 1 to frame-buffer slot 0; the fabric starts consuming the
//! chunk and clears the slot when done. There are no interrupts — the host
//! spin-polls the flag. The original bring-up host polled forever; here the
//! poll is bounded by default and the unlimited wait is an explicit opt-in
//! for hardware-timing characterization.

use crate::bus::OrbBus;
use crate::error::{OrbError, Result};
use std::time::{Duration, Instant};
use zybo_chip::{Frame, PixelPacker, Region, CHUNK_CAPACITY, FRAME_WORDS, LINE_SIZE, NUM_LINES};

/// Settle delay before each chunk trigger.
pub const CHUNK_SETTLE: Duration = Duration::from_micros(100);

/// Post-stream drain: residual pipeline work the busy flag does not cover.
pub const DRAIN_INTERVAL: Duration = Duration::from_millis(10);

/// Default bound on one trigger handshake.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait for the accelerator to clear the trigger flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// Give up after the given duration with [`OrbError::ProtocolHang`].
    Bounded(Duration),
    /// Spin forever, as the original bring-up host did. A hung fabric
    /// hangs the host with it; use only for timing-fidelity measurements.
    Unbounded,
}

impl Default for PollMode {
    fn default() -> Self {
        Self::Bounded(DEFAULT_POLL_TIMEOUT)
    }
}

/// Timing summary of one streamed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamReport {
    /// Cumulative wall time the accelerator held the busy flag.
    pub busy_time: Duration,
    /// Trigger handshakes performed.
    pub triggers: u32,
}

/// Stream one frame into the accelerator.
///
/// Sequence (each step is load-bearing, in this order):
///
/// 1. reset low, cursor to 1, reset high — the fabric state machine arms on
///    the rising edge;
/// 2. zero all [`FRAME_WORDS`] frame-buffer words so stale BRAM content is
///    never interpreted as pixels;
/// 3. corner thresholds into slots 0/1, the negative one sign-extended;
/// 4. row-major pixels through [`PixelPacker`], each completed word
///    mirrored to the input-staging buffer and the frame buffer; a full
///    chunk (cursor at [`CHUNK_CAPACITY`]) settles briefly, triggers, and
///    rewinds the cursor to 1;
/// 5. one final trigger if the flag reads idle, flushing a partial chunk
///    (the flag value decides, not a counter);
/// 6. a fixed drain sleep.
///
/// # Errors
///
/// Propagates bus failures and [`OrbError::ProtocolHang`] when a bounded
/// poll expires.
pub fn stream_frame<B: OrbBus>(
    bus: &mut B,
    frame: &Frame,
    corner_thresh: i32,
    corner_thresh_n: i32,
    poll: PollMode,
) -> Result<StreamReport> {
    let mut report = StreamReport::default();

    bus.write_u64(Region::InputStaging, 0, 0)?;
    bus.write_u64(Region::Reset, 0, 0)?;
    let mut cursor: usize = 1;
    bus.write_u64(Region::Reset, 0, 1)?;

    for index in 0..FRAME_WORDS {
        bus.write_u64(Region::FrameBuffer, index, 0)?;
    }

    // C host semantics: uint64_t(int32) sign-extends, so -15 lands as
    // 0xFFFF_FFFF_FFFF_FFF1 in the threshold register.
    bus.write_u64(Region::CornerThresh, 0, i64::from(corner_thresh) as u64)?;
    bus.write_u64(Region::CornerThresh, 1, i64::from(corner_thresh_n) as u64)?;

    tracing::debug!(corner_thresh, corner_thresh_n, "streaming frame");

    let mut packer = PixelPacker::new();
    for row in 0..NUM_LINES {
        for col in 0..LINE_SIZE {
            let Some(word) = packer.push(frame.pixel(row, col)) else {
                continue;
            };
            bus.write_u64(Region::InputStaging, cursor, word)?;
            bus.write_u64(Region::FrameBuffer, cursor, word)?;
            cursor += 1;
            if cursor == CHUNK_CAPACITY {
                std::thread::sleep(CHUNK_SETTLE);
                trigger(bus, poll, &mut report)?;
                cursor = 1;
            }
        }
    }

    // Flush the remaining partial chunk. The flag value is the guard: a
    // frame that ended exactly on a chunk boundary left it in the same
    // idle state, matching the hardware's expectation of one more kick.
    if bus.read_u64(Region::FrameBuffer, 0)? == 0 {
        trigger(bus, poll, &mut report)?;
    }

    std::thread::sleep(DRAIN_INTERVAL);

    tracing::debug!(
        triggers = report.triggers,
        busy_us = report.busy_time.as_micros() as u64,
        "frame streamed"
    );
    Ok(report)
}

/// One write-1/poll-until-0 handshake on frame-buffer slot 0.
fn trigger<B: OrbBus>(bus: &mut B, poll: PollMode, report: &mut StreamReport) -> Result<()> {
    let start = Instant::now();
    bus.write_u64(Region::FrameBuffer, 0, 1)?;
    while bus.read_u64(Region::FrameBuffer, 0)? == 1 {
        if let PollMode::Bounded(limit) = poll {
            if start.elapsed() > limit {
                return Err(OrbError::ProtocolHang {
                    timeout_ms: limit.as_millis() as u64,
                });
            }
        }
        std::hint::spin_loop();
    }
    report.busy_time += start.elapsed();
    report.triggers += 1;
    Ok(())
}
