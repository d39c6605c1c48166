//! Frame orchestrator: reset, configure, stream, drain, decode, report.

use crate::bus::OrbBus;
use crate::decode::read_features;
use crate::error::Result;
use crate::stream::{stream_frame, PollMode, StreamReport};
use zybo_chip::{
    FeatureRecord, Frame, Region, DESCRIPTOR_SECTIONS, MAX_FEATURES, WORDS_PER_SECTION,
};

/// Per-frame configuration.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Positive FAST threshold (corner-thresh slot 0).
    pub corner_thresh: i32,
    /// Negative FAST threshold (corner-thresh slot 1, sign-extended).
    pub corner_thresh_n: i32,
    /// Trigger-poll behavior.
    pub poll: PollMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            corner_thresh: 15,
            corner_thresh_n: -15,
            poll: PollMode::default(),
        }
    }
}

/// Result of one processed frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// Decoded features in hardware slot order.
    pub features: Vec<FeatureRecord>,
    /// Streaming/handshake timing.
    pub timing: StreamReport,
    corner_thresh: i32,
}

impl FrameReport {
    /// Output artifact name encoding threshold and feature count,
    /// e.g. `features_image15[42].bmp`.
    pub fn artifact_name(&self) -> String {
        format!(
            "features_image{}[{}].bmp",
            self.corner_thresh,
            self.features.len()
        )
    }
}

/// Sequences one frame through the accelerator over any [`OrbBus`].
#[derive(Debug)]
pub struct OrbEngine<B: OrbBus> {
    bus: B,
    config: EngineConfig,
}

impl<B: OrbBus> OrbEngine<B> {
    /// Wrap a bus with the given configuration.
    pub fn new(bus: B, config: EngineConfig) -> Self {
        Self { bus, config }
    }

    /// Borrow the underlying bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Give the bus back, closing the engine.
    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Run one frame: clear result memory, stream, decode, report.
    ///
    /// Single pass, no retry; any bus failure aborts the frame.
    ///
    /// # Errors
    ///
    /// Propagates bus and handshake failures from every stage.
    pub fn process(&mut self, frame: &Frame) -> Result<FrameReport> {
        self.clear_feature_memory()?;

        let timing = stream_frame(
            &mut self.bus,
            frame,
            self.config.corner_thresh,
            self.config.corner_thresh_n,
            self.config.poll,
        )?;

        let features = read_features(&self.bus)?;
        tracing::info!(
            features = features.len(),
            busy_us = timing.busy_time.as_micros() as u64,
            "frame processed"
        );

        Ok(FrameReport {
            features,
            timing,
            corner_thresh: self.config.corner_thresh,
        })
    }

    /// Zero every feature slot: position words and both descriptor-bits
    /// sections. Leftover results from the previous frame would otherwise
    /// read back as features of this one.
    fn clear_feature_memory(&mut self) -> Result<()> {
        for slot in 0..MAX_FEATURES {
            for section in (0..DESCRIPTOR_SECTIONS).rev() {
                for component in (0..WORDS_PER_SECTION).rev() {
                    self.bus.write_u32(
                        Region::descriptor_bits(section),
                        slot * WORDS_PER_SECTION + component,
                        0,
                    )?;
                }
            }
            self.bus.write_u32(Region::DescriptorPos, slot, 0)?;
        }
        Ok(())
    }
}
