//! Descriptor decoder: read back and decode the fixed result slots.

use crate::bus::OrbBus;
use crate::error::Result;
use zybo_chip::{
    orientation, split_position, split_score_angle, FeatureRecord, Region, DESCRIPTOR_SECTIONS,
    DESCRIPTOR_WORDS, MAX_FEATURES, WORDS_PER_SECTION,
};

/// Decode every valid feature slot, in ascending slot order.
///
/// Reads the position word of each slot from 0 upward and stops at the
/// first zero word. The zero sentinel is ambiguous by hardware design: a
/// feature legitimately at (0, 0) is indistinguishable from end-of-data
/// and terminates the list early. At most [`MAX_FEATURES`] slots exist.
///
/// # Errors
///
/// Propagates bus failures; slot contents themselves have no failure mode.
pub fn read_features<B: OrbBus>(bus: &B) -> Result<Vec<FeatureRecord>> {
    let mut features = Vec::new();

    for slot in 0..MAX_FEATURES {
        let Some((row, col)) = split_position(bus.read_u32(Region::DescriptorPos, slot)?) else {
            break;
        };

        let sa = split_score_angle(bus.read_u32(Region::ScoreAngle, slot)?);

        // Hardware read-back order: section 1 (high half) before section 0,
        // components descending within each. The concatenation in exactly
        // this order is the 256-bit descriptor.
        let mut descriptor = [0u32; DESCRIPTOR_WORDS];
        let mut next = 0;
        for section in (0..DESCRIPTOR_SECTIONS).rev() {
            for component in (0..WORDS_PER_SECTION).rev() {
                descriptor[next] = bus.read_u32(
                    Region::descriptor_bits(section),
                    slot * WORDS_PER_SECTION + component,
                )?;
                next += 1;
            }
        }

        features.push(FeatureRecord {
            row,
            col,
            score: sa.score,
            angle: sa.angle,
            quadrant: sa.quadrant,
            theta: sa.theta,
            scale: sa.scale,
            orientation: orientation(sa.quadrant, sa.theta),
            descriptor,
        });
    }

    tracing::debug!(count = features.len(), "decoded feature slots");
    Ok(features)
}
