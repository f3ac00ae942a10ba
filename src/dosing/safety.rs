//! Safety classification of a per-dose volume

use crate::errors::DoseError;
use crate::types::{SafeVolumeBand, SafetyClassification};

/// Classify a per-dose volume against an inclusive safe band
///
/// ```text
/// v < min  → BelowRange
/// v > max  → AboveRange
/// else     → Safe        (min and max themselves are safe)
/// ```
pub fn classify(volume_ml: f64, band: SafeVolumeBand) -> Result<SafetyClassification, DoseError> {
    if band.min_ml > band.max_ml {
        return Err(DoseError::InvalidRange {
            min: band.min_ml,
            max: band.max_ml,
        });
    }

    let classification = if volume_ml < band.min_ml {
        SafetyClassification::BelowRange
    } else if volume_ml > band.max_ml {
        SafetyClassification::AboveRange
    } else {
        SafetyClassification::Safe
    };

    Ok(classification)
}
