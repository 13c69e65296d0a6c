//! Errors reported by the GBCD engine.

/// Reasons a GBCD run or a pole-figure section can fail.
///
/// Layout and input errors are raised by configuration, before any triangle
/// is processed.
#[derive(Clone, Debug, PartialEq)]
pub enum GbcdError {
    InvalidResolution {
        resolution_deg: f64,
    },
    InvalidChunkSize,
    DegenerateLayout {
        dimension: usize,
    },
    HistogramTooLarge {
        bins: u128,
        maximum: u128,
    },
    StrideMismatch {
        array: &'static str,
        expected: usize,
        found: usize,
    },
    EmptyFeatureTable,
    EmptyEnsembleTable,
    LabelOutOfRange {
        triangle: usize,
        label: i32,
        num_features: usize,
    },
    InvalidArea {
        triangle: usize,
        area: f64,
    },
    InvalidNormal {
        triangle: usize,
    },
    PhaseOutOfRange {
        feature: usize,
        phase: i32,
        num_phases: usize,
    },
    MissingSymmetry {
        phase: usize,
        crystal_structure: u32,
    },
    InvalidMisorientationAxis,
    InvalidImageDimension,
    PhaseNotAvailable {
        phase: usize,
    },
    Cancelled {
        chunks_completed: usize,
    },
}

impl std::fmt::Display for GbcdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GbcdError::InvalidResolution { resolution_deg } => {
                write!(f, "GBCD resolution must be a positive angle (got {resolution_deg}°)")
            }
            GbcdError::InvalidChunkSize => write!(f, "triangle chunk size must be at least 1"),
            GbcdError::DegenerateLayout { dimension } => {
                write!(f, "GBCD dimension {dimension} has no bins at this resolution")
            }
            GbcdError::HistogramTooLarge { bins, maximum } => {
                write!(f, "GBCD would need {bins} bins (limit {maximum}); coarsen the resolution")
            }
            GbcdError::StrideMismatch {
                array,
                expected,
                found,
            } => write!(f, "{array} has {found} values, expected {expected}"),
            GbcdError::EmptyFeatureTable => {
                write!(f, "feature table is empty (slot 0 is reserved and required)")
            }
            GbcdError::EmptyEnsembleTable => {
                write!(f, "crystal structure table is empty (slot 0 is reserved and required)")
            }
            GbcdError::LabelOutOfRange {
                triangle,
                label,
                num_features,
            } => write!(
                f,
                "triangle {triangle} references feature {label} outside [0, {num_features})"
            ),
            GbcdError::InvalidArea { triangle, area } => {
                write!(f, "triangle {triangle} has invalid area {area}")
            }
            GbcdError::InvalidNormal { triangle } => {
                write!(f, "triangle {triangle} has a non-finite normal")
            }
            GbcdError::PhaseOutOfRange {
                feature,
                phase,
                num_phases,
            } => write!(
                f,
                "feature {feature} has phase {phase} outside [0, {num_phases})"
            ),
            GbcdError::MissingSymmetry {
                phase,
                crystal_structure,
            } => write!(
                f,
                "phase {phase} has unsupported crystal structure {crystal_structure}"
            ),
            GbcdError::InvalidMisorientationAxis => {
                write!(f, "misorientation axis must be non-zero")
            }
            GbcdError::InvalidImageDimension => write!(f, "image dimension must be at least 1"),
            GbcdError::PhaseNotAvailable { phase } => {
                write!(f, "no histogram with crystal symmetry for phase {phase}")
            }
            GbcdError::Cancelled { chunks_completed } => {
                write!(f, "GBCD run cancelled after {chunks_completed} chunks")
            }
        }
    }
}

impl std::error::Error for GbcdError {}
