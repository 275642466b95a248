//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::{BinaryMask, Spacing};
pub use crate::{ErrorKind, EvalResult, MaskRole, MetricError};

pub use crate::metrics::{
    evaluate, evaluate_values, MetricsOptions, MetricsResult, Score, SurfaceDistance,
};
pub use crate::overlap::ConfusionMatrix;
pub use crate::volume::VolumeStats;

pub use crate::surface::{
    average_surface_distance, compute_surface_distances, pooled_robust_hausdorff,
    robust_hausdorff, symmetric_surface_distance, Direction, SurfaceDistanceSet,
};

pub use crate::phantom::{ball, disk, place_ball, place_disk};
