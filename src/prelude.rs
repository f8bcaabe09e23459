pub use crate::ds::{FrequencySketch, GhostHistory, GhostRecord, KeyedDeque, SegmentKind};
pub use crate::error::{ConfigError, InvariantError, SelectionError};
pub use crate::policy::w_tiny_lfu::{WTinyLfuConfig, WTinyLfuCore, WindowRotation};
pub use crate::traits::{ReplacementPolicy, ResidentView};

#[cfg(feature = "concurrency")]
pub use crate::policy::w_tiny_lfu::ConcurrentWTinyLfu;
#[cfg(feature = "metrics")]
pub use crate::policy::w_tiny_lfu::WTinyLfuMetrics;
