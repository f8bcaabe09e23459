pub mod ghost;
pub mod keyed_deque;
pub mod sketch;

pub use ghost::{GhostHistory, GhostRecord, SegmentKind};
pub use keyed_deque::KeyedDeque;
pub use sketch::FrequencySketch;
