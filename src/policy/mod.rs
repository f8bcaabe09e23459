pub mod w_tiny_lfu;

pub use w_tiny_lfu::WTinyLfuCore;
