//! Engine and chain configuration
//!
//! Both are built once at process start and shared read-only.

pub mod chain;
pub mod engine;

pub use chain::{ChainConfig, ProtocolParams};
pub use engine::{EngineConfig, PowMode};
