pub mod channel;
pub mod config;

// Re-export commonly used types
pub use channel::{ChannelSpan, TuningRange};
pub use config::{ConfigError, TunerConfig};
