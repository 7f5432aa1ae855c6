pub mod channels;
pub mod controller;

// Re-export commonly used types
pub use channels::{ActiveChannelSet, ChannelHandle, ChannelId};
pub use controller::{AdmissionController, AdmissionError, HardwareApplier, NoopApplier};
