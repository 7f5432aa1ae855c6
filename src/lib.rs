//! Channel admission and frequency planning for a single wideband tuner.
//!
//! A wideband device captures one window of spectrum around its center
//! frequency. This crate decides whether a requested channel span fits the
//! usable part of that window alongside the channels already being served,
//! and when it does, picks the center frequency that covers them all while
//! keeping every span out of the dead zone around the DC spike.

pub mod admission;
pub mod lo;
pub mod planner;
pub mod types;

// Re-export commonly used types
pub use admission::{
    AdmissionController, AdmissionError, ChannelHandle, HardwareApplier, NoopApplier,
};
pub use lo::{ListenerId, LoEvent};
pub use planner::{plan, PlanOutcome};
pub use types::{ChannelSpan, ConfigError, TunerConfig, TuningRange};
