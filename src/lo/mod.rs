pub mod listener;
pub mod state;

// Re-export commonly used types
pub use listener::{FrequencyListener, ListenerId, LoEvent};
pub use state::LocalOscillatorState;
