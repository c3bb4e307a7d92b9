//! ML model inference components

pub mod inference;
pub mod loader;

pub use inference::{InferenceEngine, InferenceError, ModelOutput};
pub use loader::{find_spec, ModelLoader, ModelSpec, KNOWN_MODELS};
