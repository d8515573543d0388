// Public API - what other modules can use
pub use registry::{EvictionPolicy, RosterRegistry};

// Internal modules
mod registry;
