//! Network URL constants for the Signalscope SDK.

/// Default REST base URL of the engine's data service.
pub const DEFAULT_API_URL: &str = "https://data.signalscope.dev";
