//! Engine configuration.

/// Runtime configuration for one deliberation engine instance.
///
/// Constructed once at process start and passed by reference into every
/// deliberation call. There is no ambient global state: swapping the config
/// (or the provider) is all a test needs to run the engine hermetically.
#[derive(Debug, Clone)]
pub struct DeliberationConfig {
    /// Model identifier sent to the provider on every call.
    pub model: String,
    /// Sampling temperature for every call.
    pub temperature: f32,
    /// Reflection budget: the maximum number of self-refinement iterations,
    /// and the maximum number of extra panel discussion rounds after the
    /// first. Both strategies terminate within `reflection_turns + 1` rounds.
    pub reflection_turns: u32,
    /// Log full persona outputs at info level instead of debug.
    pub verbose: bool,
}

impl Default for DeliberationConfig {
    fn default() -> Self {
        Self {
            model: std::env::var("DELIBERATION_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            temperature: 1.0,
            reflection_turns: 3,
            verbose: false,
        }
    }
}
