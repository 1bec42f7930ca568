//! Deliberation engine for LLM benchmark harnesses.
//!
//! Two interchangeable strategies built on one request/response primitive:
//!
//! - **Self-refinement** (`single`): one agent iterates through
//!   Identify → Improvise → Inspect phases, deciding at each inspection
//!   whether to finalize, bounded by a reflection budget.
//! - **Panel deliberation** (`panel`): a fixed persona roster answers a task
//!   independently, then discusses over a shared history in randomized
//!   speaking order until unanimous, falling back to a majority vote when
//!   the budget runs out.
//!
//! The model capability is a trait (`provider::CompletionProvider`); the
//! bundled `OpenAiProvider` speaks to any OpenAI-compatible chat-completions
//! endpoint. Both strategies return the final answer together with a full
//! transcript of every raw model output for audit.
//!
//! The engine is deliberately sequential inside one call, because every
//! prompt embeds the accumulated history of all previous steps, and it
//! performs no retries; wrap the provider if transport policy is needed.

pub mod answer;
pub mod config;
pub mod consensus;
pub mod error;
pub mod panel;
pub mod persona;
pub mod prompts;
pub mod provider;
pub mod single;

pub use answer::extract_final_answer;
pub use config::DeliberationConfig;
pub use consensus::{check_consensus, majority_vote};
pub use error::ProviderError;
pub use panel::{Panel, PanelOutcome, RoundRecord};
pub use persona::{Persona, Roster};
pub use provider::{CompletionProvider, Message, OpenAiProvider, Responder, Role};
pub use single::{DeliberationResult, Phase, SelfRefine};
