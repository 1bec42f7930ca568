//! Single-agent self-refinement loop.
//!
//! One agent works a task through a fixed sequence of cognitive phases:
//! Identify → Improvise → Inspect, looping through Re- variants until an
//! inspection decides to finalize or the reflection budget runs out, then a
//! single Finalize call produces the answer.

use tracing::debug;

use crate::config::DeliberationConfig;
use crate::error::ProviderError;
use crate::prompts;
use crate::provider::{CompletionProvider, Message, Responder};

/// Cognitive phase of the self-refinement loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Identify,
    Improvise,
    Inspect,
    ReIdentify,
    ReImprovise,
    ReInspect,
    Finalize,
    Done,
}

impl Phase {
    fn instruction(self) -> String {
        match self {
            Self::Identify => prompts::identify(true),
            Self::ReIdentify => prompts::identify(false),
            Self::Improvise => prompts::improvise(true),
            Self::ReImprovise => prompts::improvise(false),
            Self::Inspect => prompts::inspect(true),
            Self::ReInspect => prompts::inspect(false),
            Self::Finalize => prompts::finalize(),
            Self::Done => String::new(),
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identify => write!(f, "identify"),
            Self::Improvise => write!(f, "improvise"),
            Self::Inspect => write!(f, "inspect"),
            Self::ReIdentify => write!(f, "re_identify"),
            Self::ReImprovise => write!(f, "re_improvise"),
            Self::ReInspect => write!(f, "re_inspect"),
            Self::Finalize => write!(f, "finalize"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Final answer plus the full audit transcript of one deliberation.
#[derive(Debug, Clone)]
pub struct DeliberationResult {
    /// Output of the Finalize call, verbatim.
    pub final_answer: String,
    /// Every raw model output produced during the call, in call order.
    pub transcript: Vec<String>,
}

/// The self-refinement strategy.
///
/// Phase instructions are ephemeral: each is sent for one call only, and
/// the conversation keeps a single `Previous Process:` entry per completed
/// phase instead, so history grows by one message per phase.
pub struct SelfRefine<'a> {
    provider: &'a dyn CompletionProvider,
    config: &'a DeliberationConfig,
}

impl<'a> SelfRefine<'a> {
    pub fn new(provider: &'a dyn CompletionProvider, config: &'a DeliberationConfig) -> Self {
        Self { provider, config }
    }

    /// Run one deliberation.
    ///
    /// Terminates within `reflection_turns` iterations of
    /// (identify, improvise, inspect) plus exactly one finalize call. Any
    /// provider failure propagates immediately.
    pub async fn run(
        &self,
        task_description: &str,
        instance_query: &str,
    ) -> Result<DeliberationResult, ProviderError> {
        let responder = Responder::new(self.provider, self.config);
        let mut conversation = vec![Message::system(format!(
            "Task Description: {task_description}\n Following is your specific instance \
             for the task:\n{instance_query}"
        ))];
        let mut transcript: Vec<String> = Vec::new();

        let mut phase = if self.config.reflection_turns == 0 {
            Phase::Finalize
        } else {
            Phase::Identify
        };
        let mut iterations = 0u32;
        let mut final_answer = String::new();

        loop {
            debug!(phase = %phase, iterations, "self-refinement step");
            match phase {
                Phase::Identify | Phase::ReIdentify | Phase::Improvise | Phase::ReImprovise => {
                    let response = responder
                        .send(&conversation, Some(&phase.instruction()))
                        .await?;
                    transcript.push(response.clone());
                    conversation.push(Message::user(format!("Previous Process: \n{response}")));
                    phase = match phase {
                        Phase::Identify => Phase::Improvise,
                        Phase::ReIdentify => Phase::ReImprovise,
                        Phase::Improvise => Phase::Inspect,
                        _ => Phase::ReInspect,
                    };
                }
                Phase::Inspect | Phase::ReInspect => {
                    let inspection = responder
                        .send(&conversation, Some(&phase.instruction()))
                        .await?;
                    transcript.push(inspection.clone());
                    // Case-sensitive exact substring, unlike answer
                    // extraction elsewhere.
                    if inspection.contains(prompts::DECISION_FINALIZE) {
                        debug!(iterations, "inspection decided to finalize");
                        phase = Phase::Finalize;
                    } else {
                        conversation
                            .push(Message::user(format!("Previous Process: \n{inspection}")));
                        iterations += 1;
                        phase = if iterations < self.config.reflection_turns {
                            Phase::ReIdentify
                        } else {
                            Phase::Finalize
                        };
                    }
                }
                Phase::Finalize => {
                    let response = responder
                        .send(&conversation, Some(&Phase::Finalize.instruction()))
                        .await?;
                    transcript.push(response.clone());
                    final_answer = response;
                    phase = Phase::Done;
                }
                Phase::Done => break,
            }
        }

        Ok(DeliberationResult {
            final_answer,
            transcript,
        })
    }
}
