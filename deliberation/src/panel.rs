//! Multi-agent panel deliberation.
//!
//! Five personas answer a task independently, then hold randomized-order
//! discussion rounds over a shared chat history, checking for unanimity
//! after each round. A panel that exhausts its reflection budget without
//! consensus falls back to a majority vote with random tie-break.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::answer::extract_final_answer;
use crate::config::DeliberationConfig;
use crate::consensus::{check_consensus, majority_vote};
use crate::error::ProviderError;
use crate::persona::{Persona, Roster};
use crate::prompts;
use crate::provider::{CompletionProvider, Message, Responder};
use crate::single::SelfRefine;

/// Extracted answers of one discussion round, in speaking order.
#[derive(Debug, Clone)]
pub struct RoundRecord {
    /// 1-based discussion round number.
    pub round: u32,
    /// One entry per persona; `None` when extraction missed.
    pub answers: Vec<Option<String>>,
}

/// Outcome of one panel deliberation.
#[derive(Debug, Clone)]
pub struct PanelOutcome {
    /// `"Final Answer: \n<answer>"`: the consensus answer, the majority
    /// winner, or the no-conclusive-answer notice.
    pub final_answer: String,
    /// Every raw model output across all phases and rounds, in call order.
    pub transcript: Vec<String>,
    /// The shared speech log every persona saw.
    pub chat_history: Vec<Message>,
    /// Answers extracted from the independent initiatives.
    pub initial_answers: Vec<Option<String>>,
    /// Answers extracted per discussion round.
    pub rounds: Vec<RoundRecord>,
    /// Whether a round reached unanimity.
    pub consensus: bool,
}

/// The panel strategy.
///
/// Strictly sequential: each persona's call completes before the next
/// begins, because every prompt embeds the accumulated shared history. A
/// provider failure for any persona aborts the whole run.
pub struct Panel<'a> {
    provider: &'a dyn CompletionProvider,
    config: &'a DeliberationConfig,
    roster: Roster,
}

impl<'a> Panel<'a> {
    /// Panel over the default five-scientist roster.
    pub fn new(provider: &'a dyn CompletionProvider, config: &'a DeliberationConfig) -> Self {
        Self::with_roster(provider, config, Roster::default())
    }

    pub fn with_roster(
        provider: &'a dyn CompletionProvider,
        config: &'a DeliberationConfig,
        roster: Roster,
    ) -> Self {
        Self {
            provider,
            config,
            roster,
        }
    }

    /// Run one panel deliberation.
    ///
    /// Terminates within `reflection_turns + 1` discussion rounds after the
    /// independent-initiative phase.
    pub async fn run(
        &self,
        task_description: &str,
        instance_query: &str,
    ) -> Result<PanelOutcome, ProviderError> {
        let preamble = prompts::roster_preamble(&self.roster);
        let mut chat_history: Vec<Message> = Vec::new();
        let mut transcript: Vec<String> = Vec::new();
        let mut rounds: Vec<RoundRecord> = Vec::new();

        // Phase 1: independent initiatives, fixed roster order. Each persona
        // runs the full self-refinement loop on its own private conversation;
        // only the final output enters the shared history.
        let refine = SelfRefine::new(self.provider, self.config);
        let mut initial_answers: Vec<Option<String>> = Vec::new();
        for persona in self.roster.personas() {
            let persona_task =
                format!("{preamble} {}\n{task_description}", persona.description);
            let result = refine.run(&persona_task, instance_query).await?;
            info!(persona = %persona.name, "finished independent initiative");
            self.log_speech(persona, &result.final_answer);
            chat_history.push(Message::user(format!(
                "[{}]: \n{}",
                persona.name, result.final_answer
            )));
            initial_answers.push(extract_final_answer(&result.final_answer));
            transcript.extend(result.transcript);
        }

        // Discussion rounds. Speaking order is reshuffled before every round;
        // the initiative phase above is the only unshuffled pass.
        let responder = Responder::new(self.provider, self.config);
        let mut order: Vec<&Persona> = self.roster.personas().iter().collect();
        let mut rng = StdRng::from_entropy();
        let mut verdict: Option<String> = None;
        let mut round = 1u32;

        loop {
            if round > 1 {
                chat_history.push(Message::system(prompts::DISAGREEMENT_NOTICE));
            }
            order.shuffle(&mut rng);

            let mut answers: Vec<Option<String>> = Vec::with_capacity(order.len());
            for persona in &order {
                let system = format!(
                    "{preamble} \nTask Description: {}\n{task_description}\n Following is \
                     your specific instance for the task:\n{instance_query}",
                    persona.description
                );
                let mut messages: Vec<Message> = Vec::with_capacity(chat_history.len() + 2);
                messages.push(Message::system(system));
                messages.extend_from_slice(&chat_history);
                messages.push(Message::system(prompts::DISCUSSION_INSTRUCTION));

                let output = responder.send(&messages, None).await?;
                info!(persona = %persona.name, round, "spoke in discussion round");
                self.log_speech(persona, &output);
                chat_history.push(Message::user(format!("[{}]: \n{}", persona.name, output)));
                answers.push(extract_final_answer(&output));
                transcript.push(output);
            }

            let agreed = check_consensus(&answers);
            rounds.push(RoundRecord { round, answers });
            if agreed {
                info!(round, "consensus reached");
                verdict = rounds
                    .last()
                    .and_then(|r| r.answers.first())
                    .and_then(|a| a.clone());
                break;
            }
            if round > self.config.reflection_turns {
                debug!(round, "reflection budget exhausted without consensus");
                break;
            }
            round += 1;
        }

        let consensus = verdict.is_some();
        let resolved = match verdict {
            Some(answer) => answer,
            None => {
                let last_answers = rounds
                    .last()
                    .map(|r| r.answers.as_slice())
                    .unwrap_or_default();
                match majority_vote(last_answers, &mut rng) {
                    Some(winner) => {
                        info!(winner = %winner, "no consensus; majority vote decided");
                        winner
                    }
                    None => prompts::NO_CONCLUSIVE_ANSWER.to_string(),
                }
            }
        };

        Ok(PanelOutcome {
            final_answer: format!("Final Answer: \n{resolved}"),
            transcript,
            chat_history,
            initial_answers,
            rounds,
            consensus,
        })
    }

    fn log_speech(&self, persona: &Persona, output: &str) {
        if self.config.verbose {
            info!(persona = %persona.name, output = %output, "speech");
        } else {
            debug!(persona = %persona.name, output = %output, "speech");
        }
    }
}
