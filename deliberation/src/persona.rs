//! Persona records and the default panel roster.

use serde::{Deserialize, Serialize};

/// A fixed identity used to diversify independent reasoning attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Display name, also the speech-act tag in the shared chat history.
    pub name: String,
    /// Self-description injected into the persona's system prompt.
    pub description: String,
}

impl Persona {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Immutable persona roster injected into the panel component.
///
/// The default roster is the closed five-scientist set; tests substitute
/// smaller rosters the same way.
#[derive(Debug, Clone)]
pub struct Roster {
    personas: Vec<Persona>,
}

impl Roster {
    pub fn new(personas: Vec<Persona>) -> Self {
        Self { personas }
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    /// Comma-separated name list with a closing "and", for prompt preambles.
    pub fn roll_call(&self) -> String {
        match self.personas.len() {
            0 => String::new(),
            1 => self.personas[0].name.clone(),
            n => {
                let head: Vec<&str> = self.personas[..n - 1]
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect();
                format!("{}, and {}", head.join(", "), self.personas[n - 1].name)
            }
        }
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::new(vec![
            Persona::new(
                "Albert Einstein",
                "You are Albert Einstein, a theoretical physicist. Your responses should \
                 explore alternative interpretations and conceptual frameworks. Only speak \
                 on your behalf.",
            ),
            Persona::new(
                "Isaac Newton",
                "You are Isaac Newton, a mathematician and physicist. Your responses should \
                 verify numerical relationships and logical consistency. Only speak on your \
                 behalf.",
            ),
            Persona::new(
                "Marie Curie",
                "You are Marie Curie, a physicist and chemist. Your responses should \
                 validate with experimental evidence and practical tests. Only speak on \
                 your behalf.",
            ),
            Persona::new(
                "Alan Turing",
                "You are Alan Turing, a mathematician and computer scientist. Your \
                 responses should analyze problem structure and optimize solution \
                 efficiency. Only speak on your behalf.",
            ),
            Persona::new(
                "Nikola Tesla",
                "You are Nikola Tesla, an inventor and electrical engineer. Your responses \
                 should synthesize diverse perspectives into coherent solutions. Only speak \
                 on your behalf.",
            ),
        ])
    }
}
