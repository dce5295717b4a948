//! Persona definitions and system instruction composition
//!
//! The assistant always speaks with the same RTU domain knowledge; the
//! persona only changes the voice. The preamble is concatenated ahead of
//! the persona text so tone can never widen the factual scope.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain knowledge shared by every persona. The scope-restriction clause
/// (decline non-academic topics) is persona-invariant.
pub const DOMAIN_PREAMBLE: &str = "\
You are Gupshup AI, a specialized assistant for RTU (Rajasthan Technical University) students.
Your tone depends on the [Persona] provided.

RTU KNOWLEDGE BASE:
1. Grading: Percentage = (CGPA * 10) - 7.5.
2. Passing: Min 24/80 in theory, 40/100 total (Theory + Sessional). 75% attendance is mandatory.
3. Grace Marks: Usually up to 6-10 marks total in a semester if only 1-2 subjects are failing.
4. Scope: Only answer RTU-related or engineering study questions. Politely decline non-academic/non-RTU topics.

NOTES LOGIC:
- If a user asks for notes, you MUST use 'find_note'.
- If a user shares a resource link, you MUST use 'save_note'.";

const PROFESSOR_VOICE: &str = "\
Persona voice: a strict but caring professor. Be precise, expect effort \
from the student, and push them toward understanding rather than shortcuts.";

const FRIEND_VOICE: &str = "\
Persona voice: a friendly batchmate. Keep it casual and encouraging, use \
plain language, and celebrate small wins.";

const PLACEMENT_VOICE: &str = "\
Persona voice: a placement officer. Focus on employability - interviews, \
resumes, aptitude prep - and keep answers practical and direct.";

const EXAM_VOICE: &str = "\
Persona voice: an exam buddy during exam week. Prioritize what scores \
marks: important topics, previous-year patterns, and quick revision plans.";

/// The closed set of personas the UI can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Persona {
    Professor,
    Friend,
    Placement,
    Exam,
}

impl Persona {
    pub const ALL: [Persona; 4] = [
        Persona::Professor,
        Persona::Friend,
        Persona::Placement,
        Persona::Exam,
    ];

    /// The wire key, as selected by the chat UI.
    pub fn key(&self) -> &'static str {
        match self {
            Persona::Professor => "professor",
            Persona::Friend => "friend",
            Persona::Placement => "placement",
            Persona::Exam => "exam",
        }
    }

    fn voice(&self) -> &'static str {
        match self {
            Persona::Professor => PROFESSOR_VOICE,
            Persona::Friend => FRIEND_VOICE,
            Persona::Placement => PLACEMENT_VOICE,
            Persona::Exam => EXAM_VOICE,
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Unknown persona key. Surfaces at request deserialization, so the
/// handler rejects the turn before any dispatch happens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown persona: {0}")]
pub struct InvalidPersonaError(pub String);

impl FromStr for Persona {
    type Err = InvalidPersonaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "professor" => Ok(Persona::Professor),
            "friend" => Ok(Persona::Friend),
            "placement" => Ok(Persona::Placement),
            "exam" => Ok(Persona::Exam),
            other => Err(InvalidPersonaError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Persona {
    type Error = InvalidPersonaError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Persona> for String {
    fn from(p: Persona) -> Self {
        p.key().to_string()
    }
}

/// Build the full system instruction for a persona: domain preamble first,
/// persona voice second.
pub fn compose_system_instruction(persona: Persona) -> String {
    format!("{}\n\n{}", DOMAIN_PREAMBLE, persona.voice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preamble_precedes_voice_for_all_personas() {
        for persona in Persona::ALL {
            let instruction = compose_system_instruction(persona);
            assert!(instruction.starts_with(DOMAIN_PREAMBLE));
            let voice_pos = instruction.find("Persona voice:").unwrap();
            assert!(voice_pos > DOMAIN_PREAMBLE.len());
        }
    }

    #[test]
    fn test_scope_clause_is_persona_invariant() {
        for persona in Persona::ALL {
            let instruction = compose_system_instruction(persona);
            assert!(instruction.contains("Politely decline non-academic/non-RTU topics."));
        }
    }

    #[test]
    fn test_parse_known_keys() {
        assert_eq!("professor".parse::<Persona>().unwrap(), Persona::Professor);
        assert_eq!("FRIEND".parse::<Persona>().unwrap(), Persona::Friend);
        assert_eq!("placement".parse::<Persona>().unwrap(), Persona::Placement);
        assert_eq!("exam".parse::<Persona>().unwrap(), Persona::Exam);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = "pirate".parse::<Persona>().unwrap_err();
        assert_eq!(err, InvalidPersonaError("pirate".to_string()));
    }

    #[test]
    fn test_persona_roundtrips_through_json() {
        let json = serde_json::to_string(&Persona::Exam).unwrap();
        assert_eq!(json, "\"exam\"");
        let back: Persona = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Persona::Exam);

        let bad: Result<Persona, _> = serde_json::from_str("\"wizard\"");
        assert!(bad.is_err());
    }
}
