//! Reader archetypes and the short onboarding quiz that assigns one.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz is already complete")]
    Completed,

    #[error("unknown archetype: {0:?}")]
    UnknownArchetype(String),

    #[error("question {question} has no option {option}")]
    NoSuchOption { question: usize, option: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Warrior,
    Sage,
    Seeker,
    Guardian,
}

impl Archetype {
    /// Declaration order; also the tie-break order when scoring.
    pub const ALL: [Archetype; 4] = [
        Archetype::Warrior,
        Archetype::Sage,
        Archetype::Seeker,
        Archetype::Guardian,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Archetype::Warrior => "warrior",
            Archetype::Sage => "sage",
            Archetype::Seeker => "seeker",
            Archetype::Guardian => "guardian",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Archetype::Warrior => "The Warrior",
            Archetype::Sage => "The Sage",
            Archetype::Seeker => "The Seeker",
            Archetype::Guardian => "The Guardian",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Archetype::Warrior => {
                "You are driven by courage, action, and unyielding duty. Your path is one of strength and righteousness."
            }
            Archetype::Sage => {
                "You seek wisdom beyond the veil. Your path is one of contemplation, knowledge, and inner peace."
            }
            Archetype::Seeker => {
                "You are a traveler of worlds. Your path is defined by curiosity, discovery, and the joy of experience."
            }
            Archetype::Guardian => {
                "You are the shield of tradition. Your path is one of loyalty, protection, and preserving the sacred."
            }
        }
    }

    fn slot(self) -> usize {
        match self {
            Archetype::Warrior => 0,
            Archetype::Sage => 1,
            Archetype::Seeker => 2,
            Archetype::Guardian => 3,
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Archetype {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Archetype::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| QuizError::UnknownArchetype(s.to_owned()))
    }
}

impl<'de> Deserialize<'de> for Archetype {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Profile payloads may carry labels this client does not know; those read as unset.
pub(crate) fn lenient_archetype<'de, D>(deserializer: D) -> Result<Option<Archetype>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.parse().ok()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOption {
    pub text: &'static str,
    pub archetype: Archetype,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizQuestion {
    pub prompt: &'static str,
    pub options: [QuizOption; 4],
}

const fn option(text: &'static str, archetype: Archetype) -> QuizOption {
    QuizOption { text, archetype }
}

pub const QUESTIONS: [QuizQuestion; 3] = [
    QuizQuestion {
        prompt: "When faced with a difficult choice, your first instinct is to...",
        options: [
            option("Act decisively to resolve it", Archetype::Warrior),
            option("Seek deep knowledge and wisdom", Archetype::Sage),
            option("Explore the unknown paths", Archetype::Seeker),
            option("Protect and preserve tradition", Archetype::Guardian),
        ],
    },
    QuizQuestion {
        prompt: "Which setting calls to your soul the most?",
        options: [
            option("A grand battlefield of ideals", Archetype::Warrior),
            option("A silent cave of meditation", Archetype::Sage),
            option("An endless winding road", Archetype::Seeker),
            option("A warm, enduring ancient temple", Archetype::Guardian),
        ],
    },
    QuizQuestion {
        prompt: "What is the ultimate purpose of a story?",
        options: [
            option("To inspire courage and duty", Archetype::Warrior),
            option("To reveal hidden cosmic truths", Archetype::Sage),
            option("To experience different lives", Archetype::Seeker),
            option("To connect us to our ancestors", Archetype::Guardian),
        ],
    },
];

/// State after an answer is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStep {
    Next(usize),
    Finished(Archetype),
}

/// Scores answers one point at a time and picks the archetype with the most points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchetypeQuiz {
    step: usize,
    scores: [u32; 4],
    result: Option<Archetype>,
}

impl ArchetypeQuiz {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The question awaiting an answer, or `None` once finished.
    #[must_use]
    pub fn current_question(&self) -> Option<&'static QuizQuestion> {
        if self.result.is_some() {
            return None;
        }
        QUESTIONS.get(self.step)
    }

    #[must_use]
    pub fn step(&self) -> usize {
        self.step
    }

    #[must_use]
    pub fn result(&self) -> Option<Archetype> {
        self.result
    }

    #[must_use]
    pub fn score(&self, archetype: Archetype) -> u32 {
        self.scores[archetype.slot()]
    }

    /// Record one answer.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Completed` if every question was already answered.
    pub fn answer(&mut self, archetype: Archetype) -> Result<QuizStep, QuizError> {
        if self.result.is_some() {
            return Err(QuizError::Completed);
        }
        self.scores[archetype.slot()] += 1;

        if self.step + 1 < QUESTIONS.len() {
            self.step += 1;
            return Ok(QuizStep::Next(self.step));
        }

        let winner = self.leader();
        self.result = Some(winner);
        Ok(QuizStep::Finished(winner))
    }

    /// Record the answer picked by position within the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoSuchOption` for an out-of-range option and
    /// `QuizError::Completed` once finished.
    pub fn answer_option(&mut self, option: usize) -> Result<QuizStep, QuizError> {
        let question = self.current_question().ok_or(QuizError::Completed)?;
        let picked = question.options.get(option).ok_or(QuizError::NoSuchOption {
            question: self.step,
            option,
        })?;
        self.answer(picked.archetype)
    }

    fn leader(&self) -> Archetype {
        // strictly greater keeps the earlier archetype on ties
        Archetype::ALL
            .into_iter()
            .fold(Archetype::Warrior, |best, candidate| {
                if self.score(candidate) > self.score(best) {
                    candidate
                } else {
                    best
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majority_wins() {
        let mut quiz = ArchetypeQuiz::new();
        assert_eq!(quiz.answer(Archetype::Seeker).unwrap(), QuizStep::Next(1));
        assert_eq!(quiz.answer(Archetype::Sage).unwrap(), QuizStep::Next(2));
        assert_eq!(
            quiz.answer(Archetype::Seeker).unwrap(),
            QuizStep::Finished(Archetype::Seeker)
        );
        assert_eq!(quiz.result(), Some(Archetype::Seeker));
        assert!(quiz.current_question().is_none());
    }

    #[test]
    fn ties_go_to_the_earlier_archetype() {
        let mut quiz = ArchetypeQuiz::new();
        quiz.answer(Archetype::Guardian).unwrap();
        quiz.answer(Archetype::Sage).unwrap();
        let last = quiz.answer(Archetype::Seeker).unwrap();
        assert_eq!(last, QuizStep::Finished(Archetype::Sage));
    }

    #[test]
    fn answering_after_finish_is_rejected() {
        let mut quiz = ArchetypeQuiz::new();
        for _ in 0..QUESTIONS.len() {
            quiz.answer_option(0).unwrap();
        }
        assert_eq!(quiz.result(), Some(Archetype::Warrior));
        assert_eq!(quiz.answer(Archetype::Sage), Err(QuizError::Completed));
        assert_eq!(quiz.score(Archetype::Sage), 0);
    }

    #[test]
    fn option_index_is_bounds_checked() {
        let mut quiz = ArchetypeQuiz::new();
        assert_eq!(
            quiz.answer_option(4),
            Err(QuizError::NoSuchOption { question: 0, option: 4 })
        );
        assert_eq!(quiz.step(), 0);
    }

    #[test]
    fn parses_labels_case_insensitively() {
        assert_eq!("Warrior".parse::<Archetype>().unwrap(), Archetype::Warrior);
        assert!("trickster".parse::<Archetype>().is_err());
    }
}
