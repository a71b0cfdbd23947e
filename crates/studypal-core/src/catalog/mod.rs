//! Built-in study library: activity templates, quiz banks, and message pools.
//!
//! The data is defined in `library.toml` and embedded in the binary at
//! compile time. It is parsed and validated once, on first access, into a
//! process-wide immutable [`Catalog`]; nothing mutates it afterwards, so
//! request handlers read it without locking.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Quiz difficulty tier, selected by requested study duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
}

impl Difficulty {
    /// Tier for a requested duration: two hours or less is easy, more is
    /// medium.
    pub fn for_hours(hours: f64) -> Self {
        if hours <= 2.0 {
            Self::Easy
        } else {
            Self::Medium
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
        };
        f.write_str(s)
    }
}

impl FromStr for Difficulty {
    type Err = DifficultyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            other => Err(DifficultyParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Difficulty`] string.
#[derive(Debug, Clone)]
pub struct DifficultyParseError(pub String);

impl fmt::Display for DifficultyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid difficulty: {:?}", self.0)
    }
}

impl std::error::Error for DifficultyParseError {}

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

/// A single multiple-choice quiz question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Prompt text shown to the student.
    #[serde(rename = "question")]
    pub prompt: String,
    /// Answer options, in display order.
    pub options: Vec<String>,
    /// The correct answer. Always one of `options` (checked at load).
    pub answer: String,
}

// ---------------------------------------------------------------------------
// Embedded file types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LibraryFile {
    fallback: Vec<String>,
    motivation: Vec<String>,
    tips: Vec<String>,
    #[serde(default)]
    subjects: Vec<SubjectEntry>,
    #[serde(default)]
    questions: Vec<QuestionEntry>,
}

#[derive(Debug, Deserialize)]
struct SubjectEntry {
    name: String,
    activities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct QuestionEntry {
    subject: String,
    difficulty: Difficulty,
    prompt: String,
    options: Vec<String>,
    answer: String,
}

/// The embedded study library TOML.
static LIBRARY_TOML: &str = include_str!("library.toml");

static CATALOG: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::from_toml(LIBRARY_TOML).expect("embedded library.toml is invalid")
});

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The immutable study library: activity templates keyed by subject, quiz
/// banks keyed by subject and tier, and the motivation/tip message pools.
#[derive(Debug)]
pub struct Catalog {
    plans: HashMap<String, Vec<String>>,
    fallback: Vec<String>,
    quiz_bank: HashMap<String, HashMap<Difficulty, Vec<Question>>>,
    motivation: Vec<String>,
    tips: Vec<String>,
}

impl Catalog {
    /// The process-wide catalog, parsed from the embedded library on first
    /// access.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed. This is a compile-time
    /// invariant -- if the binary was built, the TOML is valid.
    pub fn shared() -> &'static Catalog {
        &CATALOG
    }

    /// Parse and validate a library TOML string.
    pub fn from_toml(content: &str) -> Result<Catalog, CatalogError> {
        let file: LibraryFile = toml::from_str(content)?;

        if file.tips.len() < 2 {
            return Err(CatalogError::NotEnoughTips(file.tips.len()));
        }
        if file.motivation.is_empty() {
            return Err(CatalogError::EmptyMotivationPool);
        }

        let mut plans = HashMap::new();
        for subject in file.subjects {
            if plans
                .insert(subject.name.clone(), subject.activities)
                .is_some()
            {
                return Err(CatalogError::DuplicateSubject(subject.name));
            }
        }

        let mut quiz_bank: HashMap<String, HashMap<Difficulty, Vec<Question>>> = HashMap::new();
        for entry in file.questions {
            if !entry.options.contains(&entry.answer) {
                return Err(CatalogError::AnswerNotInOptions {
                    prompt: entry.prompt,
                    answer: entry.answer,
                });
            }
            quiz_bank
                .entry(entry.subject)
                .or_default()
                .entry(entry.difficulty)
                .or_default()
                .push(Question {
                    prompt: entry.prompt,
                    options: entry.options,
                    answer: entry.answer,
                });
        }

        Ok(Catalog {
            plans,
            fallback: file.fallback,
            quiz_bank,
            motivation: file.motivation,
            tips: file.tips,
        })
    }

    /// Activity template for a subject. Unknown subjects get the generic
    /// fallback template. The subject must already be lowercased.
    pub fn activities(&self, subject: &str) -> &[String] {
        self.plans
            .get(subject)
            .map(Vec::as_slice)
            .unwrap_or(&self.fallback)
    }

    /// Whether a subject has its own activity template (vs. the fallback).
    pub fn has_subject(&self, subject: &str) -> bool {
        self.plans.contains_key(subject)
    }

    /// Quiz questions for a subject and tier. Empty slice when the subject
    /// has no quiz bank or the tier is empty.
    pub fn questions(&self, subject: &str, difficulty: Difficulty) -> &[Question] {
        self.quiz_bank
            .get(subject)
            .and_then(|tiers| tiers.get(&difficulty))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Subjects that have their own activity template, sorted.
    pub fn subject_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plans.keys().map(String::as_str).collect();
        names.sort();
        names
    }

    /// Total question count across all tiers for a subject.
    pub fn question_count(&self, subject: &str) -> usize {
        self.quiz_bank
            .get(subject)
            .map(|tiers| tiers.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn motivation_pool(&self) -> &[String] {
        &self.motivation
    }

    pub fn tip_pool(&self) -> &[String] {
        &self.tips
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while loading a study library.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("duplicate subject: {0:?}")]
    DuplicateSubject(String),

    #[error("quiz question {prompt:?} has answer {answer:?} not present in its options")]
    AnswerNotInOptions { prompt: String, answer: String },

    #[error("tip pool needs at least 2 entries, found {0}")]
    NotEnoughTips(usize),

    #[error("motivation pool must not be empty")]
    EmptyMotivationPool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_library_parses() {
        let catalog = Catalog::shared();
        assert!(catalog.has_subject("math"));
        assert!(catalog.has_subject("science"));
        assert!(catalog.has_subject("history"));
        assert!(!catalog.has_subject("art"));
    }

    #[test]
    fn known_subjects_have_four_activities() {
        let catalog = Catalog::shared();
        for subject in ["math", "science", "history"] {
            assert_eq!(
                catalog.activities(subject).len(),
                4,
                "subject {subject} should have 4 activities"
            );
        }
    }

    #[test]
    fn unknown_subject_falls_back_to_generic_template() {
        let catalog = Catalog::shared();
        let activities = catalog.activities("art");
        assert_eq!(activities.len(), 4);
        assert_eq!(activities[0], "Review key concepts");
    }

    #[test]
    fn quiz_bank_has_both_tiers_for_math_and_science() {
        let catalog = Catalog::shared();
        for subject in ["math", "science"] {
            assert_eq!(catalog.questions(subject, Difficulty::Easy).len(), 2);
            assert_eq!(catalog.questions(subject, Difficulty::Medium).len(), 2);
        }
        assert!(catalog.questions("history", Difficulty::Easy).is_empty());
    }

    #[test]
    fn every_answer_is_one_of_its_options() {
        let catalog = Catalog::shared();
        for subject in ["math", "science"] {
            for tier in [Difficulty::Easy, Difficulty::Medium] {
                for q in catalog.questions(subject, tier) {
                    assert!(
                        q.options.contains(&q.answer),
                        "{:?} has answer {:?} outside its options",
                        q.prompt,
                        q.answer
                    );
                }
            }
        }
    }

    #[test]
    fn tip_pool_has_at_least_two_entries() {
        assert!(Catalog::shared().tip_pool().len() >= 2);
    }

    #[test]
    fn difficulty_for_hours_boundary() {
        assert_eq!(Difficulty::for_hours(1.0), Difficulty::Easy);
        assert_eq!(Difficulty::for_hours(2.0), Difficulty::Easy);
        assert_eq!(Difficulty::for_hours(2.5), Difficulty::Medium);
        assert_eq!(Difficulty::for_hours(4.0), Difficulty::Medium);
    }

    #[test]
    fn difficulty_roundtrips_through_strings() {
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert!("hard".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Easy.to_string(), "easy");
    }

    #[test]
    fn rejects_answer_outside_options() {
        let bad = r#"
fallback = ["a", "b"]
motivation = ["m"]
tips = ["t1", "t2"]

[[questions]]
subject = "math"
difficulty = "easy"
prompt = "What is 1 + 1?"
options = ["3", "4"]
answer = "2"
"#;
        let err = Catalog::from_toml(bad).unwrap_err();
        assert!(matches!(err, CatalogError::AnswerNotInOptions { .. }));
    }

    #[test]
    fn rejects_short_tip_pool() {
        let bad = r#"
fallback = ["a"]
motivation = ["m"]
tips = ["only one"]
"#;
        let err = Catalog::from_toml(bad).unwrap_err();
        assert!(matches!(err, CatalogError::NotEnoughTips(1)));
    }

    #[test]
    fn rejects_duplicate_subject() {
        let bad = r#"
fallback = ["a"]
motivation = ["m"]
tips = ["t1", "t2"]

[[subjects]]
name = "math"
activities = ["x"]

[[subjects]]
name = "math"
activities = ["y"]
"#;
        let err = Catalog::from_toml(bad).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateSubject(s) if s == "math"));
    }
}
