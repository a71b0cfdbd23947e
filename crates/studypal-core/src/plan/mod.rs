//! Study-plan generation.
//!
//! Turns a subject and a requested duration into an ordered, timed activity
//! plan with an optional quiz, a summary sentence, and randomly drawn
//! motivation/tips. Generation is pure apart from the random draws; the RNG
//! is a parameter so tests can seed it.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, Difficulty, Question};

/// Maximum number of quiz questions returned per plan.
const MAX_QUIZ_QUESTIONS: usize = 3;

/// Number of study tips returned per plan.
const TIP_COUNT: usize = 2;

/// Hours assumed when the request omits the field.
pub const DEFAULT_HOURS: f64 = 1.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One timed entry of a generated plan, e.g. `{"time": "30 mins",
/// "activity": "Take a practice test"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub time: String,
    pub activity: String,
}

/// The full result of one generation call. Built per request, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct PlanResult {
    pub plan: Vec<ScheduleEntry>,
    pub quiz: Vec<Question>,
    pub summary: String,
    pub motivation: String,
    pub tips: Vec<String>,
    /// Subject echo with its first letter capitalized, e.g. `"Math"`.
    pub subject: String,
    pub total_hours: f64,
}

// ---------------------------------------------------------------------------
// Input parsing
// ---------------------------------------------------------------------------

/// Failure to parse a generation request. Converted at the HTTP boundary
/// into a `{success: false, error}` payload; never propagates further.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("could not convert string to float: {0:?}")]
    InvalidHours(String),

    #[error("hours must be a number or a numeric string")]
    HoursNotNumeric,

    #[error("hours must be a finite number")]
    NonFiniteHours,

    #[error("request body must be a JSON object")]
    NotAnObject,
}

/// Coerce a client-supplied `hours` field to `f64`.
///
/// Accepts a JSON number or a numeric string; an absent field defaults to
/// [`DEFAULT_HOURS`]. NaN and infinities are rejected so downstream minute
/// arithmetic stays meaningful. Zero and negative values are accepted and
/// produce degenerate per-activity durations; callers that care must guard.
pub fn parse_hours(value: Option<&serde_json::Value>) -> Result<f64, InputError> {
    let hours = match value {
        None | Some(serde_json::Value::Null) => DEFAULT_HOURS,
        Some(serde_json::Value::Number(n)) => {
            n.as_f64().ok_or(InputError::HoursNotNumeric)?
        }
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| InputError::InvalidHours(s.clone()))?,
        Some(_) => return Err(InputError::HoursNotNumeric),
    };
    if !hours.is_finite() {
        return Err(InputError::NonFiniteHours);
    }
    Ok(hours)
}

/// A parsed generation request: lowercased subject plus coerced hours.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub subject: String,
    pub hours: f64,
}

impl GenerateRequest {
    /// Parse a raw JSON body. The subject defaults to empty and is folded to
    /// lowercase; hours go through [`parse_hours`].
    pub fn from_json(body: &serde_json::Value) -> Result<GenerateRequest, InputError> {
        let obj = body.as_object().ok_or(InputError::NotAnObject)?;
        let subject = obj
            .get("subject")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("")
            .to_lowercase();
        let hours = parse_hours(obj.get("hours"))?;
        Ok(GenerateRequest { subject, hours })
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Per-activity minutes for a requested duration spread over `count`
/// activities. Truncates toward zero; the lost remainder is NOT
/// redistributed, so the plan total can fall a few minutes short of
/// `hours * 60`.
pub fn per_activity_minutes(hours: f64, count: usize) -> i64 {
    (hours * 60.0 / count as f64) as i64
}

/// Generate a plan using the process-wide catalog and thread-local RNG.
pub fn generate(subject: &str, hours: f64) -> PlanResult {
    generate_with(Catalog::shared(), subject, hours, &mut rand::rng())
}

/// Generate a plan from an explicit catalog and RNG.
///
/// `subject` is case-folded to lowercase before lookup. Unknown subjects get
/// the generic fallback template and an empty quiz.
pub fn generate_with<R: Rng + ?Sized>(
    catalog: &Catalog,
    subject: &str,
    hours: f64,
    rng: &mut R,
) -> PlanResult {
    let subject = subject.to_lowercase();
    let activities = catalog.activities(&subject);

    let minutes = per_activity_minutes(hours, activities.len());
    let plan: Vec<ScheduleEntry> = activities
        .iter()
        .map(|activity| ScheduleEntry {
            time: format!("{minutes} mins"),
            activity: activity.clone(),
        })
        .collect();

    let difficulty = Difficulty::for_hours(hours);
    let bank = catalog.questions(&subject, difficulty);
    // choose_multiple samples without replacement but its order is neither
    // stable nor fully random; shuffle so the returned order is.
    let mut quiz: Vec<Question> = bank
        .choose_multiple(rng, MAX_QUIZ_QUESTIONS.min(bank.len()))
        .cloned()
        .collect();
    quiz.shuffle(rng);

    let display_subject = capitalize(&subject);
    let summary = format!(
        "Your {hours}-hour study plan for {display_subject} focuses on key concepts and practice exercises."
    );

    // The pools are validated non-empty (and >= 2 tips) at catalog load.
    let motivation = catalog
        .motivation_pool()
        .choose(rng)
        .cloned()
        .unwrap_or_default();
    let tips: Vec<String> = catalog
        .tip_pool()
        .choose_multiple(rng, TIP_COUNT)
        .cloned()
        .collect();

    tracing::debug!(
        subject = %display_subject,
        hours,
        activities = plan.len(),
        quiz = quiz.len(),
        %difficulty,
        "generated study plan"
    );

    PlanResult {
        plan,
        quiz,
        summary,
        motivation,
        tips,
        subject: display_subject,
        total_hours: hours,
    }
}

/// Uppercase the first letter of an already-lowercased subject.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
