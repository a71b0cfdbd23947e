//! Schedule CSV rendering.
//!
//! A plain two-column join with no quoting: activity text containing a comma
//! will shift columns in the output. Kept byte-compatible with what the
//! frontend already parses; see DESIGN.md before adding escaping.

use crate::plan::ScheduleEntry;

/// Header row of every exported schedule.
pub const CSV_HEADER: &str = "Time,Activity";

/// Render a plan as CSV: header row, then one `{time},{activity}` row per
/// entry, `\n` endings with a trailing newline.
pub fn schedule_csv(plan: &[ScheduleEntry]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for entry in plan {
        out.push_str(&entry.time);
        out.push(',');
        out.push_str(&entry.activity);
        out.push('\n');
    }
    out
}

/// Download filename for a subject's schedule, e.g. `Math_Study_Plan.csv`.
pub fn schedule_filename(subject: &str) -> String {
    format!("{subject}_Study_Plan.csv")
}
