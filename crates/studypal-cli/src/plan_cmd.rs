//! `studypal plan` and `studypal subjects`: offline access to the generator
//! and the catalog, no server required.

use anyhow::{Context, Result};

use studypal_core::catalog::Catalog;
use studypal_core::export;
use studypal_core::plan;

/// Generate and print a plan. With `output`, also write the CSV rendering
/// of the schedule to a file.
pub fn run_plan(subject: &str, hours: f64, output: Option<&str>) -> Result<()> {
    let result = plan::generate(subject, hours);

    println!("{}", result.summary);
    println!();
    println!("Schedule:");
    for entry in &result.plan {
        println!("  [{}] {}", entry.time, entry.activity);
    }

    if !result.quiz.is_empty() {
        println!();
        println!("Quiz ({} questions):", result.quiz.len());
        for (i, question) in result.quiz.iter().enumerate() {
            println!("  {}. {}", i + 1, question.prompt);
            for option in &question.options {
                println!("     - {option}");
            }
        }
    }

    println!();
    println!("Motivation: {}", result.motivation);
    println!("Tips:");
    for tip in &result.tips {
        println!("  - {tip}");
    }

    if let Some(path) = output {
        let csv = export::schedule_csv(&result.plan);
        std::fs::write(path, &csv)
            .with_context(|| format!("cannot write schedule to {path}"))?;
        println!();
        println!("Exported {} rows to {path}", result.plan.len());
    }

    Ok(())
}

/// List catalog subjects with their activity and question counts.
pub fn run_subjects() -> Result<()> {
    let catalog = Catalog::shared();
    println!("Subjects:");
    for name in catalog.subject_names() {
        println!(
            "  {name}: {} activities, {} quiz questions",
            catalog.activities(name).len(),
            catalog.question_count(name),
        );
    }
    println!();
    println!("Unknown subjects fall back to a generic 4-step template with no quiz.");
    Ok(())
}
