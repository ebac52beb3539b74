//! Text output formatter

use std::collections::HashMap;
use std::time::Duration;

use marklint_core::{LintResult, Severity, Violation};

/// Formats one violation as `<file>:<line> <rule> <detail> [Context: "..."]`.
///
/// The rule description stands in for a missing detail.
pub fn format_violation(name: &str, violation: &Violation) -> String {
    let mut line = format!(
        "{}:{} {} {}",
        name,
        violation.line_number,
        violation.rule_names.join("/"),
        violation
            .detail
            .as_deref()
            .unwrap_or(&violation.rule_description)
    );
    if violation.severity == Severity::Warning {
        line.push_str(" (warning)");
    }
    if let Some(ref context) = violation.context {
        line.push_str(&format!(" [Context: \"{}\"]", context));
    }
    line
}

pub fn output_text(results: &[LintResult], timings: bool) {
    for result in results {
        for violation in &result.violations {
            println!("{}", format_violation(&result.name, violation));
        }
        for failure in &result.failures {
            eprintln!(
                "{}: rule '{}' failed: {}",
                result.name, failure.rule, failure.error
            );
        }
    }

    let total_files = results.len();
    let total_issues: usize = results.iter().map(|r| r.violations.len()).sum();
    let warnings: usize = results
        .iter()
        .flat_map(|r| &r.violations)
        .filter(|v| v.severity == Severity::Warning)
        .count();

    println!();
    println!(
        "Checked {} files, found {} issues ({} errors, {} warnings)",
        total_files,
        total_issues,
        total_issues - warnings,
        warnings
    );

    if timings {
        output_timings(results);
    }
}

fn output_timings(results: &[LintResult]) {
    let mut total_duration = Duration::new(0, 0);
    let mut rule_timings: HashMap<&str, Duration> = HashMap::new();

    for result in results {
        for timing in &result.timings {
            *rule_timings.entry(timing.rule.as_str()).or_default() += timing.elapsed;
            total_duration += timing.elapsed;
        }
    }

    if rule_timings.is_empty() {
        return;
    }

    println!("\nPerformance Timings:");
    println!("{:<30} | {:<15} | {:<10}", "Rule", "Duration", "%");
    println!("{:-<30}-+-{:-<15}-+-{:-<10}", "", "", "");

    let mut sorted_timings: Vec<_> = rule_timings.into_iter().collect();
    sorted_timings.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    for (rule, duration) in sorted_timings {
        let percentage = if total_duration.as_secs_f64() > 0.0 {
            (duration.as_secs_f64() / total_duration.as_secs_f64()) * 100.0
        } else {
            0.0
        };
        println!("{:<30} | {:<15?} | {:<10.1}%", rule, duration, percentage);
    }
    println!("{:-<30}-+-{:-<15}-+-{:-<10}", "", "", "");
    println!("{:<30} | {:<15?}", "Total", total_duration);
}
