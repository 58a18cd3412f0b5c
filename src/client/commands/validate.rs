//! `wrapi validate` - local lint of input files before submission.

use std::path::PathBuf;

use log::warn;

use crate::client::commands::{print_error, print_json};
use crate::client::validate::{Finding, Severity, validate_file};

#[derive(serde::Serialize)]
struct FileReport {
    file: String,
    kind: String,
    errors: usize,
    warnings: usize,
    findings: Vec<FindingReport>,
}

#[derive(serde::Serialize)]
struct FindingReport {
    line: usize,
    severity: String,
    message: String,
    suggestion: String,
}

pub fn handle_validate(inputs: &[PathBuf], format: &str) {
    let mut reports = Vec::new();
    let mut total_errors = 0;

    for input in inputs {
        let (kind, recognized, findings) = match validate_file(input) {
            Ok(result) => result,
            Err(e) => {
                print_error(&format!("validating {}", input.display()), &e);
                std::process::exit(1);
            }
        };
        if !recognized {
            warn!(
                "{}: could not determine file type, trying SWMM validation",
                input.display()
            );
        }

        let errors = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
        let warnings = findings.len() - errors;
        total_errors += errors;

        if format == "json" {
            reports.push(FileReport {
                file: input.display().to_string(),
                kind: kind.to_string(),
                errors,
                warnings,
                findings: findings
                    .iter()
                    .map(|f| FindingReport {
                        line: f.line,
                        severity: f.severity.to_string(),
                        message: f.message.clone(),
                        suggestion: f.suggestion.clone(),
                    })
                    .collect(),
            });
        } else {
            print_file_report(input, kind.to_string(), &findings, errors, warnings);
        }
    }

    if format == "json" {
        print_json(&reports);
    }
    if total_errors > 0 {
        std::process::exit(1);
    }
}

fn print_file_report(
    input: &PathBuf,
    kind: String,
    findings: &[Finding],
    errors: usize,
    warnings: usize,
) {
    println!("Validating: {} ({})", input.display(), kind);
    if findings.is_empty() {
        println!("  No issues found");
        return;
    }
    for finding in findings {
        let location = if finding.line == 0 {
            "file".to_string()
        } else {
            format!("line {}", finding.line)
        };
        println!("  [{}] {}: {}", finding.severity, location, finding.message);
        println!("    suggestion: {}", finding.suggestion);
    }
    println!("  Summary: {} errors, {} warnings", errors, warnings);
}
