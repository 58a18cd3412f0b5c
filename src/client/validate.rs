//! Local pre-submission lint for SWMM and EPANET input files.
//!
//! These checks catch a handful of issues that reliably fail remote runs
//! (absolute external file references, bad GREEN_AMPT parameters, undefined
//! time series). They work at the line/regex level; no semantic model of
//! the input formats is built.

use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    #[error("input file not found: {0}")]
    NotFound(std::path::PathBuf),
    #[error("failed to read input file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One lint finding. `line` is 1-based; 0 means the finding is about the
/// file as a whole (section ordering).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub line: usize,
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Swmm,
    Epanet,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputKind::Swmm => write!(f, "SWMM"),
            InputKind::Epanet => write!(f, "EPANET"),
        }
    }
}

/// Guess the input kind from the first ~1000 bytes. [PIPES]/[TANKS] only
/// occur in EPANET files and are checked first; [JUNCTIONS] appears in both
/// formats and [SUBCATCHMENTS] only in SWMM.
pub fn sniff_input_kind(content: &str) -> Option<InputKind> {
    let head: String = content.chars().take(1000).collect::<String>().to_uppercase();
    if head.contains("[PIPES]") || head.contains("[TANKS]") {
        Some(InputKind::Epanet)
    } else if head.contains("[JUNCTIONS]") || head.contains("[SUBCATCHMENTS]") {
        Some(InputKind::Swmm)
    } else {
        None
    }
}

/// Lint a file, sniffing its kind first. An unrecognized file is linted as
/// SWMM; the returned bool is false in that case so callers can warn.
pub fn validate_file(path: &Path) -> Result<(InputKind, bool, Vec<Finding>), ValidateError> {
    if !path.exists() {
        return Err(ValidateError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let (kind, recognized) = match sniff_input_kind(&content) {
        Some(kind) => (kind, true),
        None => (InputKind::Swmm, false),
    };
    let findings = match kind {
        InputKind::Swmm => validate_swmm(&content),
        InputKind::Epanet => validate_epanet(&content),
    };
    Ok((kind, recognized, findings))
}

fn quoted_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"["']([^"']+)["']"#).expect("quoted path regex is valid"))
}

fn epanet_file_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)FILE\s+["']?([^"'\s]+)["']?"#).expect("FILE ref regex is valid")
    })
}

/// Absolute paths (Windows drive or Unix root) will not exist on the
/// simulation host.
fn is_absolute_reference(file_ref: &str) -> bool {
    file_ref.contains(":\\") || file_ref.starts_with('/')
}

fn external_file_finding(line: usize, file_ref: &str) -> Finding {
    Finding {
        line,
        severity: Severity::Warning,
        message: format!("External file reference: {}", file_ref),
        suggestion: "Include this file as auxiliary or use a relative path".to_string(),
    }
}

pub fn validate_swmm(content: &str) -> Vec<Finding> {
    let mut findings = Vec::new();

    let mut defined_timeseries: HashSet<String> = HashSet::new();
    let mut current_section: Option<String> = None;
    let mut section_order: Vec<String> = Vec::new();
    // (line, name) of TIMESERIES references in [RAINGAGES]; checked after
    // the whole file is scanned so forward definitions still count.
    let mut raingage_refs: Vec<(usize, String)> = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();

        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            let section = trimmed[1..trimmed.len() - 1].to_uppercase();
            section_order.push(section.clone());
            current_section = Some(section);
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }

        if line.to_uppercase().contains("FILE") {
            if let Some(captures) = quoted_path_regex().captures(line) {
                let file_ref = &captures[1];
                if is_absolute_reference(file_ref) {
                    findings.push(external_file_finding(line_no, file_ref));
                }
            }
        }

        match current_section.as_deref() {
            Some("TIMESERIES") => {
                if let Some(name) = trimmed.split_whitespace().next() {
                    defined_timeseries.insert(name.to_string());
                }
            }
            Some("INFILTRATION") => {
                // GREEN_AMPT rows: Subcatchment Suction Ksat IMD; IMD is a
                // fraction and must be in [0, 1].
                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                if parts.len() >= 4 {
                    if let Ok(imd) = parts[3].parse::<f64>() {
                        if imd > 1.0 {
                            findings.push(Finding {
                                line: line_no,
                                severity: Severity::Error,
                                message: format!(
                                    "IMD value {} > 1.0 (should be 0-1 for GREEN_AMPT)",
                                    imd
                                ),
                                suggestion:
                                    "Set IMD to a value between 0 and 1 (e.g., 0.25)".to_string(),
                            });
                        }
                    }
                }
            }
            Some("RAINGAGES") => {
                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                if let Some(pos) = parts.iter().position(|p| p.eq_ignore_ascii_case("TIMESERIES"))
                {
                    if let Some(name) = parts.get(pos + 1) {
                        raingage_refs.push((line_no, name.to_string()));
                    }
                }
            }
            _ => {}
        }
    }

    for (line_no, name) in raingage_refs {
        if !defined_timeseries.contains(&name) {
            findings.push(Finding {
                line: line_no,
                severity: Severity::Error,
                message: format!("Undefined TIMESERIES: {}", name),
                suggestion: format!("Define '{}' in a [TIMESERIES] section", name),
            });
        }
    }

    let raingage_pos = section_order.iter().position(|s| s == "RAINGAGES");
    let timeseries_pos = section_order.iter().position(|s| s == "TIMESERIES");
    if let (Some(rg), Some(ts)) = (raingage_pos, timeseries_pos) {
        if rg < ts {
            findings.push(Finding {
                line: 0,
                severity: Severity::Warning,
                message: "[RAINGAGES] appears before [TIMESERIES]".to_string(),
                suggestion: "Move the [TIMESERIES] section before [RAINGAGES]".to_string(),
            });
        }
    }

    findings
}

pub fn validate_epanet(content: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    for captures in epanet_file_regex().captures_iter(content) {
        let file_ref = &captures[1];
        if is_absolute_reference(file_ref) {
            let offset = captures.get(0).map(|m| m.start()).unwrap_or(0);
            let line_no = content[..offset].matches('\n').count() + 1;
            findings.push(external_file_finding(line_no, file_ref));
        }
    }
    findings
}
