//! Known engine error codes.
//!
//! The remote engines report failures as numeric codes embedded in message
//! text ("SWMM error 235", "EPANET error 110"). Messages are always shown
//! verbatim; this module only attaches a one-line description and a hint
//! when the code is in the knowledge base (see docs/error-codes.md).

use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Swmm,
    Epanet,
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::Swmm => write!(f, "SWMM"),
            Engine::Epanet => write!(f, "EPANET"),
        }
    }
}

/// A knowledge-base entry for one engine error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownError {
    pub engine: Engine,
    pub code: u32,
    pub description: &'static str,
    pub hint: &'static str,
}

/// An engine error code found in failure text, with its KB entry when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineErrorMatch {
    pub engine: Engine,
    pub code: u32,
    pub known: Option<&'static KnownError>,
}

// Kept in sync with docs/error-codes.md.
static KNOWN_ERRORS: &[KnownError] = &[
    KnownError {
        engine: Engine::Swmm,
        code: 101,
        description: "memory allocation error",
        hint: "The model may be too large for the engine's memory budget; try splitting it.",
    },
    KnownError {
        engine: Engine::Swmm,
        code: 108,
        description: "ambiguous outlet ID name in subcatchment",
        hint: "An outlet name matches both a node and a subcatchment; rename one of them.",
    },
    KnownError {
        engine: Engine::Swmm,
        code: 138,
        description: "node initial depth greater than maximum depth",
        hint: "Lower the node's initial depth or raise its maximum depth in [JUNCTIONS].",
    },
    KnownError {
        engine: Engine::Swmm,
        code: 200,
        description: "one or more errors in input file",
        hint: "Run `wrapi validate <file>` locally and check the report artifact for details.",
    },
    KnownError {
        engine: Engine::Swmm,
        code: 209,
        description: "undefined object referenced",
        hint: "A named object (time series, curve, pattern) is used before it is defined.",
    },
    KnownError {
        engine: Engine::Swmm,
        code: 235,
        description: "invalid infiltration parameters",
        hint: "For GREEN_AMPT, IMD must be between 0 and 1; `wrapi validate` flags this.",
    },
    KnownError {
        engine: Engine::Swmm,
        code: 317,
        description: "cannot open rainfall data file",
        hint: "External rain files are not uploaded automatically; pass them with --aux.",
    },
    KnownError {
        engine: Engine::Epanet,
        code: 101,
        description: "insufficient memory",
        hint: "The network may be too large for the engine's memory budget.",
    },
    KnownError {
        engine: Engine::Epanet,
        code: 110,
        description: "cannot solve network hydraulic equations",
        hint: "The network is likely disconnected or has unrealistic pipe/pump parameters.",
    },
    KnownError {
        engine: Engine::Epanet,
        code: 200,
        description: "one or more errors in input file",
        hint: "Run `wrapi validate <file>` locally and check the report artifact for details.",
    },
    KnownError {
        engine: Engine::Epanet,
        code: 203,
        description: "undefined node referenced",
        hint: "A link references a node ID that is never defined.",
    },
];

fn error_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(SWMM|EPANET)\s+error\s+(\d{3})\b")
            .expect("engine error code regex is valid")
    })
}

/// Look up a code in the knowledge base.
pub fn describe(engine: Engine, code: u32) -> Option<&'static KnownError> {
    KNOWN_ERRORS
        .iter()
        .find(|e| e.engine == engine && e.code == code)
}

/// Scan failure text (error messages, log lines) for engine error codes.
/// Duplicate mentions of the same code are collapsed.
pub fn scan_for_engine_errors(text: &str) -> Vec<EngineErrorMatch> {
    let mut matches: Vec<EngineErrorMatch> = Vec::new();
    for captures in error_code_regex().captures_iter(text) {
        let engine = match captures[1].to_uppercase().as_str() {
            "SWMM" => Engine::Swmm,
            _ => Engine::Epanet,
        };
        let Ok(code) = captures[2].parse::<u32>() else {
            continue;
        };
        if matches.iter().any(|m| m.engine == engine && m.code == code) {
            continue;
        }
        matches.push(EngineErrorMatch {
            engine,
            code,
            known: describe(engine, code),
        });
    }
    matches
}
