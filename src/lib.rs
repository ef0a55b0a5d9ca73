use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::{debug, error, warn};

pub mod error;
pub mod json_depth;
pub mod markdown;
pub mod scanner;
pub mod tool;

pub use error::{GatewayError, SectionError, SectionResult};
pub use markdown::MarkdownStructure;
pub use scanner::CharacterStats;
pub use tool::{call_tool, ToolDefinition};

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BracketReport {
    pub round: usize,
    pub square: usize,
    pub curly: usize,
    #[serde(rename = "isSymmetric")]
    pub is_symmetric: bool,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JsonReport {
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    pub depth: usize,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownReport {
    pub heading_count: usize,
    pub headings: Vec<String>,
    pub link_count: usize,
    pub image_count: usize,
    pub code_block_count: usize,
    pub list_count: usize,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub chinese_count: usize,
    pub english_count: usize,
    pub word_count: usize,
    pub bracket_report: BracketReport,
    #[serde(rename = "json")]
    pub json_report: JsonReport,
    pub markdown_report: MarkdownReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Returned instead of a report when the input is rejected or the pipeline faults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayErrorResponse {
    pub error: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl GatewayErrorResponse {
    pub(crate) fn new(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ToolResponse {
    Report(AnalysisReport),
    Error(GatewayErrorResponse),
}

impl ToolResponse {
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            ToolResponse::Report(report) => Some(report),
            ToolResponse::Error(_) => None,
        }
    }

    pub fn gateway_error(&self) -> Option<&GatewayErrorResponse> {
        match self {
            ToolResponse::Report(_) => None,
            ToolResponse::Error(err) => Some(err),
        }
    }
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Longest accepted input, in characters.
    pub max_input_chars: usize,
    /// Longest `details` payload on a gateway error, in characters.
    pub detail_chars: usize,
    /// Deepest JSON nesting accepted; deeper documents are reported as
    /// exceeding the depth limit.
    pub max_json_depth: usize,
}

pub static LIMITS: Limits = Limits {
    max_input_chars: 50_000,
    detail_chars: 500,
    max_json_depth: 1000,
};

impl Default for Limits {
    fn default() -> Self {
        LIMITS
    }
}

pub const PARTIAL_RESULT_WARNING: &str =
    "One or more analyses failed; see the section error fields.";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Run one section, turning a panic into a `SectionError::Fault`.
fn run_section<T>(
    section: &'static str,
    f: impl FnOnce() -> SectionResult<T>,
) -> SectionResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(SectionError::Fault {
            section,
            message: panic_message(payload.as_ref()),
        }),
    }
}

/// Keep at most `max_chars` characters, never splitting a code point.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Report aggregation
// ---------------------------------------------------------------------------

/// Merge three independently computed sections into one report.
///
/// A failed section contributes only its error string; its numbers stay at
/// their defaults and the other sections are untouched.
pub fn assemble(
    characters: SectionResult<CharacterStats>,
    json: SectionResult<usize>,
    markdown: SectionResult<MarkdownStructure>,
) -> AnalysisReport {
    let (stats, bracket_error) = match characters {
        Ok(stats) => (stats, String::new()),
        Err(err) => {
            warn!(error = %err, "character scan failed");
            (CharacterStats::default(), err.to_string())
        }
    };

    let json_report = match json {
        Ok(depth) => JsonReport {
            is_valid: true,
            depth,
            error: String::new(),
        },
        Err(err) => {
            debug!(error = %err, "input is not usable JSON");
            JsonReport {
                error: err.to_string(),
                ..JsonReport::default()
            }
        }
    };

    let markdown_report = match markdown {
        Ok(md) => MarkdownReport {
            heading_count: md.headings.len(),
            headings: md.headings,
            link_count: md.links,
            image_count: md.images,
            code_block_count: md.code_blocks,
            list_count: md.list_items,
            error: String::new(),
        },
        Err(err) => {
            warn!(error = %err, "markdown extraction failed");
            MarkdownReport {
                error: err.to_string(),
                ..MarkdownReport::default()
            }
        }
    };

    let bracket_report = BracketReport {
        round: stats.round,
        square: stats.square,
        curly: stats.curly,
        is_symmetric: stats.symmetric,
        error: bracket_error,
    };

    let partial = !bracket_report.error.is_empty()
        || !json_report.error.is_empty()
        || !markdown_report.error.is_empty();

    AnalysisReport {
        chinese_count: stats.chinese,
        english_count: stats.english,
        word_count: stats.words,
        bracket_report,
        json_report,
        markdown_report,
        warning: partial.then(|| PARTIAL_RESULT_WARNING.to_string()),
    }
}

/// Run all three analyses over `text`, each in its own failure scope.
pub fn build_report(text: &str, limits: &Limits) -> AnalysisReport {
    let characters = run_section("character", || scanner::scan(text));
    let json = run_section("json", || json_depth::analyze(text, limits.max_json_depth));
    let markdown = run_section("markdown", || markdown::extract(text));

    if let Ok(stats) = &characters {
        debug!(
            chinese = stats.chinese,
            english = stats.english,
            words = stats.words,
            symmetric = stats.symmetric,
            "character scan done"
        );
    }
    if let Ok(md) = &markdown {
        debug!(
            headings = md.headings.len(),
            links = md.links,
            code_blocks = md.code_blocks,
            "markdown extraction done"
        );
    }

    assemble(characters, json, markdown)
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Reject input that must not be analyzed.
pub fn validate(text: &str, limits: &Limits) -> Result<(), GatewayError> {
    if text.trim().is_empty() {
        return Err(GatewayError::EmptyInput);
    }
    let actual = text.chars().count();
    if actual > limits.max_input_chars {
        return Err(GatewayError::InputTooLong {
            max: limits.max_input_chars,
            actual,
        });
    }
    Ok(())
}

/// Validate and analyze `text`; every failure comes back as a value.
pub fn analyze_text_with(text: &str, limits: &Limits) -> ToolResponse {
    guard(limits, || validate(text, limits).map(|()| build_report(text, limits)))
}

/// Outermost boundary: a rejection or a panic inside `f` becomes a
/// `GatewayErrorResponse`.
fn guard(
    limits: &Limits,
    f: impl FnOnce() -> Result<AnalysisReport, GatewayError>,
) -> ToolResponse {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(report)) => ToolResponse::Report(report),
        Ok(Err(rejected)) => {
            debug!(reason = %rejected, "input rejected");
            ToolResponse::Error(GatewayErrorResponse::new(rejected.to_string(), None))
        }
        Err(payload) => {
            let details = panic_message(payload.as_ref());
            error!(details = %details, "analysis pipeline faulted");
            ToolResponse::Error(GatewayErrorResponse::new(
                "Text analysis failed unexpectedly",
                Some(truncate_chars(&details, limits.detail_chars)),
            ))
        }
    }
}

pub fn analyze_text(text: &str) -> ToolResponse {
    analyze_text_with(text, &LIMITS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_section_keeps_siblings_intact() {
        let characters = scanner::scan("(a]").unwrap();
        let markdown = markdown::extract("# H").unwrap();
        let report = assemble(
            Ok(characters.clone()),
            Err(SectionError::Internal("boom".to_string())),
            Ok(markdown),
        );
        assert_eq!(report.english_count, characters.english);
        assert!(!report.bracket_report.is_symmetric);
        assert_eq!(
            report.json_report,
            JsonReport {
                is_valid: false,
                depth: 0,
                error: "boom".to_string(),
            }
        );
        assert_eq!(report.markdown_report.headings, vec!["# H"]);
        assert_eq!(report.warning.as_deref(), Some(PARTIAL_RESULT_WARNING));
    }

    #[test]
    fn failed_character_scan_zeroes_counts() {
        let report = assemble(
            Err(SectionError::Internal("scan broke".to_string())),
            Ok(2),
            Ok(MarkdownStructure::default()),
        );
        assert_eq!(report.chinese_count, 0);
        assert_eq!(report.english_count, 0);
        assert_eq!(report.word_count, 0);
        assert_eq!(report.bracket_report.round, 0);
        assert!(!report.bracket_report.is_symmetric);
        assert_eq!(report.bracket_report.error, "scan broke");
        assert_eq!(report.json_report.depth, 2);
        assert!(report.markdown_report.error.is_empty());
        assert!(report.warning.is_some());
    }

    #[test]
    fn failed_markdown_section_resets_to_defaults() {
        let report = assemble(
            Ok(CharacterStats::default()),
            Ok(0),
            Err(SectionError::Internal("regex".to_string())),
        );
        assert_eq!(report.markdown_report.heading_count, 0);
        assert!(report.markdown_report.headings.is_empty());
        assert_eq!(report.markdown_report.error, "regex");
    }

    #[test]
    fn no_warning_when_every_section_succeeds() {
        let report = assemble(
            Ok(CharacterStats::default()),
            Ok(0),
            Ok(MarkdownStructure::default()),
        );
        assert!(report.warning.is_none());
    }

    #[test]
    fn panicking_section_becomes_fault() {
        let result: SectionResult<usize> = run_section("json", || panic!("kaboom"));
        assert_eq!(
            result,
            Err(SectionError::Fault {
                section: "json",
                message: "kaboom".to_string(),
            })
        );
    }

    #[test]
    fn panic_message_handles_owned_strings() {
        let result: SectionResult<()> =
            run_section("markdown", || panic!("{} failed", "pattern"));
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "markdown analysis failed unexpectedly: pattern failed");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("中文字", 2), "中文");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars(&"x".repeat(600), 500).len(), 500);
    }

    #[test]
    fn pipeline_panic_becomes_gateway_error_with_capped_details() {
        let long = "d".repeat(600);
        let response = guard(&LIMITS, || panic!("{long}"));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"], true);
        assert!(json.get("chineseCount").is_none());

        let ToolResponse::Error(err) = response else {
            panic!("expected a gateway error");
        };
        assert!(err.error);
        assert_eq!(err.message, "Text analysis failed unexpectedly");
        let details = err.details.expect("details present");
        assert_eq!(details.chars().count(), LIMITS.detail_chars);
        assert!(details.chars().all(|c| c == 'd'));
    }

    #[test]
    fn guard_passes_reports_and_rejections_through() {
        let report = build_report("[]", &LIMITS);
        let passed = guard(&LIMITS, || Ok(report.clone()));
        assert_eq!(passed.report(), Some(&report));

        let rejected = guard(&LIMITS, || Err(GatewayError::EmptyInput));
        let err = rejected.gateway_error().unwrap();
        assert_eq!(err.message, "Input text must not be empty");
        assert!(err.details.is_none());
    }

    #[test]
    fn custom_limits_apply() {
        let limits = Limits {
            max_input_chars: 3,
            ..Limits::default()
        };
        let response = analyze_text_with("abcd", &limits);
        let err = response.gateway_error().unwrap();
        assert!(err.message.contains('3'));
        assert!(err.message.contains('4'));
    }
}
