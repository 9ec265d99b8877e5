//! Syntax diagnostics for LaTeX input
//!
//! Cheap textual checks catch the common mistakes, then a small dry-run
//! render confirms whether the expression would actually draw.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::renderer::{render_latex, RenderOptions};

/// Commands that need a full TeX installation and are always rejected.
const UNSUPPORTED: &[&str] = &["\\begin{tikzpicture}", "\\usepackage", "\\documentclass", "\\chemfig"];

/// Commands whose presence shows the backslashes are intentional.
const COMMON_COMMANDS: &[&str] = &["\\frac", "\\sqrt", "\\int", "\\sum", "\\prod", "\\lim", "\\text"];

static GREEK: OnceLock<Regex> = OnceLock::new();

/// Outcome of [`check_latex`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// True when no errors were found and the dry-run render succeeded
    pub valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    /// Corrected expression when a common fix applies
    pub suggestion: Option<String>,
}

impl CheckReport {
    fn invalid(error: impl Into<String>) -> Self {
        Self { valid: false, warnings: Vec::new(), errors: vec![error.into()], suggestion: None }
    }
}

/// Check a LaTeX expression without producing an image.
///
/// # Examples
///
/// ```
/// use latex_mcp::check::check_latex;
///
/// assert!(check_latex(r"\frac{1}{2}", 10_000).valid);
///
/// let report = check_latex("$x^2", 10_000);
/// assert!(!report.valid);
/// assert_eq!(report.suggestion.as_deref(), Some("$x^2$"));
/// ```
pub fn check_latex(latex: &str, max_len: usize) -> CheckReport {
    if latex.trim().is_empty() {
        return CheckReport::invalid("Empty expression.");
    }

    let mut warnings = Vec::new();
    let mut errors = Vec::new();
    let mut suggestion = None;

    let len = latex.chars().count();
    if len > max_len {
        errors.push(format!("Expression too long ({} chars, max {}).", len, max_len));
    }

    if latex.matches('$').count() % 2 != 0 {
        errors.push("Unbalanced $ delimiters: wrap math in matching $ or $$.".to_string());
        let trimmed = latex.trim();
        if trimmed.starts_with('$') {
            let closing = if trimmed.starts_with("$$") { "$$" } else { "$" };
            suggestion = Some(format!("{}{}", trimmed, closing));
        }
    }

    for command in UNSUPPORTED {
        if latex.contains(command) {
            errors.push(format!("'{}' is not supported; use standard math LaTeX only.", command));
        }
    }

    if latex.contains("\\frac") && !latex.contains('{') {
        warnings.push("\\frac requires two arguments in braces: \\frac{numerator}{denominator}".to_string());
    }

    let greek = GREEK.get_or_init(|| {
        Regex::new(r"\\(alpha|beta|gamma|delta|epsilon|theta|lambda|mu|pi|sigma|omega)\b")
            .expect("GREEK pattern is invalid")
    });
    if !greek.is_match(latex)
        && latex.contains('\\')
        && !COMMON_COMMANDS.iter().any(|cmd| latex.contains(cmd))
    {
        warnings.push(
            "Backslash detected but no recognized LaTeX commands found. Verify command names.".to_string(),
        );
    }

    let dry_run = RenderOptions { dpi: 72, font_size: 12, ..RenderOptions::default() };
    if let Err(e) = render_latex(latex, &dry_run) {
        errors.push(format!("Render test failed: {}", e));
    }

    CheckReport { valid: errors.is_empty(), warnings, errors, suggestion }
}
