//! Math-aware label preparation.
//!
//! draw.io renders LaTeX between `$$…$$` (block) or `\(…\)` (inline) and
//! AsciiMath between backticks when the document has `math="1"`. Labels are
//! checked for balanced delimiters and stray markup before they are escaped
//! into an attribute value.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::xml::escape_attr;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s*/?\s*[a-zA-Z][^>]*>").expect("valid tag pattern"));

static DELIMITED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\$|\\\(|`[^`]+`").expect("valid delimiter pattern"));

static PURE_MATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^a-zA-Z]*\\").expect("valid pure-math pattern"));

/// Fragments that only make sense inside a math environment.
static BARE_MATH: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        (
            "command",
            r"\\(?:frac|sqrt|sum|prod|int|lim|mathbb|mathcal|text|begin|end)\s*[\{\[]",
        ),
        (
            "greek",
            r"(?i)\\(?:alpha|beta|gamma|delta|theta|lambda|sigma|phi|omega|pi|mu|epsilon)",
        ),
        (
            "operator",
            r"\\(?:times|div|pm|leq|geq|neq|approx|infty|partial|nabla|rightarrow)",
        ),
        ("script", r"\^[\{\d]|_[\{\d]"),
        ("accent", r"\\vec\{|\\hat\{|\\mathbf\{"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("valid math pattern")))
    .collect()
});

/// Reasons a label cannot be placed into a diagram.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("label must not contain HTML tags; keep only text and LaTeX/AsciiMath")]
    HtmlMarkup,

    #[error("unbalanced AsciiMath delimiters: backticks (`) must be paired")]
    UnbalancedBackticks,

    #[error("unbalanced LaTeX block delimiters: $$ must be paired")]
    UnbalancedBlock,

    #[error("unbalanced LaTeX inline delimiters: \\( and \\) must be paired")]
    UnbalancedInline,

    #[error(
        "unwrapped math detected ({}); use $$ for block math or \\( \\) for inline math",
        .0.join(", ")
    )]
    UnwrappedMath(Vec<&'static str>),

    #[error("math expression must not be empty")]
    EmptyExpression,

    #[error("math expression must not contain its own {0} delimiters")]
    NestedDelimiter(&'static str),
}

/// How [`ensure_latex_delimiters`] wraps detected math.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WrapMode {
    /// Block when the label starts with a command, inline otherwise.
    #[default]
    Auto,
    Block,
    Inline,
}

#[derive(Debug, Clone, Copy)]
pub struct LabelOptions {
    pub auto_wrap: bool,
    pub mode: WrapMode,
    /// Reject unwrapped math instead of passing it through. Only consulted when
    /// `auto_wrap` is off.
    pub strict: bool,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            auto_wrap: true,
            mode: WrapMode::Auto,
            strict: false,
        }
    }
}

pub fn wrap_asciimath_inline(expression: &str) -> Result<String, LabelError> {
    if expression.trim().is_empty() {
        return Err(LabelError::EmptyExpression);
    }
    if expression.contains('`') {
        return Err(LabelError::NestedDelimiter("`"));
    }
    Ok(format!("`{expression}`"))
}

pub fn wrap_latex_inline(expression: &str) -> Result<String, LabelError> {
    if expression.trim().is_empty() {
        return Err(LabelError::EmptyExpression);
    }
    if expression.contains("\\(") || expression.contains("\\)") {
        return Err(LabelError::NestedDelimiter("\\( \\)"));
    }
    Ok(format!("\\({expression}\\)"))
}

pub fn wrap_latex_block(expression: &str) -> Result<String, LabelError> {
    if expression.trim().is_empty() {
        return Err(LabelError::EmptyExpression);
    }
    if expression.contains("$$") {
        return Err(LabelError::NestedDelimiter("$$"));
    }
    Ok(format!("$${expression}$$"))
}

/// Checks delimiter balance and rejects embedded markup.
pub fn validate_math_text(text: &str) -> Result<(), LabelError> {
    if HTML_TAG.is_match(text) {
        return Err(LabelError::HtmlMarkup);
    }
    if text.matches('`').count() % 2 != 0 {
        return Err(LabelError::UnbalancedBackticks);
    }
    if text.matches("$$").count() % 2 != 0 {
        return Err(LabelError::UnbalancedBlock);
    }
    if text.matches("\\(").count() != text.matches("\\)").count() {
        return Err(LabelError::UnbalancedInline);
    }
    Ok(())
}

/// Names of the bare math fragments found in `text`.
///
/// Returns nothing when the text already carries math delimiters.
pub fn detect_unwrapped_math(text: &str) -> Vec<&'static str> {
    if DELIMITED.is_match(text) {
        return Vec::new();
    }

    BARE_MATH
        .iter()
        .filter(|(_, pattern)| pattern.is_match(text))
        .map(|(name, _)| *name)
        .collect()
}

pub fn ensure_latex_delimiters(text: &str, mode: WrapMode) -> String {
    if text.trim().is_empty() || DELIMITED.is_match(text) {
        return text.to_string();
    }
    if detect_unwrapped_math(text).is_empty() {
        return text.to_string();
    }

    let block = match mode {
        WrapMode::Block => true,
        WrapMode::Inline => false,
        WrapMode::Auto => text.trim().starts_with('\\') || PURE_MATH.is_match(text),
    };

    if block {
        format!("$${text}$$")
    } else {
        format!("\\({text}\\)")
    }
}

/// Validates a label and returns it escaped for an `mxCell` `value` attribute.
pub fn prepare_label(text: &str, options: LabelOptions) -> Result<String, LabelError> {
    let detected = detect_unwrapped_math(text);

    let text = if detected.is_empty() {
        text.to_string()
    } else if options.auto_wrap {
        ensure_latex_delimiters(text, options.mode)
    } else if options.strict {
        return Err(LabelError::UnwrappedMath(detected));
    } else {
        text.to_string()
    };

    validate_math_text(&text)?;
    Ok(escape_attr(&text))
}
