//! Links to a hosted LaTeX renderer
//!
//! The link is only built here. Nothing is fetched.

use thiserror::Error;
use url::Url;

use crate::color::Theme;
use crate::latex::strip_outer_delimiters;

pub const DEFAULT_BASE_URL: &str = "https://latex.codecogs.com/png.image";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostedError {
    #[error("LaTeX expression cannot be empty or whitespace only")]
    Empty,
    #[error("invalid renderer base URL '{0}'")]
    InvalidBase(String),
}

/// Build a hosted-renderer URL for an expression.
///
/// The query is `\dpi{N}` plus theme colors followed by the expression with
/// any outer `$`/`$$` removed. Lines are joined with `\\`.
///
/// # Examples
///
/// ```
/// use latex_mcp::color::Theme;
/// use latex_mcp::hosted::{hosted_url, DEFAULT_BASE_URL};
///
/// let url = hosted_url(DEFAULT_BASE_URL, "$x^2$", 150, Theme::Light).unwrap();
/// assert_eq!(url, "https://latex.codecogs.com/png.image?%5Cdpi%7B150%7D%5Cbg%7Bwhite%7D%20x%5E2");
/// ```
pub fn hosted_url(base: &str, latex: &str, dpi: u32, theme: Theme) -> Result<String, HostedError> {
    let expr = strip_outer_delimiters(latex);
    if expr.is_empty() {
        return Err(HostedError::Empty);
    }
    let parsed = Url::parse(base).map_err(|_| HostedError::InvalidBase(base.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.query().is_some() {
        return Err(HostedError::InvalidBase(base.to_string()));
    }

    let colors = match theme {
        Theme::Light => "\\bg{white}",
        Theme::Dark => "\\bg{black}\\color{white}",
    };
    let body = expr.lines().map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>().join(" \\\\ ");
    let query = format!("\\dpi{{{}}}{} {}", dpi, colors, body);

    Ok(format!("{}?{}", base.trim_end_matches('?'), encode_query(&query)))
}

/// Percent-encode everything outside the unreserved set; spaces become `%20`.
fn encode_query(raw: &str) -> String {
    // form encoding writes spaces as '+' and literal pluses as %2B
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus_and_space_encoding() {
        let url = hosted_url(DEFAULT_BASE_URL, "a + b", 100, Theme::Light).unwrap();
        assert!(url.ends_with("%20a%20%2B%20b"));
    }

    #[test]
    fn test_dark_theme_colors() {
        let url = hosted_url(DEFAULT_BASE_URL, "x", 200, Theme::Dark).unwrap();
        assert!(url.contains("%5Cdpi%7B200%7D%5Cbg%7Bblack%7D%5Ccolor%7Bwhite%7D"));
    }

    #[test]
    fn test_display_delimiters_stripped() {
        let url = hosted_url(DEFAULT_BASE_URL, "$$\\pi$$", 150, Theme::Light).unwrap();
        assert!(url.ends_with("%20%5Cpi"));
        assert!(!url.contains("%24"));
    }

    #[test]
    fn test_lines_joined() {
        let url = hosted_url(DEFAULT_BASE_URL, "a\nb", 150, Theme::Light).unwrap();
        assert!(url.ends_with("a%20%5C%5C%20b"));
    }

    #[test]
    fn test_custom_base() {
        let url = hosted_url("http://localhost:8080/render", "x", 72, Theme::Light).unwrap();
        assert!(url.starts_with("http://localhost:8080/render?"));
    }

    #[test]
    fn test_invalid_base() {
        assert_eq!(
            hosted_url("not a url", "x", 150, Theme::Light),
            Err(HostedError::InvalidBase("not a url".into()))
        );
        assert!(hosted_url("ftp://example.com/x", "x", 150, Theme::Light).is_err());
        assert!(hosted_url("https://example.com/x?a=1", "x", 150, Theme::Light).is_err());
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(hosted_url(DEFAULT_BASE_URL, " $$ $$ ", 150, Theme::Light), Err(HostedError::Empty));
    }
}
