//! Input sanitization helpers.
//!
//! Free-text fields are stripped of HTML/script markup before they reach the
//! store. Sanitization never rejects input, it only neutralizes it.

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("invalid script regex")
});

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("invalid tag regex"));

/// Strip HTML markup from a string, leaving plain text intact.
///
/// Script elements are removed together with their body; any remaining tags
/// are dropped and the surrounding text is kept.
pub fn strip_html(input: &str) -> String {
    let without_scripts = SCRIPT_BLOCK.replace_all(input, "");
    HTML_TAG.replace_all(&without_scripts, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::strip_html;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(strip_html("alice"), "alice");
        assert_eq!(strip_html("The Rust Programming Language"), "The Rust Programming Language");
    }

    #[test]
    fn tags_are_stripped() {
        assert_eq!(strip_html("<b>alice</b>"), "alice");
        assert_eq!(strip_html("a <i>quiet</i> place"), "a quiet place");
        assert_eq!(strip_html("<img src=x onerror=alert(1)>bob"), "bob");
    }

    #[test]
    fn script_bodies_are_removed() {
        assert_eq!(strip_html("<script>alert('xss')</script>alice"), "alice");
        assert_eq!(
            strip_html("bob<SCRIPT type=\"text/javascript\">steal()</SCRIPT>"),
            "bob"
        );
    }

    #[test]
    fn markup_in_passwords_is_neutralized() {
        // Inherited quirk: passwords are sanitized too
        assert_eq!(strip_html("hunter<2>"), "hunter");
    }

    #[test]
    fn whitespace_is_trimmed() {
        assert_eq!(strip_html("  <p>alice</p>  "), "alice");
    }
}
