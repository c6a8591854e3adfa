//! Commit message sanitization.

use std::sync::LazyLock;

use regex::Regex;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\s\w\-:]").expect("DISALLOWED is a valid regex"));

/// Strip everything except word characters, whitespace, `-` and `:`.
///
/// Word characters are Unicode-aware: accented letters and non-Latin
/// scripts survive, punctuation such as quotes and backticks does not.
pub fn sanitize_message(message: &str) -> String {
    DISALLOWED.replace_all(message, "").into_owned()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Fix \"quoted\" `code` path", "Fix quoted code path")]
    #[case("feat: add login-form", "feat: add login-form")]
    #[case("rm -rf /; echo 'pwned'", "rm -rf  echo pwned")]
    #[case("snake_case stays 42", "snake_case stays 42")]
    #[case("line one\nline two", "line one\nline two")]
    #[case("Café déjà vu", "Café déjà vu")]
    #[case("$(whoami) & <tags>!", "whoami  tags")]
    #[case("", "")]
    fn test_should_sanitize_message(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_message(input), expected);
    }

    fn allowed(c: char) -> bool {
        c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '-' | ':')
    }

    proptest! {
        #[test]
        fn sanitized_ascii_contains_only_allowed(input in "[ -~\t\n]{0,64}") {
            let out = sanitize_message(&input);
            prop_assert!(out.chars().all(allowed));
        }

        #[test]
        fn sanitize_is_idempotent(input in any::<String>()) {
            let once = sanitize_message(&input);
            prop_assert_eq!(sanitize_message(&once), once.clone());
        }

        #[test]
        fn sanitize_keeps_safe_text(input in "[A-Za-z0-9 :_-]{0,64}") {
            prop_assert_eq!(sanitize_message(&input), input);
        }
    }
}
