use std::{net::IpAddr, sync::LazyLock};

use nutype::nutype;
use regex::Regex;

use crate::email_address::EmailAddress;

/// Maximum number of characters kept in any contact form field.
pub const MAX_FIELD_LENGTH: usize = 4000;

pub static CONTACT_EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// A raw contact form submission as received from the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Information about the request that carried a [`ContactSubmission`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactRequestMetadata {
    pub client_ip: Option<IpAddr>,
    pub user_agent: Option<String>,
}

/// A contact form submission whose fields have been sanitized and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: ContactName,
    pub email: EmailAddress,
    pub content: ContactMessageContent,
}

#[nutype(
    sanitize(with = |s: String| sanitize(&s)),
    validate(len_char_min = 2, len_char_max = 4000),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref)
)]
pub struct ContactName(String);

#[nutype(
    sanitize(with = |s: String| sanitize(&s)),
    validate(regex = CONTACT_EMAIL_REGEX),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref)
)]
pub struct ContactEmail(String);

#[nutype(
    sanitize(with = |s: String| sanitize(&s)),
    validate(len_char_min = 10, len_char_max = 4000),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref)
)]
pub struct ContactMessageContent(String);

/// Normalizes a free text field before it is validated or embedded in an
/// email.
///
/// Runs of carriage returns and line feeds collapse into a single space, tabs
/// become spaces and all other control characters are dropped. The result is
/// trimmed and cut to [`MAX_FIELD_LENGTH`] characters. Whitespace left at the
/// end of the cut is trimmed as well, so a cut that lands right after a space
/// yields fewer than [`MAX_FIELD_LENGTH`] characters. Applying this function
/// twice yields the same string as applying it once.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len().min(MAX_FIELD_LENGTH * 4));
    let mut in_line_break = false;
    for c in input.chars() {
        match c {
            '\r' | '\n' => {
                if !in_line_break {
                    out.push(' ');
                }
                in_line_break = true;
                continue;
            }
            '\t' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
        in_line_break = false;
    }

    let trimmed = out.trim();
    match trimmed.char_indices().nth(MAX_FIELD_LENGTH) {
        Some((end, _)) => trimmed[..end].trim_end().to_owned(),
        None => trimmed.to_owned(),
    }
}

impl ContactEmail {
    /// Parses the sanitized address into a mailbox usable in email headers.
    pub fn to_email_address(&self) -> Option<EmailAddress> {
        self.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn collapses_line_breaks() {
        assert_eq!(
            sanitize("Hello\r\n\r\nWorld\nagain\rand again"),
            "Hello World again and again"
        );
    }

    #[test]
    fn header_injection_is_flattened() {
        let out = sanitize("jo@example.com\r\nBcc: victim@example.com");
        assert!(!out.contains('\r') && !out.contains('\n'));
        assert_eq!(out, "jo@example.com Bcc: victim@example.com");
    }

    #[test]
    fn strips_control_characters() {
        assert_eq!(sanitize("a\u{0}b\u{7}c\td"), "abc d");
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(sanitize("  \n Jo \r\n "), "Jo");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn truncates_to_max_length() {
        let out = sanitize(&"x".repeat(5000));
        assert_eq!(out.chars().count(), MAX_FIELD_LENGTH);

        let out = sanitize(&"ä".repeat(MAX_FIELD_LENGTH + 1));
        assert_eq!(out.chars().count(), MAX_FIELD_LENGTH);

        let exact = "y".repeat(MAX_FIELD_LENGTH);
        assert_eq!(sanitize(&exact), exact);
    }

    #[test]
    fn cut_after_space_is_trimmed() {
        // Arrange
        let mut input = "a".repeat(MAX_FIELD_LENGTH - 1);
        input.push(' ');
        input.push_str(&"b".repeat(100));

        // Act
        let out = sanitize(&input);

        // Assert
        assert_eq!(out.chars().count(), MAX_FIELD_LENGTH - 1);
        assert_eq!(out, "a".repeat(MAX_FIELD_LENGTH - 1));
        assert_eq!(sanitize(&out), out);
    }

    #[test]
    fn idempotent() {
        let mut long_with_space_at_cut = "a".repeat(MAX_FIELD_LENGTH - 1);
        long_with_space_at_cut.push_str("   tail");

        for input in [
            "Hello\r\n World",
            "  padded  ",
            "\n\n\n",
            "tab\tseparated\u{1b}[31m",
            long_with_space_at_cut.as_str(),
        ] {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn name_is_sanitized_before_validation() {
        let name = ContactName::try_new(" Jo\n".to_owned()).unwrap();
        assert_eq!(*name, "Jo");

        assert!(ContactName::try_new("A".to_owned()).is_err());
        assert!(ContactName::try_new(" \r\n ".to_owned()).is_err());
    }

    #[test]
    fn email_pattern() {
        for valid in [
            "jo@example.com",
            "first.last@sub.example.co.uk",
            " jo@example.com\n",
        ] {
            let email = ContactEmail::try_new(valid.to_owned()).unwrap();
            assert!(email.to_email_address().is_some(), "{valid}");
        }

        for invalid in [
            "",
            "not-an-email",
            "jo@example",
            "jo @example.com",
            "@example.com",
            "jo@@example.com",
        ] {
            assert!(ContactEmail::try_new(invalid.to_owned()).is_err(), "{invalid}");
        }
    }

    #[test]
    fn message_length() {
        assert!(ContactMessageContent::try_new("short".to_owned()).is_err());
        assert!(
            ContactMessageContent::try_new("Hello, this is long enough.".to_owned()).is_ok()
        );
        let long = ContactMessageContent::try_new("z".repeat(9000)).unwrap();
        assert_eq!(long.chars().count(), MAX_FIELD_LENGTH);
    }
}
