//! Input sanitizers and validators.
//!
//! Escaping functions never fail. Validating functions return a
//! [`ValidationError`] with a human-readable message on bad input instead of
//! silently repairing it.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use super::errors::ValidationError;

/// RFC 5321 path limit.
const MAX_EMAIL_LEN: usize = 254;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email pattern");
    /// E.164: optional `+`, no leading zero, at most 15 digits.
    static ref PHONE_PATTERN: Regex = Regex::new(r"^\+?[1-9]\d{1,14}$").expect("invalid phone pattern");
}

/// Escape `< > " ' /` to entities.
///
/// `&` is left alone, so running this on already-escaped text is a no-op.
pub fn sanitize_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

/// Strip quotes, semicolons and backslashes.
///
/// Defense in depth only; queries must still be parameterized.
pub fn sanitize_sql(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | ';' | '\\'))
        .collect()
}

/// Strip `< > "` so the value cannot close a script or attribute context.
pub fn sanitize_javascript(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"'))
        .collect()
}

/// Trim and lowercase an email address after checking its shape.
pub fn sanitize_email(input: &str) -> Result<String, ValidationError> {
    let email = input.trim().to_lowercase();
    if email.len() > MAX_EMAIL_LEN || !EMAIL_PATTERN.is_match(&email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(email)
}

/// Reduce a phone number to digits (keeping a leading `+`) and check it is E.164.
pub fn sanitize_phone(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    let mut phone = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        phone.push('+');
    }
    phone.extend(trimmed.chars().filter(char::is_ascii_digit));

    if !PHONE_PATTERN.is_match(&phone) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(phone)
}

/// Accept absolute `http`/`https` URLs with a host; returns the normalized form.
pub fn sanitize_url(input: &str) -> Result<String, ValidationError> {
    let url = Url::parse(input.trim()).map_err(|_| ValidationError::InvalidUrl)?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some_and(|h| !h.is_empty()) => Ok(url.into()),
        _ => Err(ValidationError::InvalidUrl),
    }
}

/// Replace each of `< > : " / \ | ? *` with `_`, one for one.
pub fn sanitize_file_name(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_html() {
        assert_eq!(
            sanitize_html(r#"<script>alert('x')</script>"#),
            "&lt;script&gt;alert(&#x27;x&#x27;)&lt;&#x2F;script&gt;"
        );
        assert_eq!(sanitize_html(r#"a "b""#), "a &quot;b&quot;");
        assert_eq!(sanitize_html("Tom & Jerry"), "Tom & Jerry");
    }

    #[test]
    fn test_sanitize_sql() {
        assert_eq!(sanitize_sql(r#"x'; DROP TABLE deals; --"#), "x DROP TABLE deals --");
        assert_eq!(sanitize_sql(r#"a\b"c"#), "abc");
    }

    #[test]
    fn test_sanitize_javascript() {
        assert_eq!(sanitize_javascript(r#""><img src=x>"#), "img src=x");
    }

    #[test]
    fn test_sanitize_email() {
        assert_eq!(sanitize_email("USER@Example.com").unwrap(), "user@example.com");
        assert_eq!(sanitize_email("  a.b@c.io ").unwrap(), "a.b@c.io");
        assert_eq!(sanitize_email("not-an-email"), Err(ValidationError::InvalidEmail));
        assert_eq!(sanitize_email("a b@c.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(sanitize_email("a@b"), Err(ValidationError::InvalidEmail));

        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(sanitize_email(&long), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_sanitize_phone() {
        assert_eq!(sanitize_phone("(555) 123-4567").unwrap(), "5551234567");
        assert_eq!(sanitize_phone("+1 555 123 4567").unwrap(), "+15551234567");
        assert_eq!(sanitize_phone("0123"), Err(ValidationError::InvalidPhone));
        assert_eq!(sanitize_phone("call me"), Err(ValidationError::InvalidPhone));
        assert_eq!(
            sanitize_phone("1234567890123456"),
            Err(ValidationError::InvalidPhone)
        );
    }

    #[test]
    fn test_sanitize_url() {
        assert_eq!(
            sanitize_url("https://dms.example.com/api").unwrap(),
            "https://dms.example.com/api"
        );
        assert_eq!(sanitize_url("http://localhost:5000").unwrap(), "http://localhost:5000/");
        assert_eq!(sanitize_url("javascript:alert(1)"), Err(ValidationError::InvalidUrl));
        assert_eq!(sanitize_url("ftp://files.example.com"), Err(ValidationError::InvalidUrl));
        assert_eq!(sanitize_url("/relative/path"), Err(ValidationError::InvalidUrl));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name(r#"a<b>c:d"e/f\g|h?i*j"#), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_file_name("report-2024.pdf"), "report-2024.pdf");
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            sanitize_email("x").unwrap_err().to_string(),
            "Invalid email format"
        );
    }

    proptest! {
        #[test]
        fn prop_html_idempotent_on_escaped(input in ".*") {
            let once = sanitize_html(&input);
            prop_assert_eq!(sanitize_html(&once), once);
        }

        #[test]
        fn prop_file_name_preserves_length(input in ".*") {
            let out = sanitize_file_name(&input);
            prop_assert_eq!(out.chars().count(), input.chars().count());
            prop_assert!(!out.contains(['<', '>', ':', '"', '/', '\\', '|', '?', '*']));
        }

        #[test]
        fn prop_sql_output_has_no_stripped_chars(input in ".*") {
            let out = sanitize_sql(&input);
            prop_assert!(!out.contains(['\'', '"', ';', '\\']));
        }
    }
}
