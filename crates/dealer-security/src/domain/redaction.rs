//! Redaction of sensitive values before a log entry leaves the process.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Replacement text for redacted values.
pub const REDACTED: &str = "[REDACTED]";

/// Field-name fragments treated as sensitive, matched case-insensitively.
pub const SENSITIVE_TERMS: [&str; 6] = ["password", "token", "secret", "key", "auth", "credential"];

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[\w-]+").expect("invalid word pattern");
    /// Clause delimiters: comma, semicolon, newline, or a full stop before
    /// whitespace or the end of the message.
    static ref CLAUSE_END: Regex = Regex::new(r"[,;\n]|\.(?:\s|$)").expect("invalid clause pattern");
    /// Everything up to the first `:`/`=` and the (optionally quoted) value after it.
    static ref ASSIGNED_VALUE: Regex =
        Regex::new(r#"^[^:=]*?[:=]\s*["']?[^\s,;"']*["']?"#).expect("invalid value pattern");
}

/// Redact sensitive words and the values that go with them.
///
/// A word is sensitive when one of its parts (split on `_`, `-`, camelCase
/// and digit boundaries) is a sensitive term, so `api_key`, `authToken` and
/// `secret123` match while `keyboard` or `Authentication` do not. From a
/// sensitive word, redaction runs through the first `:`/`=` value later in
/// the same clause, or to the end of the clause when there is none.
///
/// ```
/// use dealer_security::domain::redaction::redact_message;
///
/// assert_eq!(redact_message("Password is invalid: hunter2"), "[REDACTED]");
/// assert_eq!(redact_message("Password was hunter2, retrying"), "[REDACTED], retrying");
/// ```
pub fn redact_message(message: &str) -> Cow<'_, str> {
    let mut out = String::new();
    let mut copied = 0;
    let mut clause_start = 0;

    let clause_ends = CLAUSE_END
        .find_iter(message)
        .map(|m| m.start())
        .chain(std::iter::once(message.len()));

    for clause_end in clause_ends {
        let mut cursor = clause_start;
        while let Some(offset) = find_sensitive_word(&message[cursor..clause_end]) {
            let from = cursor + offset;
            let rest = &message[from..clause_end];
            let to = match ASSIGNED_VALUE.find(rest) {
                Some(m) => from + m.end(),
                None => from + rest.trim_end().len(),
            };
            out.push_str(&message[copied..from]);
            out.push_str(REDACTED);
            copied = to;
            cursor = to;
        }
        clause_start = clause_end;
    }

    if copied == 0 {
        return Cow::Borrowed(message);
    }
    out.push_str(&message[copied..]);
    Cow::Owned(out)
}

fn find_sensitive_word(text: &str) -> Option<usize> {
    WORD.find_iter(text)
        .find(|m| is_sensitive_word(m.as_str()))
        .map(|m| m.start())
}

fn is_sensitive_word(word: &str) -> bool {
    word_parts(word).into_iter().any(|part| {
        SENSITIVE_TERMS.iter().any(|term| {
            part.eq_ignore_ascii_case(term)
                || (part.len() == term.len() + 1
                    && part.ends_with(['s', 'S'])
                    && part.get(..term.len()).is_some_and(|p| p.eq_ignore_ascii_case(term)))
        })
    })
}

/// `AUTH_TOKEN` -> [`AUTH`, `TOKEN`], `apiKey` -> [`api`, `Key`], `secret123` -> [`secret`, `123`].
fn word_parts(word: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;

    for (i, c) in word.char_indices() {
        if c == '_' || c == '-' {
            if start < i {
                parts.push(&word[start..i]);
            }
            start = i + c.len_utf8();
            prev = None;
            continue;
        }
        if let Some(p) = prev {
            let boundary =
                (p.is_lowercase() && c.is_uppercase()) || (p.is_alphabetic() != c.is_alphabetic());
            if boundary && start < i {
                parts.push(&word[start..i]);
                start = i;
            }
        }
        prev = Some(c);
    }
    if start < word.len() {
        parts.push(&word[start..]);
    }
    parts
}

/// Whether an object key is exactly one of the sensitive names.
pub fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_TERMS
        .iter()
        .any(|term| key.eq_ignore_ascii_case(term))
}

/// Copy of `context` with every sensitive key's value replaced.
///
/// Walks nested objects and arrays. Values under other keys are kept as-is.
pub fn redact_context(context: &Value) -> Value {
    match context {
        Value::Object(map) => {
            let redacted: Map<String, Value> = map
                .iter()
                .map(|(k, v)| {
                    let value = if is_sensitive_key(k) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact_context(v)
                    };
                    (k.clone(), value)
                })
                .collect();
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_context).collect()),
        other => other.clone(),
    }
}
