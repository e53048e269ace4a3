//! Content-Security-Policy nonce and header construction.

use rand::RngCore;

const NONCE_BYTES: usize = 16;

/// Fresh random nonce, hex encoded.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Policy value permitting only same-origin resources and nonce-tagged inline code.
pub fn policy_value(nonce: &str) -> String {
    format!(
        "default-src 'self'; script-src 'self' 'nonce-{nonce}'; style-src 'self' 'nonce-{nonce}'; \
         img-src 'self' data: https:; connect-src 'self'; font-src 'self'; object-src 'none'; \
         base-uri 'self'; form-action 'self'; frame-ancestors 'none'"
    )
}

/// Response headers that accompany the policy.
pub fn security_headers(nonce: &str) -> Vec<(&'static str, String)> {
    vec![
        ("Content-Security-Policy", policy_value(nonce)),
        ("X-Content-Type-Options", "nosniff".to_string()),
        ("X-Frame-Options", "DENY".to_string()),
        ("Referrer-Policy", "strict-origin-when-cross-origin".to_string()),
        (
            "Strict-Transport-Security",
            "max-age=31536000; includeSubDomains".to_string(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_is_random_hex() {
        let a = generate_nonce();
        let b = generate_nonce();
        assert_eq!(a.len(), NONCE_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_policy_embeds_nonce() {
        let policy = policy_value("abc123");
        assert!(policy.contains("script-src 'self' 'nonce-abc123'"));
        assert!(policy.contains("object-src 'none'"));
    }

    #[test]
    fn test_security_headers() {
        let headers = security_headers("n");
        assert_eq!(headers[0].0, "Content-Security-Policy");
        assert!(headers.iter().any(|(k, v)| *k == "X-Frame-Options" && v == "DENY"));
    }
}
