//! # Encryption Flows
//!
//! Values encrypted by one core can be stored in session storage and read
//! back; anything else fails closed with a generic error.

#[cfg(test)]
mod tests {
    use dealer_security::ports::KeyValueStore;
    use dealer_security::{decrypt_with_key, DataCipher, SecurityError, StorageKey};
    use proptest::prelude::*;

    use crate::integration::harness::TestCore;

    #[tokio::test]
    async fn test_encrypted_profile_survives_storage() {
        let h = TestCore::with_defaults();
        let profile = r#"{"id":"u-17","ssn":"123-45-6789"}"#;

        let sealed = h.core.cipher().encrypt_to_string(profile).await.unwrap();
        assert!(!sealed.contains("123-45-6789"));
        h.store.set(StorageKey::UserData, &sealed).unwrap();

        let stored = h.store.get(StorageKey::UserData).unwrap().unwrap();
        assert_eq!(h.core.cipher().decrypt_str(&stored).await.unwrap(), profile);
    }

    #[tokio::test]
    async fn test_other_core_cannot_read() {
        let a = TestCore::with_defaults();
        let b = TestCore::with_defaults();
        let sealed = a.core.cipher().encrypt_to_string("credit app").await.unwrap();

        let err = b.core.cipher().decrypt_str(&sealed).await.unwrap_err();
        assert_eq!(err, SecurityError::DecryptionFailed);
        assert_eq!(err.to_string(), "Failed to decrypt data");
    }

    #[tokio::test]
    async fn test_exported_key_reads_elsewhere() {
        let h = TestCore::with_defaults();
        let sealed = h.core.cipher().encrypt_to_string("VIN 1HGCM82633A004352").await.unwrap();
        let key = h.core.cipher().export_key();

        assert_eq!(
            decrypt_with_key(&key, &sealed).await.unwrap(),
            "VIN 1HGCM82633A004352"
        );
        assert_eq!(
            decrypt_with_key("00", &sealed).await,
            Err(SecurityError::DecryptionFailed)
        );
    }

    #[tokio::test]
    async fn test_truncated_ciphertext_fails_closed() {
        let cipher = DataCipher::ephemeral();
        let sealed = cipher.encrypt_to_string("payoff quote").await.unwrap();
        let truncated = &sealed[..sealed.len() - 2];
        assert_eq!(
            cipher.decrypt_str(truncated).await,
            Err(SecurityError::DecryptionFailed)
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_two_encryptions_never_share_iv(text in "\\PC{0,64}") {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let cipher = DataCipher::ephemeral();
            let (a, b) = runtime.block_on(async {
                (
                    cipher.encrypt(&text).await.unwrap(),
                    cipher.encrypt(&text).await.unwrap(),
                )
            });
            prop_assert_ne!(a.iv, b.iv);
        }
    }
}
