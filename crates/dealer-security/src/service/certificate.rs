//! Certificate fingerprint pinning.
//!
//! Best-effort defense in depth on top of normal TLS verification, not a
//! substitute for it. With nothing pinned the validator fails open unless the
//! deployment opts into [`PinningMode::FailClosed`].
//!
//! The pinned set follows the live configuration: a snapshot swapped in by
//! `update_config` is picked up on the next check.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::config::{PinningMode, SecurityConfig};
use crate::domain::pinning::PinSet;
use crate::service::context::SecurityContext;

#[derive(Debug)]
struct LoadedPins {
    source: Arc<SecurityConfig>,
    pins: PinSet,
}

impl LoadedPins {
    fn from_config(source: Arc<SecurityConfig>) -> Self {
        let pins = PinSet::new(&source.pinned_fingerprints, source.pinning_mode);
        Self { source, pins }
    }
}

#[derive(Debug)]
pub struct CertificateValidator {
    context: SecurityContext,
    loaded: RwLock<LoadedPins>,
}

impl CertificateValidator {
    pub fn new(context: SecurityContext) -> Self {
        let loaded = LoadedPins::from_config(context.config());
        announce(&loaded.pins);
        Self {
            context,
            loaded: RwLock::new(loaded),
        }
    }

    /// Reload the pinned set and mode from the current configuration.
    pub fn initialize(&self) {
        let loaded = LoadedPins::from_config(self.context.config());
        announce(&loaded.pins);
        *self.loaded.write() = loaded;
    }

    /// Whether a presented certificate fingerprint is acceptable.
    pub fn validate_certificate(&self, fingerprint: &str) -> bool {
        let accepted = self.with_pins(|pins| pins.accepts(fingerprint));
        if !accepted {
            warn!(fingerprint, "Certificate fingerprint rejected");
        }
        accepted
    }

    pub fn is_pinning_enabled(&self) -> bool {
        self.with_pins(|pins| !pins.is_empty())
    }

    pub fn pinned_count(&self) -> usize {
        self.with_pins(PinSet::len)
    }

    /// Run `f` against the pins of the current configuration snapshot.
    fn with_pins<R>(&self, f: impl FnOnce(&PinSet) -> R) -> R {
        let current = self.context.config();
        {
            let loaded = self.loaded.read();
            if Arc::ptr_eq(&loaded.source, &current) {
                return f(&loaded.pins);
            }
        }

        let mut loaded = self.loaded.write();
        if !Arc::ptr_eq(&loaded.source, &current) {
            let next = LoadedPins::from_config(current);
            if next.pins != loaded.pins {
                announce(&next.pins);
            }
            *loaded = next;
        }
        f(&loaded.pins)
    }
}

fn announce(pins: &PinSet) {
    if pins.is_empty() {
        match pins.mode() {
            PinningMode::FailOpen => info!("No certificate fingerprints pinned, pinning disabled"),
            PinningMode::FailClosed => {
                warn!("No certificate fingerprints pinned in fail-closed mode, all certificates will be rejected")
            }
        }
    } else {
        info!(pinned = pins.len(), "Certificate pinning enabled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ManualClock, MemoryStore};
    use crate::domain::config::SecurityConfigOverrides;
    use proptest::prelude::*;

    fn pinned(pins: &[&str], mode: PinningMode) -> SecurityConfigOverrides {
        SecurityConfigOverrides {
            pinned_fingerprints: Some(pins.iter().map(|p| p.to_string()).collect()),
            pinning_mode: Some(mode),
            ..Default::default()
        }
    }

    fn validator(pins: &[&str], mode: PinningMode) -> CertificateValidator {
        let context = SecurityContext::initialize(
            pinned(pins, mode),
            Arc::new(MemoryStore::new()),
            Arc::new(ManualClock::new(0)),
        )
        .unwrap();
        CertificateValidator::new(context)
    }

    #[test]
    fn test_nothing_pinned_accepts_everything() {
        let validator = validator(&[], PinningMode::FailOpen);
        assert!(!validator.is_pinning_enabled());
        assert!(validator.validate_certificate("AB:CD"));
    }

    #[test]
    fn test_pinned_membership() {
        let validator = validator(&["AA:11", "BB:22"], PinningMode::FailOpen);
        assert!(validator.is_pinning_enabled());
        assert_eq!(validator.pinned_count(), 2);
        assert!(validator.validate_certificate("AA:11"));
        assert!(validator.validate_certificate("BB:22"));
        assert!(!validator.validate_certificate("CC:33"));
    }

    #[test]
    fn test_fail_closed_with_no_pins() {
        let validator = validator(&[], PinningMode::FailClosed);
        assert!(!validator.validate_certificate("AA:11"));
    }

    #[test]
    fn test_config_update_adds_pins() {
        let validator = validator(&[], PinningMode::FailOpen);
        assert!(validator.validate_certificate("EVIL"));

        validator
            .context
            .update_config(pinned(&["AA:11"], PinningMode::FailOpen))
            .unwrap();
        assert!(validator.is_pinning_enabled());
        assert!(validator.validate_certificate("AA:11"));
        assert!(!validator.validate_certificate("EVIL"));
    }

    #[test]
    fn test_config_update_clears_pins() {
        let validator = validator(&["AA:11"], PinningMode::FailOpen);
        assert!(!validator.validate_certificate("anything"));

        validator
            .context
            .update_config(pinned(&[], PinningMode::FailOpen))
            .unwrap();
        validator.initialize();
        assert!(validator.validate_certificate("anything"));
        assert_eq!(validator.pinned_count(), 0);
    }

    #[test]
    fn test_unrelated_update_keeps_pins() {
        let validator = validator(&["AA:11"], PinningMode::FailOpen);
        validator
            .context
            .update_config(SecurityConfigOverrides {
                rate_limit_max_requests: Some(5),
                ..Default::default()
            })
            .unwrap();
        assert!(!validator.validate_certificate("BB:22"));
        assert_eq!(validator.pinned_count(), 1);
    }

    proptest! {
        #[test]
        fn prop_empty_set_accepts_any(fp in ".*") {
            prop_assert!(validator(&[], PinningMode::FailOpen).validate_certificate(&fp));
        }

        #[test]
        fn prop_only_pinned_accepted(fp in "[A-F0-9]{8}") {
            let validator = validator(&["ABCDEF01"], PinningMode::FailOpen);
            prop_assert_eq!(validator.validate_certificate(&fp), fp == "ABCDEF01");
        }
    }
}
