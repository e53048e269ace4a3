//! Certificate fingerprint allow-list.
//!
//! Client-side pinning is a best-effort check layered on top of normal TLS
//! validation. It cannot stop an attacker who controls the client, and it is
//! never a replacement for the transport's own certificate verification.

use std::collections::{BTreeSet, HashSet};

use super::config::PinningMode;

/// Split a comma-separated fingerprint list. Blank entries are dropped.
pub fn parse_fingerprint_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|fp| !fp.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pinned fingerprints plus the policy for an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinSet {
    fingerprints: HashSet<String>,
    mode: PinningMode,
}

impl PinSet {
    pub fn new<I, S>(fingerprints: I, mode: PinningMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fingerprints = fingerprints
            .into_iter()
            .map(|fp| fp.as_ref().trim().to_string())
            .filter(|fp| !fp.is_empty())
            .collect();
        Self { fingerprints, mode }
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn mode(&self) -> PinningMode {
        self.mode
    }

    /// Whether a presented fingerprint is acceptable.
    ///
    /// With nothing pinned the answer depends on the mode: fail-open accepts
    /// everything, fail-closed rejects everything. Comparison is exact after
    /// trimming surrounding whitespace.
    pub fn accepts(&self, fingerprint: &str) -> bool {
        if self.fingerprints.is_empty() {
            return self.mode == PinningMode::FailOpen;
        }
        self.fingerprints.contains(fingerprint.trim())
    }
}
