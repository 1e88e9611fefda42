//! Passcode verification for ride sharers.
//!
//! Passcodes are stored only as SHA-256 digests and compared in constant time
//! with `constant_time_eq`, so neither the roster nor the state ever holds a
//! plaintext passcode.

use crate::types::DriverId;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Checks a driver's passcode
pub trait CredentialVerifier: Send + Sync {
    /// Whether `passcode` is correct for `driver_id`
    ///
    /// Unknown drivers never verify.
    fn verify(&self, driver_id: &DriverId, passcode: &str) -> bool;
}

/// In-memory passcode digests keyed by driver
#[derive(Clone, Default)]
pub struct HashedPasscodes {
    digests: HashMap<DriverId, [u8; 32]>,
}

impl HashedPasscodes {
    /// Creates an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a driver's passcode
    #[must_use]
    pub fn with_passcode(mut self, driver_id: DriverId, passcode: &str) -> Self {
        self.insert(driver_id, passcode);
        self
    }

    /// Adds (or replaces) a driver's passcode
    pub fn insert(&mut self, driver_id: DriverId, passcode: &str) {
        self.digests.insert(driver_id, digest(passcode));
    }

    /// Number of drivers with a passcode
    #[must_use]
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    /// Whether no passcodes are stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

impl std::fmt::Debug for HashedPasscodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashedPasscodes")
            .field("drivers", &self.digests.len())
            .finish_non_exhaustive()
    }
}

impl CredentialVerifier for HashedPasscodes {
    fn verify(&self, driver_id: &DriverId, passcode: &str) -> bool {
        let Some(stored) = self.digests.get(driver_id) else {
            return false;
        };
        constant_time_eq::constant_time_eq(stored, &digest(passcode))
    }
}

fn digest(passcode: &str) -> [u8; 32] {
    Sha256::digest(passcode.as_bytes()).into()
}
