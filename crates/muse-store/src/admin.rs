//! Admin export gate.
//!
//! A placeholder trust boundary: one injected credential check guarding the
//! export operation. No lockout or rate limiting. The check is a capability
//! trait so a secret-store-backed implementation can replace the static
//! passphrase without touching the flow.

use muse_core::errors::{ErrorInfo, MuseError};

use crate::store::{export, CsvStore};

/// Credential verification capability for the admin gate.
pub trait CredentialCheck {
    /// Whether the supplied input grants access.
    fn verify(&self, input: &str) -> bool;
}

/// Shared static passphrase compared against user input.
#[derive(Debug, Clone)]
pub struct StaticPassphrase {
    passphrase: String,
}

impl StaticPassphrase {
    /// Creates a check around the given passphrase.
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
        }
    }
}

impl CredentialCheck for StaticPassphrase {
    fn verify(&self, input: &str) -> bool {
        input == self.passphrase
    }
}

/// Attempts an export behind the credential check.
///
/// Empty input is neither success nor failure: a silent no-op returning
/// `None`. A mismatch is an explicit denial. A match yields the exported
/// CSV bytes of the full store.
pub fn export_gate(
    check: &dyn CredentialCheck,
    input: &str,
    store: &CsvStore,
) -> Result<Option<Vec<u8>>, MuseError> {
    if input.is_empty() {
        return Ok(None);
    }
    if !check.verify(input) {
        return Err(MuseError::Auth(ErrorInfo::new(
            "bad-passphrase",
            "admin passphrase mismatch",
        )));
    }
    let table = store.load()?;
    Ok(Some(export(&table)?))
}
