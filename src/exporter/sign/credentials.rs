//! Secret lookup for notarization.
//!
//! The pipeline only needs the app-specific password; Apple ID and team come
//! from [`ExportSettings`](crate::exporter::ExportSettings).

use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

/// Account name the app-specific password is stored under.
pub const APP_PASSWORD_ACCOUNT: &str = "app-specific-password";

/// Environment variable consulted by [`EnvCredentialStore`].
pub const APP_PASSWORD_ENV: &str = "HISE_EXPORTER_APP_PASSWORD";

/// Opaque named-secret storage scoped to a service identifier.
///
/// A missing secret is `None`; the engine turns that into a notice and
/// skips signing for the job.
pub trait CredentialStore: Send + Sync {
    fn get(&self, service: &str, account: &str) -> Option<String>;
    fn set(&self, service: &str, account: &str, secret: &str);
}

/// Reads the app-specific password from [`APP_PASSWORD_ENV`].
///
/// `set` keeps the value for the rest of the process only.
#[derive(Debug, Default)]
pub struct EnvCredentialStore {
    overrides: MemoryCredentialStore,
}

impl EnvCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for EnvCredentialStore {
    fn get(&self, service: &str, account: &str) -> Option<String> {
        if let Some(secret) = self.overrides.get(service, account) {
            return Some(secret);
        }
        if account != APP_PASSWORD_ACCOUNT {
            return None;
        }
        std::env::var(APP_PASSWORD_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn set(&self, service: &str, account: &str, secret: &str) {
        self.overrides.set(service, account, secret);
    }
}

/// In-memory store, used by tests and for secrets passed on the command line.
#[derive(Clone, Debug, Default)]
pub struct MemoryCredentialStore {
    secrets: Arc<Mutex<HashMap<(String, String), String>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(self, service: &str, account: &str, secret: &str) -> Self {
        self.set(service, account, secret);
        self
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, service: &str, account: &str) -> Option<String> {
        self.secrets
            .lock()
            .get(&(service.to_string(), account.to_string()))
            .cloned()
    }

    fn set(&self, service: &str, account: &str, secret: &str) {
        self.secrets.lock().insert(
            (service.to_string(), account.to_string()),
            secret.to_string(),
        );
    }
}
