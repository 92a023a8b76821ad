//! Code signing and notarization (macOS).
//!
//! Binaries are signed in place with `codesign`; installers are signed into a
//! new file with `productsign`. Notarization goes through `xcrun altool`, is
//! polled every [`POLL_INTERVAL`] and stapled with `xcrun stapler`.

pub mod credentials;
pub mod notarize;

pub use credentials::{
    APP_PASSWORD_ACCOUNT, APP_PASSWORD_ENV, CredentialStore, EnvCredentialStore,
    MemoryCredentialStore,
};
pub use notarize::{NotarizationStatus, parse_request_id, parse_status};

use crate::exporter::{
    clock::Clock,
    error::{Context, Error, Result},
    process::{ProcessRunner, ToolCategory, ToolCommand},
};
use std::{path::Path, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

/// Delay between notarization status polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Apple account used for notarization.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NotaryAccount {
    pub apple_id: String,
    pub app_password: String,
}

/// Drives the signing and notarization tools.
#[derive(Clone)]
pub struct SigningClient {
    runner: Arc<dyn ProcessRunner>,
    clock: Arc<dyn Clock>,
}

impl SigningClient {
    pub fn new(runner: Arc<dyn ProcessRunner>, clock: Arc<dyn Clock>) -> Self {
        Self { runner, clock }
    }

    /// Deep-sign `file` in place with the hardened runtime.
    pub async fn sign_binary(
        &self,
        team: &str,
        file: &Path,
        cancel: &CancellationToken,
    ) -> Result<()> {
        log::info!("Signing {}", file.display());
        let cmd = ToolCommand::new("codesign", ToolCategory::Signer)
            .args(["--deep", "--force", "--options", "runtime", "--sign"])
            .arg(format!("Developer ID Application: {team}"))
            .arg(file)
            .arg("--timestamp");
        self.runner
            .run(&cmd, cancel)
            .await
            .with_context(|| format!("codesign failed for {}", file.display()))?;
        Ok(())
    }

    /// Sign `input` into `output`. `input` is left for the caller to remove.
    pub async fn sign_installer(
        &self,
        team: &str,
        input: &Path,
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<()> {
        log::info!("Signing installer {}", input.display());
        let cmd = ToolCommand::new("productsign", ToolCategory::Signer)
            .arg("--sign")
            .arg(format!("Developer ID Installer: {team}"))
            .arg(input)
            .arg(output)
            .arg("--timestamp");
        self.runner
            .run(&cmd, cancel)
            .await
            .with_context(|| format!("productsign failed for {}", input.display()))?;
        Ok(())
    }

    /// Upload `file` for notarization and return the request identifier.
    pub async fn notarize(
        &self,
        file: &Path,
        bundle_id: &str,
        account: &NotaryAccount,
        cancel: &CancellationToken,
    ) -> Result<String> {
        log::info!("Submitting {} for notarization", file.display());
        let cmd = ToolCommand::new("xcrun", ToolCategory::Signer)
            .args(["altool", "--notarize-app", "-f"])
            .arg(file)
            .arg("--primary-bundle-id")
            .arg(bundle_id)
            .arg("-u")
            .arg(&account.apple_id)
            .arg("-p")
            .arg(&account.app_password);
        let output = self.runner.run(&cmd, cancel).await?;
        let request_id = parse_request_id(output.text())?;
        log::info!("Notarization request {request_id}");
        Ok(request_id)
    }

    /// Query the remote status once.
    pub async fn poll_status(
        &self,
        request_id: &str,
        account: &NotaryAccount,
        cancel: &CancellationToken,
    ) -> Result<NotarizationStatus> {
        let cmd = ToolCommand::new("xcrun", ToolCategory::Signer)
            .args(["altool", "--notarization-info"])
            .arg(request_id)
            .arg("-u")
            .arg(&account.apple_id)
            .arg("-p")
            .arg(&account.app_password);
        let output = self.runner.run(&cmd, cancel).await?;
        parse_status(output.text())
    }

    /// Poll until the request is terminal, then staple `file` on success.
    ///
    /// Each poll is preceded by one interval of waiting. Cancelling `cancel`
    /// stops the loop at the next wait.
    pub async fn wait_and_staple(
        &self,
        file: &Path,
        request_id: &str,
        account: &NotaryAccount,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut polls = 0usize;
        loop {
            tokio::select! {
                _ = self.clock.sleep(POLL_INTERVAL) => {}
                _ = cancel.cancelled() => return Err(Error::Cancelled),
            }

            polls += 1;
            let status = self.poll_status(request_id, account, cancel).await?;
            log::info!("Notarization status after {polls} poll(s): {status}");

            match status {
                NotarizationStatus::Success => break,
                NotarizationStatus::Invalid => {
                    return Err(Error::NotarizationInvalid {
                        path: file.to_path_buf(),
                    });
                }
                NotarizationStatus::InProgress | NotarizationStatus::Other(_) => {}
            }
        }

        self.staple(file, cancel).await
    }

    async fn staple(&self, file: &Path, cancel: &CancellationToken) -> Result<()> {
        log::info!("Stapling {}", file.display());
        let cmd = ToolCommand::new("xcrun", ToolCategory::Signer)
            .args(["stapler", "staple"])
            .arg(file);
        self.runner
            .run(&cmd, cancel)
            .await
            .with_context(|| format!("stapling failed for {}", file.display()))?;
        Ok(())
    }
}
