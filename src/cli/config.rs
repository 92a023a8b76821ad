//! Settings and queue files.

use crate::{
    error::{CliError, Result},
    exporter::{ExportSettings, Job, SettingsBuilder},
};
use std::path::{Path, PathBuf};

/// `config.toml` contents.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub hise_executable: Option<PathBuf>,
    pub hise_source: Option<PathBuf>,
    pub assets_dir: Option<PathBuf>,
    pub company_name: Option<String>,
    pub company_email: Option<String>,
    pub apple_id: Option<String>,
    pub apple_team_id: Option<String>,
    pub inno_setup_compiler: Option<PathBuf>,
    pub msbuild: Option<PathBuf>,
    pub ide_jobs: Option<usize>,
    pub credential_service: Option<String>,
}

impl ConfigFile {
    pub fn into_settings(self) -> Result<ExportSettings> {
        let mut builder = SettingsBuilder::new();
        if let Some(path) = self.hise_executable {
            builder = builder.hise_executable(path);
        }
        if let Some(path) = self.hise_source {
            builder = builder.hise_source(path);
        }
        if let Some(path) = self.assets_dir {
            builder = builder.assets_dir(path);
        }
        if let Some(name) = self.company_name {
            builder = builder.company_name(name);
        }
        if let Some(email) = self.company_email {
            builder = builder.company_email(email);
        }
        if let Some(id) = self.apple_id {
            builder = builder.apple_id(id);
        }
        if let Some(team) = self.apple_team_id {
            builder = builder.apple_team_id(team);
        }
        if let Some(path) = self.inno_setup_compiler {
            builder = builder.inno_setup_compiler(path);
        }
        if let Some(path) = self.msbuild {
            builder = builder.msbuild(path);
        }
        if let Some(jobs) = self.ide_jobs {
            builder = builder.ide_jobs(jobs);
        }
        if let Some(service) = self.credential_service {
            builder = builder.credential_service(service);
        }
        Ok(builder.build()?)
    }
}

/// Queue file: `[[job]]` tables in execution order.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueFile {
    #[serde(default, rename = "job")]
    pub jobs: Vec<Job>,
}

/// `<config dir>/hise-exporter/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hise-exporter").join("config.toml"))
}

/// Load settings from `path`, or from the default location.
pub fn load_settings(path: Option<&Path>) -> Result<ExportSettings> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path().ok_or_else(|| CliError::InvalidArguments {
            reason: "no config directory on this system; pass --config".to_string(),
        })?,
    };
    if !path.is_file() {
        return Err(CliError::ConfigNotFound { path }.into());
    }

    log::debug!("Loading settings from {}", path.display());
    let text = std::fs::read_to_string(&path)?;
    let config: ConfigFile = toml::from_str(&text)?;
    config.into_settings()
}

pub fn load_queue(path: &Path) -> Result<Vec<Job>> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError::InvalidQueue {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let queue: QueueFile = toml::from_str(&text).map_err(|e| CliError::InvalidQueue {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(queue.jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::{Arch, PluginFormat, ProjectType};

    #[test]
    fn queue_file_keeps_job_order() {
        let queue: QueueFile = toml::from_str(
            r#"
            [[job]]
            project_path = "/p/Harp"
            project_name = "Harp"
            project_version = "1.0.0"
            project_file = "Harp.xml"
            project_type = "instrument"
            plugin_format = "VST3"
            plugin_categories = ["Instrument", "Synth"]
            arch = "x64"

            [[job]]
            project_path = "/p/Harp"
            project_name = "Harp"
            project_version = "1.0.0"
            project_type = "installer"
            installer = { license = "/p/Harp/License.txt" }
            "#,
        )
        .unwrap();

        assert_eq!(queue.jobs.len(), 2);
        assert_eq!(queue.jobs[0].plugin_format, Some(PluginFormat::Vst3));
        assert_eq!(queue.jobs[0].arch, Some(Arch::X64));
        assert_eq!(queue.jobs[1].project_type, ProjectType::Installer);
    }

    #[test]
    fn unknown_job_keys_are_rejected() {
        let result: std::result::Result<QueueFile, _> = toml::from_str(
            r#"
            [[job]]
            project_path = "/p"
            project_name = "Harp"
            project_version = "1.0.0"
            project_type = "standalone"
            colour = "red"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn config_requires_hise_paths() {
        let config: ConfigFile = toml::from_str(r#"company_name = "Acme""#).unwrap();
        assert!(config.into_settings().is_err());
    }
}
