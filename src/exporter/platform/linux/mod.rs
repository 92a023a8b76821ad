//! Linux self-extracting installer via makeself.

mod template;

use super::{InstallerRequest, Packager, StagedFiles, list_file_names, render};
use crate::exporter::{
    build::output::is_legacy_artifact,
    error::{Context, ErrorExt, Result},
    process::{ToolCategory, ToolCommand},
    settings::LEGACY_SUFFIX,
    utils::fs,
};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

const SETUP_SCRIPT: &str = "gnu-setup-script.sh";

#[derive(serde::Serialize)]
struct SetupScriptData<'a> {
    project_name: &'a str,
    company_name: &'a str,
    legacy: u8,
}

/// `<assets>/makeself/makeself.sh --license License.txt <staging> "<Name> <Version>.run" "<Name>" ./gnu-setup-script.sh`
pub(super) async fn package(
    packager: &Packager,
    request: &InstallerRequest<'_>,
    staging: &Path,
    staged: &mut StagedFiles,
    cancel: &CancellationToken,
) -> Result<Vec<PathBuf>> {
    let file_name = format!("{} {}.run", request.project_name, request.version);
    let output = staging.join(&file_name);
    remove_previous_installers(staging, request.project_name).await?;

    let license = match request.assets.license.as_deref() {
        Some(license) => Some(staged.copy(license, staging.join("License.txt")).await?),
        None => None,
    };

    if let Some(manual) = request.assets.manual.as_deref() {
        let name = match manual.extension().and_then(|e| e.to_str()) {
            Some("pdf") => format!("{} User Manual.pdf", request.project_name),
            _ => file_name_of(manual)?,
        };
        staged.copy(manual, staging.join(name)).await?;
    }

    let script = staging.join(SETUP_SCRIPT);
    match request.assets.post_install_script.as_deref() {
        Some(custom) => {
            staged.copy(custom, script.clone()).await?;
        }
        None => {
            let legacy = list_file_names(staging)
                .await?
                .iter()
                .any(|name| is_legacy_artifact(name));
            let text = packager
                .template(SETUP_SCRIPT, template::GNU_SETUP_SCRIPT)
                .await?;
            let rendered = render(
                "gnu-setup-script",
                &text,
                &SetupScriptData {
                    project_name: request.project_name,
                    company_name: request.company_name,
                    legacy: u8::from(legacy),
                },
            )?;
            staged.write(script.clone(), rendered.as_bytes()).await?;
        }
    }
    make_executable(&script).await?;

    let makeself = packager.assets_dir().join("makeself").join("makeself.sh");
    let mut cmd = ToolCommand::new(&makeself, ToolCategory::Packager);
    if let Some(license) = &license {
        cmd = cmd.arg("--license").arg(license);
    }
    let cmd = cmd
        .arg(staging)
        .arg(&file_name)
        .arg(request.project_name)
        .arg(format!("./{SETUP_SCRIPT}"))
        .current_dir(staging);

    log::info!("Running makeself");
    packager
        .runner()
        .run(&cmd, cancel)
        .await
        .context("makeself failed")?;

    Ok(vec![output])
}

/// Delete `<Name> <version>.run` archives from earlier runs so makeself does
/// not pack them into the new one. Staged standalone builds are kept.
async fn remove_previous_installers(staging: &Path, project_name: &str) -> Result<()> {
    for name in list_file_names(staging).await? {
        if is_previous_installer(&name, project_name) {
            log::info!("Removing old installer {name}");
            fs::remove_path_if_exists(&staging.join(&name)).await?;
        }
    }
    Ok(())
}

fn is_previous_installer(file_name: &str, project_name: &str) -> bool {
    let Some(stem) = file_name.strip_suffix(".run") else {
        return false;
    };
    let Some(rest) = stem.strip_prefix(project_name) else {
        return false;
    };
    let build = rest.trim_end_matches(LEGACY_SUFFIX);
    rest.starts_with(' ') && !matches!(build, "" | " (IPP)")
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .fs_context("failed to make setup script executable", path)
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
