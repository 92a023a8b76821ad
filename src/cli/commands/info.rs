//! `info`: project descriptor summary.

use crate::{
    cli::RuntimeConfig,
    error::Result,
    exporter::ProjectDescriptor,
};
use std::path::Path;

#[derive(serde::Serialize)]
struct ProjectInfo<'a> {
    name: Option<&'a str>,
    version: Option<&'a str>,
    plugin_code: Option<&'a str>,
}

pub async fn info(project: &Path, config: &RuntimeConfig) -> Result<i32> {
    let descriptor = ProjectDescriptor::load(project).await?;
    let info = ProjectInfo {
        name: descriptor.name(),
        version: descriptor.version(),
        plugin_code: descriptor.plugin_code(),
    };

    let output = config.output();
    if output.is_json() {
        output.json_line(&info)?;
        return Ok(super::EXIT_OK);
    }

    let show = |value: Option<&str>| value.unwrap_or("-").to_string();
    output.println(&format!("Name:       {}", show(info.name)))?;
    output.println(&format!("Version:    {}", show(info.version)))?;
    output.println(&format!("PluginCode: {}", show(info.plugin_code)))?;
    output.verbose(&format!("Read {}", descriptor.path().display()))?;
    Ok(super::EXIT_OK)
}
