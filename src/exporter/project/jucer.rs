//! `Binaries/AutogeneratedProject.jucer`: the build-project file HISE exports.

use super::xml::Document;
use crate::exporter::{error::Result, settings::PluginFormat};
use std::path::{Path, PathBuf};

/// File name of the generated build project, relative to `<project>/Binaries`.
pub const BUILD_PROJECT_FILE: &str = "AutogeneratedProject.jucer";

/// The generated native-build project. Only root attributes are patched.
#[derive(Clone, Debug)]
pub struct BuildProjectFile {
    path: PathBuf,
    document: Document,
}

impl BuildProjectFile {
    pub fn path_for(project_path: &Path) -> PathBuf {
        project_path.join("Binaries").join(BUILD_PROJECT_FILE)
    }

    pub async fn load(project_path: &Path) -> Result<Self> {
        let path = Self::path_for(project_path);
        let document = Document::load(&path).await?;
        Ok(Self { path, document })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.document.root.attribute(name)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.document.root.set_attribute(name, value);
    }

    /// Write the format's category attribute. VST2 takes a single category,
    /// VST3 and AAX a comma-joined list; AU has no such attribute.
    pub fn set_plugin_categories(&mut self, format: PluginFormat, categories: &[String]) {
        let Some(attribute) = format.category_attribute() else {
            return;
        };
        let value = match format {
            PluginFormat::Vst2 => categories.first().cloned().unwrap_or_default(),
            _ => categories.join(","),
        };
        self.set_attribute(attribute, value);
    }

    pub fn set_company_email(&mut self, email: &str) {
        self.set_attribute("companyEmail", email);
    }

    pub async fn save(&self) -> Result<()> {
        self.document.save(&self.path).await
    }
}
