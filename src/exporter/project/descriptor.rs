//! `project_info.xml`: the per-project key/value descriptor read by HISE.

use super::xml::{Document, Element, Node};
use crate::exporter::error::Result;
use std::path::{Path, PathBuf};

/// File name of the descriptor inside a project folder.
pub const DESCRIPTOR_FILE: &str = "project_info.xml";

/// Ordered name/value settings of a project.
///
/// Each entry is an element `<Key value="..."/>` under the root. Entries are
/// updated in place and new keys are appended; anything else in the file is
/// kept untouched.
#[derive(Clone, Debug)]
pub struct ProjectDescriptor {
    path: PathBuf,
    document: Document,
}

impl ProjectDescriptor {
    /// Descriptor location for a project folder.
    pub fn path_for(project_path: &Path) -> PathBuf {
        project_path.join(DESCRIPTOR_FILE)
    }

    /// Read `<project>/project_info.xml`.
    pub async fn load(project_path: &Path) -> Result<Self> {
        let path = Self::path_for(project_path);
        let document = Document::load(&path).await?;
        Ok(Self { path, document })
    }

    /// A descriptor that has not been written yet.
    pub fn empty(project_path: &Path) -> Self {
        Self {
            path: Self::path_for(project_path),
            document: Document::new(Element::new("ProjectSettings")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.document.root.find(key)?.attribute("value")
    }

    /// Set `key` to `value`, appending a new entry when absent.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        log::debug!("Setting project xml: {key} = {value}");
        match self.document.root.find_mut(key) {
            Some(entry) => entry.set_attribute("value", value),
            None => self
                .document
                .root
                .push(Element::new(key).with_attribute("value", value)),
        }
    }

    /// Booleans are persisted as `1` / `0`.
    pub fn set_flag(&mut self, key: &str, enabled: bool) {
        self.set(key, if enabled { "1" } else { "0" });
    }

    /// Entry names and values in file order.
    pub fn entries(&self) -> Vec<(&str, Option<&str>)> {
        self.document
            .root
            .children
            .iter()
            .filter_map(|node| match node {
                Node::Element(e) => Some((e.name.as_str(), e.attribute("value"))),
                _ => None,
            })
            .collect()
    }

    pub fn name(&self) -> Option<&str> {
        self.get("Name")
    }

    pub fn version(&self) -> Option<&str> {
        self.get("Version")
    }

    pub fn plugin_code(&self) -> Option<&str> {
        self.get("PluginCode")
    }

    /// Write the whole descriptor back, replacing the old file.
    pub async fn save(&self) -> Result<()> {
        self.document.save(&self.path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_updates_in_place_and_appends_new_keys() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join(DESCRIPTOR_FILE),
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ProjectSettings>
  <Name value="Old"/>
  <Version value="0.9.0"/>
  <PluginCode value="Abcd"/>
</ProjectSettings>"#,
        )
        .await
        .unwrap();

        let mut descriptor = ProjectDescriptor::load(dir.path()).await.unwrap();
        descriptor.set("Name", "Harp");
        descriptor.set_flag("VST3Support", true);
        descriptor.save().await.unwrap();

        let reloaded = ProjectDescriptor::load(dir.path()).await.unwrap();
        assert_eq!(
            reloaded.entries(),
            vec![
                ("Name", Some("Harp")),
                ("Version", Some("0.9.0")),
                ("PluginCode", Some("Abcd")),
                ("VST3Support", Some("1")),
            ]
        );
        assert_eq!(reloaded.plugin_code(), Some("Abcd"));
    }

    #[tokio::test]
    async fn missing_descriptor_is_fs_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProjectDescriptor::load(dir.path()).await.unwrap_err();
        assert!(matches!(err, crate::exporter::Error::Fs { .. }));
    }
}
