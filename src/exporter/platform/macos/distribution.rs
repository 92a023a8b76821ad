//! Edits to the synthesized distribution manifest.

use super::components::Component;
use crate::exporter::{
    error::Result,
    project::xml::{Document, Element},
};
use std::path::Path;

/// Resources referenced by the installer's welcome pages.
#[derive(Clone, Copy, Debug, Default)]
pub struct DistributionResources<'a> {
    pub license: Option<&'a str>,
    pub readme: Option<&'a str>,
}

/// Add license/readme, always show the customize pane, and give every
/// choice a title and description.
pub fn customize(
    document: &mut Document,
    components: &[Component],
    resources: DistributionResources<'_>,
) {
    let root = &mut document.root;

    if let Some(license) = resources.license {
        root.push(Element::new("license").with_attribute("file", license));
    }
    if let Some(readme) = resources.readme {
        root.push(Element::new("readme").with_attribute("file", readme));
    }

    match root.find_mut("options") {
        Some(options) => options.set_attribute("customize", "always"),
        None => root.push(Element::new("options").with_attribute("customize", "always")),
    }

    for choice in root.elements_mut().filter(|e| e.name == "choice") {
        let id = choice.attribute("id").unwrap_or_default().to_string();
        if id == "default" {
            choice.set_attribute("title", "All");
            choice.set_attribute("description", "This will install everything.");
            continue;
        }

        match components.iter().find(|c| c.identifier == id) {
            Some(component) => {
                let title = if super::is_variant(&component.file_name) {
                    format!("{} ({})", component.kind.title(), component.file_name)
                } else {
                    component.kind.title().to_string()
                };
                choice.set_attribute("title", title);
                choice.set_attribute("description", component.kind.description());
            }
            None => choice.set_attribute("title", id),
        }
        choice.set_attribute("visible", "true");
    }
}

/// Load, customize and save the manifest at `path`.
pub async fn edit(
    path: &Path,
    components: &[Component],
    resources: DistributionResources<'_>,
) -> Result<()> {
    log::info!("Configuring distribution manifest");
    let mut document = Document::load(path).await?;
    customize(&mut document, components, resources);
    document.save(path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYNTHESIZED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<installer-gui-script minSpecVersion="1">
    <pkg-ref id="com.acme.pkg.HarpVST3"/>
    <options customize="never" require-scripts="false"/>
    <choices-outline>
        <line choice="default">
            <line choice="com.acme.pkg.HarpVST3"/>
        </line>
    </choices-outline>
    <choice id="default"/>
    <choice id="com.acme.pkg.HarpVST3" visible="false">
        <pkg-ref id="com.acme.pkg.HarpVST3"/>
    </choice>
</installer-gui-script>"#;

    #[test]
    fn customizes_choices_and_options() {
        let mut doc = Document::parse(SYNTHESIZED, Path::new("distribution.plist")).unwrap();
        let components = vec![Component::new("Acme", "Harp", "Harp.vst3").unwrap()];
        customize(
            &mut doc,
            &components,
            DistributionResources {
                license: Some("License.txt"),
                readme: None,
            },
        );

        let root = &doc.root;
        assert_eq!(
            root.find("options").unwrap().attribute("customize"),
            Some("always")
        );
        assert_eq!(
            root.find("license").unwrap().attribute("file"),
            Some("License.txt")
        );
        assert!(root.find("readme").is_none());

        let choices: Vec<_> = root.elements().filter(|e| e.name == "choice").collect();
        assert_eq!(choices[0].attribute("title"), Some("All"));
        assert_eq!(choices[1].attribute("title"), Some("VST3"));
        assert_eq!(choices[1].attribute("visible"), Some("true"));
        assert!(choices[1].find("pkg-ref").is_some());
    }
}
