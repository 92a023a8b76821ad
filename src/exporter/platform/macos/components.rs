//! Component packages: one pkgbuild invocation per staged bundle.

use crate::exporter::build::output::is_legacy_artifact;
use std::path::Path;

/// Kind of a staged macOS artifact.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComponentKind {
    Standalone,
    Vst2,
    Vst3,
    Au,
    Aax,
    Documentation,
}

impl ComponentKind {
    /// Kind from a staged file name, `None` for files that are not installed.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        match Path::new(file_name).extension()?.to_str()? {
            "app" => Some(ComponentKind::Standalone),
            "vst" => Some(ComponentKind::Vst2),
            "vst3" => Some(ComponentKind::Vst3),
            "component" => Some(ComponentKind::Au),
            "aaxplugin" => Some(ComponentKind::Aax),
            "pdf" => Some(ComponentKind::Documentation),
            _ => None,
        }
    }

    fn id_suffix(self) -> &'static str {
        match self {
            ComponentKind::Standalone => "Standalone",
            ComponentKind::Vst2 => "VST",
            ComponentKind::Vst3 => "VST3",
            ComponentKind::Au => "AU",
            ComponentKind::Aax => "AAX",
            ComponentKind::Documentation => "Documentation",
        }
    }

    /// Choice title shown by the installer.
    pub fn title(self) -> &'static str {
        match self {
            ComponentKind::Standalone => "Standalone",
            ComponentKind::Vst2 => "VST",
            ComponentKind::Vst3 => "VST3",
            ComponentKind::Au => "AU",
            ComponentKind::Aax => "AAX",
            ComponentKind::Documentation => "Documentation",
        }
    }

    /// Choice description shown by the installer.
    pub fn description(self) -> &'static str {
        match self {
            ComponentKind::Standalone => "This will install the Standalone app.",
            ComponentKind::Vst2 => "This will install the VST2 plugin.",
            ComponentKind::Vst3 => "This will install the VST3 plugin.",
            ComponentKind::Au => "This will install the AU plugin.",
            ComponentKind::Aax => "This will install the AAX plugin, for use in Pro-Tools.",
            ComponentKind::Documentation => "This will install the User manual.",
        }
    }

    /// Install location of the component.
    pub fn install_location(self, company_name: &str) -> String {
        match self {
            ComponentKind::Standalone => format!("/Applications/{company_name}"),
            ComponentKind::Documentation => format!("/Applications/{company_name}/Documentation"),
            ComponentKind::Vst2 => "/Library/Audio/Plug-Ins/VST".to_string(),
            ComponentKind::Vst3 => "/Library/Audio/Plug-Ins/VST3".to_string(),
            ComponentKind::Au => "/Library/Audio/Plug-Ins/Components".to_string(),
            ComponentKind::Aax => "/Library/Application Support/Avid/Plug-Ins".to_string(),
        }
    }
}

/// `com.<company>.pkg.<Project><Kind>[Legacy][Ipp][Debug]`, spaces removed.
pub fn package_identifier(company_name: &str, project_name: &str, file_name: &str) -> String {
    let mut id = format!("com.{}.pkg.{project_name}", company_name.to_lowercase());
    if let Some(kind) = ComponentKind::from_file_name(file_name) {
        id.push_str(kind.id_suffix());
    }
    if is_legacy_artifact(file_name) {
        id.push_str("Legacy");
    }
    if file_name.contains("IPP") {
        id.push_str("Ipp");
    }
    if file_name.contains("Debug") {
        id.push_str("Debug");
    }
    id.retain(|c| c != ' ');
    id
}

/// A component package to build and list in the distribution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Component {
    pub file_name: String,
    pub kind: ComponentKind,
    pub identifier: String,
    pub install_location: String,
}

impl Component {
    pub fn new(company_name: &str, project_name: &str, file_name: &str) -> Option<Self> {
        let kind = ComponentKind::from_file_name(file_name)?;
        Some(Self {
            file_name: file_name.to_string(),
            kind,
            identifier: package_identifier(company_name, project_name, file_name),
            install_location: kind.install_location(company_name),
        })
    }

    /// Output name of the component package (`<file>.pkg`).
    pub fn package_name(&self) -> String {
        format!("{}.pkg", self.file_name)
    }
}
