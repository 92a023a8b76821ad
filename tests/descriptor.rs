use hise_exporter::exporter::{BuildProjectFile, PluginFormat, ProjectDescriptor};
use std::path::Path;

const PROJECT_INFO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>

<ProjectSettings>
  <Name value="Harp"/>
  <Version value="0.9.0"/>
  <!-- edited by hand -->
  <Description value="Plucked &amp; bowed strings"/>
  <BundleIdentifier value="com.acme.harp"/>
  <PluginCode value="Hrp1"/>
  <EmbedAudioFiles value="1"/>
  <ExtraDefinitionsWindows value="HI_SUPPORT_MONO=1&#10;NUM_POLYPHONIC_VOICES=128"/>
</ProjectSettings>
"#;

fn write_descriptor(dir: &Path) {
    std::fs::write(dir.join("project_info.xml"), PROJECT_INFO).unwrap();
}

#[tokio::test]
async fn adding_a_field_keeps_every_other_field() {
    let dir = tempfile::tempdir().unwrap();
    write_descriptor(dir.path());

    let before = ProjectDescriptor::load(dir.path()).await.unwrap();
    let original: Vec<(String, Option<String>)> = before
        .entries()
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
        .collect();

    let mut descriptor = before.clone();
    descriptor.set_flag("VST3Support", true);
    descriptor.save().await.unwrap();

    let after = ProjectDescriptor::load(dir.path()).await.unwrap();
    let entries = after.entries();
    assert_eq!(entries.len(), original.len() + 1);
    for ((key, value), (old_key, old_value)) in entries.iter().zip(&original) {
        assert_eq!(key, old_key);
        assert_eq!(value.map(str::to_string), *old_value);
    }
    assert_eq!(entries.last(), Some(&("VST3Support", Some("1"))));
    assert_eq!(after.get("Description"), Some("Plucked & bowed strings"));
    assert_eq!(
        after.get("ExtraDefinitionsWindows"),
        Some("HI_SUPPORT_MONO=1\nNUM_POLYPHONIC_VOICES=128")
    );

    let text = std::fs::read_to_string(dir.path().join("project_info.xml")).unwrap();
    assert!(text.contains("edited by hand"));
}

#[tokio::test]
async fn name_and_version_are_replaced_in_place() {
    let dir = tempfile::tempdir().unwrap();
    write_descriptor(dir.path());

    let mut descriptor = ProjectDescriptor::load(dir.path()).await.unwrap();
    descriptor.set("Name", "Harp Pro");
    descriptor.set("Version", "1.0.0");
    descriptor.save().await.unwrap();

    let reloaded = ProjectDescriptor::load(dir.path()).await.unwrap();
    assert_eq!(reloaded.name(), Some("Harp Pro"));
    assert_eq!(reloaded.version(), Some("1.0.0"));
    assert_eq!(reloaded.plugin_code(), Some("Hrp1"));
    assert_eq!(reloaded.entries()[0].0, "Name");
    assert_eq!(reloaded.entries()[1].0, "Version");
}

#[tokio::test]
async fn missing_descriptor_is_a_filesystem_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ProjectDescriptor::load(dir.path()).await.unwrap_err();
    assert!(err.to_string().contains("project_info.xml"));
}

#[tokio::test]
async fn category_attributes_follow_plugin_format() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("Binaries")).unwrap();
    std::fs::write(
        dir.path().join("Binaries/AutogeneratedProject.jucer"),
        r#"<?xml version="1.0" encoding="UTF-8"?>
<JUCERPROJECT id="Tu7xvT" name="Harp" projectType="audioplug">
  <EXPORTFORMATS><LINUX_MAKE targetFolder="Builds/LinuxMakefile"/></EXPORTFORMATS>
</JUCERPROJECT>
"#,
    )
    .unwrap();

    let categories = vec!["Instrument".to_string(), "Synth".to_string()];
    let mut project = BuildProjectFile::load(dir.path()).await.unwrap();
    project.set_plugin_categories(PluginFormat::Vst2, &categories);
    project.set_plugin_categories(PluginFormat::Aax, &categories);
    project.save().await.unwrap();

    let reloaded = BuildProjectFile::load(dir.path()).await.unwrap();
    assert_eq!(reloaded.attribute("pluginVSTCategory"), Some("Instrument"));
    assert_eq!(reloaded.attribute("pluginAAXCategory"), Some("Instrument,Synth"));
    assert_eq!(reloaded.attribute("pluginVST3Category"), None);
    assert_eq!(reloaded.attribute("projectType"), Some("audioplug"));

    let text = std::fs::read_to_string(dir.path().join("Binaries/AutogeneratedProject.jucer")).unwrap();
    assert!(text.contains("LINUX_MAKE"));
}
