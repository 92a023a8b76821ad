//! Inno Setup script template.
//!
//! Inno Setup constants use single braces (`{app}`); every path that would
//! put a constant right before a placeholder is computed up front instead.

pub const ISS_TEMPLATE: &str = r#"; {{app_name}} {{app_version}} installer
[Setup]
AppName={{app_name}}
AppVersion={{app_version}}
AppPublisher={{publisher}}
DefaultDirName={{default_dir}}
DefaultGroupName={{app_name}}
OutputDir={{output_dir}}
OutputBaseFilename={{output_base_name}}
{{#if license_file}}
LicenseFile={{license_file}}
{{/if}}
{{#if any_64}}
ArchitecturesInstallIn64BitMode=x64
{{/if}}
Compression=lzma2
SolidCompression=yes
DisableProgramGroupPage=yes

[Files]
{{#if app_64}}
Source: "{{app_name}} x64{{file_suffix}}.exe"; DestDir: "{app}"; DestName: "{{app_name}}.exe"; Check: Is64BitInstallMode; Flags: ignoreversion
{{/if}}
{{#if app_32}}
Source: "{{app_name}} x86{{file_suffix}}.exe"; DestDir: "{app}"; DestName: "{{app_name}}.exe"; Check: not Is64BitInstallMode; Flags: ignoreversion
{{/if}}
{{#if vst2_64}}
Source: "{{app_name}} x64{{file_suffix}}.dll"; DestDir: "{commonpf64}\Steinberg\VSTPlugins"; DestName: "{{app_name}}.dll"; Check: Is64BitInstallMode; Flags: ignoreversion
{{/if}}
{{#if vst2_32}}
Source: "{{app_name}} x86{{file_suffix}}.dll"; DestDir: "{commonpf32}\Steinberg\VSTPlugins"; DestName: "{{app_name}}.dll"; Flags: ignoreversion
{{/if}}
{{#if vst3_64}}
Source: "{{app_name}} x64{{file_suffix}}.vst3"; DestDir: "{commoncf64}\VST3"; DestName: "{{app_name}}.vst3"; Check: Is64BitInstallMode; Flags: ignoreversion
{{/if}}
{{#if vst3_32}}
Source: "{{app_name}} x86{{file_suffix}}.vst3"; DestDir: "{commoncf32}\VST3"; DestName: "{{app_name}}.vst3"; Flags: ignoreversion
{{/if}}
{{#if aax_64}}
Source: "{{app_name}} x64{{file_suffix}}.aaxplugin\*"; DestDir: "{{aax_dir_64}}"; Check: Is64BitInstallMode; Flags: ignoreversion recursesubdirs
{{/if}}
{{#if aax_32}}
Source: "{{app_name}} x86{{file_suffix}}.aaxplugin\*"; DestDir: "{{aax_dir_32}}"; Flags: ignoreversion recursesubdirs
{{/if}}
{{#if user_manual}}
Source: "{{user_manual}}"; DestDir: "{app}"; Flags: ignoreversion
{{/if}}
{{#if animation_libraries}}
Source: "rlottie_x64.dll"; DestDir: "{app}"; Check: Is64BitInstallMode; Flags: ignoreversion
Source: "rlottie_x86.dll"; DestDir: "{app}"; Check: not Is64BitInstallMode; Flags: ignoreversion
{{/if}}
{{#if app_any}}

[Icons]
Name: "{{icon_name}}"; Filename: "{{app_exe}}"
{{/if}}
"#;
