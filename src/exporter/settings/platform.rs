//! Platform profile: every per-OS difference of the pipeline in one value.
//!
//! The profile is resolved once per run and handed to the build invoker,
//! packager, signing client and engine. Adding a platform means adding a
//! constructor here, not touching every component.

use super::job::PluginFormat;
use std::{fmt, path::PathBuf};

/// Operating system family a profile targets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPlatform {
    /// Linux (Makefile builds, makeself installers).
    Linux,
    /// macOS (Xcode builds, productbuild installers, code signing).
    Macos,
    /// Windows (MSBuild builds, Inno Setup installers).
    Windows,
}

impl HostPlatform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            HostPlatform::Macos
        } else if cfg!(target_os = "windows") {
            HostPlatform::Windows
        } else {
            HostPlatform::Linux
        }
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HostPlatform::Linux => "linux",
            HostPlatform::Macos => "macos",
            HostPlatform::Windows => "windows",
        })
    }
}

/// Native build system driven by the compile step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NativeBuild {
    /// `make CONFIG=.. AR=gcc-ar -j N` with `N = 2 * cores - 1`.
    Make,
    /// `xcodebuild -project X.xcodeproj -configuration .. -jobs N`.
    Xcode,
    /// `MSBuild.exe /p:Configuration=.. /p:Platform=.. -maxcpucount:N`.
    MsBuild,
}

/// Installer tool chain used for installer jobs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PackagerKind {
    /// Self-extracting `.run` archive via makeself.
    Makeself,
    /// pkgbuild + productbuild distribution package.
    ProductBuild,
    /// Inno Setup compiler.
    InnoSetup,
}

/// Where the native build system leaves the compiled binary, relative to
/// `<project>/Binaries`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputLayout {
    /// Every target lands in `Builds/LinuxMakefile/build`.
    SingleBuildDir,
    /// Standalone in `Compiled`, plugins in `Builds/MacOSX/build/<Config>`.
    CompiledOrConfigDir,
    /// `Compiled/App`, `Compiled/VST` for VST2, `Compiled/<Format>` otherwise.
    CompiledPerFormat,
}

/// Per-platform toolchain paths, argument syntax and output layout.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlatformProfile {
    /// Operating system family.
    pub platform: HostPlatform,
    /// Name of the staging folder under `<project>/Packaging/`.
    pub staging_name: &'static str,
    /// Folder under `Binaries/Builds` holding the generated native project.
    pub build_folder: &'static str,
    /// Native build system.
    pub native_build: NativeBuild,
    /// Output location rules.
    pub output_layout: OutputLayout,
    /// Extension of a standalone application.
    pub standalone_extension: &'static str,
    /// Extension of a VST2 plugin.
    pub vst2_extension: &'static str,
    /// Whether the built binary name carries the architecture (`"Name x64"`).
    pub output_name_includes_arch: bool,
    /// Suffix for vectorized-math builds, when this platform marks them.
    pub vectorization_suffix: Option<&'static str>,
    /// Path of the project resave helper relative to `<source>/tools/projucer`.
    pub resave_helper: &'static [&'static str],
    /// Whether binaries and installers can be signed and notarized.
    pub supports_code_signing: bool,
    /// Whether `VST3Support` may be enabled in the project descriptor.
    /// Where it may not, the flag is still written, always as `0`.
    pub vst3_support: bool,
    /// Plugin formats offered on this platform.
    pub plugin_formats: &'static [PluginFormat],
    /// Installer tool chain.
    pub packager: PackagerKind,
    /// Runtime libraries copied for the bundled-animation-library flag.
    pub animation_libraries: &'static [&'static str],
    /// Whether the ASIO SDK must be present for compilation jobs.
    pub requires_asio_sdk: bool,
}

/// Marker appended to legacy-CPU binary names, on every platform.
pub const LEGACY_SUFFIX: &str = " (L)";

impl PlatformProfile {
    /// Profile for the running operating system.
    pub fn host() -> Self {
        Self::for_platform(HostPlatform::current())
    }

    /// Profile for an explicit platform.
    pub fn for_platform(platform: HostPlatform) -> Self {
        match platform {
            HostPlatform::Linux => Self::linux(),
            HostPlatform::Macos => Self::macos(),
            HostPlatform::Windows => Self::windows(),
        }
    }

    /// Linux: Makefile builds, makeself installers.
    pub fn linux() -> Self {
        Self {
            platform: HostPlatform::Linux,
            staging_name: "linux",
            build_folder: "LinuxMakefile",
            native_build: NativeBuild::Make,
            output_layout: OutputLayout::SingleBuildDir,
            standalone_extension: ".run",
            vst2_extension: ".so",
            output_name_includes_arch: false,
            vectorization_suffix: Some(" (IPP)"),
            resave_helper: &["Projucer"],
            supports_code_signing: false,
            vst3_support: false,
            plugin_formats: &[PluginFormat::Vst2, PluginFormat::Vst3],
            packager: PackagerKind::Makeself,
            animation_libraries: &["librlottie.so"],
            requires_asio_sdk: false,
        }
    }

    /// macOS: Xcode builds, productbuild installers, signing and notarization.
    pub fn macos() -> Self {
        Self {
            platform: HostPlatform::Macos,
            staging_name: "darwin",
            build_folder: "MacOSX",
            native_build: NativeBuild::Xcode,
            output_layout: OutputLayout::CompiledOrConfigDir,
            standalone_extension: ".app",
            vst2_extension: ".vst",
            output_name_includes_arch: false,
            vectorization_suffix: None,
            resave_helper: &["Projucer.app", "Contents", "MacOS", "Projucer"],
            supports_code_signing: true,
            vst3_support: true,
            plugin_formats: &[
                PluginFormat::Vst2,
                PluginFormat::Vst3,
                PluginFormat::Au,
                PluginFormat::Aax,
            ],
            packager: PackagerKind::ProductBuild,
            animation_libraries: &["librlottie.dylib"],
            requires_asio_sdk: false,
        }
    }

    /// Windows: MSBuild builds, Inno Setup installers.
    pub fn windows() -> Self {
        Self {
            platform: HostPlatform::Windows,
            staging_name: "win32",
            build_folder: "VisualStudio2017",
            native_build: NativeBuild::MsBuild,
            output_layout: OutputLayout::CompiledPerFormat,
            standalone_extension: ".exe",
            vst2_extension: ".dll",
            output_name_includes_arch: true,
            vectorization_suffix: None,
            resave_helper: &["Projucer.exe"],
            supports_code_signing: false,
            vst3_support: true,
            plugin_formats: &[PluginFormat::Vst2, PluginFormat::Vst3, PluginFormat::Aax],
            packager: PackagerKind::InnoSetup,
            animation_libraries: &["rlottie_x86.dll", "rlottie_x64.dll"],
            requires_asio_sdk: true,
        }
    }

    /// `<project>/Packaging/<platform>`: staging and final artifact location.
    pub fn staging_dir(&self, project_path: &std::path::Path) -> PathBuf {
        project_path.join("Packaging").join(self.staging_name)
    }

    /// Whether `format` can be built here.
    pub fn supports_format(&self, format: PluginFormat) -> bool {
        self.plugin_formats.contains(&format)
    }
}
