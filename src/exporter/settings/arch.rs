//! CPU architecture types and utilities.

use std::fmt;

/// Target architecture of a compiled binary.
///
/// The HISE export CLI only distinguishes 32-bit and 64-bit Intel builds;
/// Linux and macOS jobs are always 64-bit.
///
/// # Examples
///
/// ```
/// use hise_exporter::exporter::Arch;
///
/// assert_eq!(Arch::X86.as_str(), "x86");
/// assert_eq!(Arch::X86.msbuild_platform(), "Win32");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 64-bit build.
    X64,
    /// 32-bit build (Windows only).
    X86,
}

impl Arch {
    /// Name passed to the export CLI (`-a:x64`) and used in Windows binary names.
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::X86 => "x86",
        }
    }

    /// Platform name understood by MSBuild.
    pub fn msbuild_platform(self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::X86 => "Win32",
        }
    }

    /// True for the 32-bit variant.
    pub fn is_32_bit(self) -> bool {
        matches!(self, Arch::X86)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
