//! Headless export pipeline for HISE audio plugin projects.
//!
//! This library drives the external tool chain that turns a HISE project into
//! distributable binaries and installers:
//! - Linux: Makefile builds, makeself `.run` installers
//! - macOS: Xcode builds, pkgbuild/productbuild installers, signing and notarization
//! - Windows: MSBuild builds, Inno Setup installers
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod error;
pub mod exporter;

// Re-export commonly used types
pub use error::{CliError, ExporterError, Result};
