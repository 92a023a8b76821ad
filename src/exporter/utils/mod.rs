//! Filesystem and checksum helpers.

pub mod checksum;
pub mod fs;
