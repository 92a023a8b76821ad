//! Project descriptor store: `project_info.xml` and the generated build project.

pub mod descriptor;
pub mod jucer;
pub mod xml;

pub use descriptor::{DESCRIPTOR_FILE, ProjectDescriptor};
pub use jucer::{BUILD_PROJECT_FILE, BuildProjectFile};
