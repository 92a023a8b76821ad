//! Command execution for `run`, `validate` and `info`.

mod info;
mod run;
mod validate;

pub use info::info;
pub use run::run;
pub use validate::validate;

/// Exit code when every job finished.
pub const EXIT_OK: i32 = 0;
/// Exit code when a job failed or nothing could be queued.
pub const EXIT_FAILED: i32 = 1;
/// Exit code after Ctrl-C.
pub const EXIT_CANCELLED: i32 = 130;
