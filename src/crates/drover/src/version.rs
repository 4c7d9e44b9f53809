//! Build identity
//!
//! The commit and build-time stamps are injected by `build.rs`; the
//! crate version comes from the workspace manifest. [`banner`] is the
//! one line the CLI prints for `drover version` and for a bare
//! invocation.

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short hash of the commit this binary was built from
pub const GIT_COMMIT: &str = env!("DROVER_GIT_COMMIT");

/// UTC time this binary was built
pub const BUILD_TIME: &str = env!("DROVER_BUILD_TIME");

/// One-line identity banner
///
/// Reads like `drover 0.1.0 (commit 1a2b3c4, built 2026-08-25T09:00:00Z)`.
pub fn banner() -> String {
    format!(
        "drover {} (commit {}, built {})",
        VERSION, GIT_COMMIT, BUILD_TIME
    )
}
