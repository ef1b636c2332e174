//! Platform default credential helper detection

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::native_store::HELPER_PROGRAM_PREFIX;

/// Detect the platform default credential helper.
///
/// Returns the helper name (e.g. `osxkeychain`) only when its
/// `docker-credential-<name>` program is installed.
pub fn detect_default_helper() -> Option<String> {
    let helper = platform_default_helper()?;
    let program = format!("{}{}", HELPER_PROGRAM_PREFIX, helper);

    match find_executable(&program) {
        Some(path) => {
            debug!("Found default credential helper at {:?}", path);
            Some(helper.to_string())
        }
        None => {
            debug!("Default credential helper {} is not installed", program);
            None
        }
    }
}

/// Helper name preferred on this platform
fn platform_default_helper() -> Option<&'static str> {
    #[cfg(target_os = "macos")]
    return Some("osxkeychain");

    #[cfg(target_os = "windows")]
    return Some("wincred");

    #[cfg(target_os = "linux")]
    return Some(if find_executable("pass").is_some() {
        "pass"
    } else {
        "secretservice"
    });

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    return None;
}

/// Look up an executable on `PATH`
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    find_executable_in(name, &path)
}

fn find_executable_in(name: &str, path: &OsStr) -> Option<PathBuf> {
    #[cfg(windows)]
    let name = format!("{}.exe", name);

    std::env::split_paths(path)
        .map(|dir| dir.join(&name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
