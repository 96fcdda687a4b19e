//! Host-specific ways of making a file writable.
//!
//! Callers only see [`WritePermission`]; the implementation is picked once
//! for the host by [`host_permissions`].

#[cfg(not(target_os = "windows"))]
pub mod unix;
#[cfg(target_os = "windows")]
pub mod windows;

use std::io;
use std::path::Path;

pub trait WritePermission: Send + Sync {
    /// Clear whatever prevents the current process from writing `path`.
    fn make_writable(&self, path: &Path) -> io::Result<()>;

    fn name(&self) -> &'static str;
}

#[cfg(not(target_os = "windows"))]
pub fn host_permissions() -> Box<dyn WritePermission> {
    Box::new(unix::PosixPermissions)
}

#[cfg(target_os = "windows")]
pub fn host_permissions() -> Box<dyn WritePermission> {
    Box::new(windows::WindowsAttributes)
}
