use crate::platform::WritePermission;
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteAccess {
    AlreadyWritable,
    Granted,
    /// The platform call failed; the write that follows will report the real error.
    Denied(String),
}

/// True when `path` is not flagged read-only and can be opened for writing.
/// Opening does not truncate or create.
pub fn is_writable(path: &Path) -> bool {
    let readonly = match fs::metadata(path) {
        Ok(metadata) => metadata.permissions().readonly(),
        Err(_) => return false,
    };
    !readonly && OpenOptions::new().write(true).open(path).is_ok()
}

/// Best-effort: make `path` writable before it gets overwritten.
///
/// Never fails. Calling it on a writable file only costs the check.
pub fn ensure_writable(path: &Path, permissions: &dyn WritePermission) -> WriteAccess {
    if is_writable(path) {
        return WriteAccess::AlreadyWritable;
    }

    debug!(
        "{} is not writable, applying '{}'",
        path.display(),
        permissions.name()
    );

    match permissions.make_writable(path) {
        Ok(()) => WriteAccess::Granted,
        Err(err) => {
            warn!("Failed to change permissions of {}: {}", path.display(), err);
            WriteAccess::Denied(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct CountingPermissions {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingPermissions {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl WritePermission for CountingPermissions {
        fn make_writable(&self, path: &Path) -> io::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "not allowed"));
            }
            let mut permissions = fs::metadata(path)?.permissions();
            #[allow(clippy::permissions_set_readonly_false)]
            permissions.set_readonly(false);
            fs::set_permissions(path, permissions)
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn read_only_file(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("readonly.cpp");
        fs::write(&path, "// text").unwrap();
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&path, permissions).unwrap();
        path
    }

    #[test]
    fn test_writable_file_skips_platform_call() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("open.cpp");
        fs::write(&path, "// text").unwrap();

        let permissions = CountingPermissions::new(false);
        assert_eq!(ensure_writable(&path, &permissions), WriteAccess::AlreadyWritable);
        assert_eq!(ensure_writable(&path, &permissions), WriteAccess::AlreadyWritable);
        assert_eq!(permissions.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_read_only_file_is_granted() {
        let dir = tempdir().unwrap();
        let path = read_only_file(dir.path());

        let permissions = CountingPermissions::new(false);
        assert_eq!(ensure_writable(&path, &permissions), WriteAccess::Granted);
        assert!(is_writable(&path));
        assert_eq!(ensure_writable(&path, &permissions), WriteAccess::AlreadyWritable);
        assert_eq!(permissions.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_platform_failure_is_reported_not_raised() {
        let dir = tempdir().unwrap();
        let path = read_only_file(dir.path());

        let permissions = CountingPermissions::new(true);
        match ensure_writable(&path, &permissions) {
            WriteAccess::Denied(reason) => assert!(reason.contains("not allowed")),
            other => panic!("expected Denied, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_not_writable() {
        let dir = tempdir().unwrap();
        assert!(!is_writable(&dir.path().join("missing.h")));
    }
}
