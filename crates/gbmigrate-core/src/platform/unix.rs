use super::WritePermission;
use std::fs;
use std::io;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Opens the file to read/write for owner, group and other (mode 0666).
pub struct PosixPermissions;

impl WritePermission for PosixPermissions {
    #[cfg(unix)]
    fn make_writable(&self, path: &Path) -> io::Result<()> {
        fs::set_permissions(path, fs::Permissions::from_mode(0o666))
    }

    #[cfg(not(unix))]
    fn make_writable(&self, path: &Path) -> io::Result<()> {
        let mut permissions = fs::metadata(path)?.permissions();
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)
    }

    fn name(&self) -> &'static str {
        "chmod 0666"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_make_writable_sets_0666() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("locked.h");
        fs::write(&path, "int x;").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();

        PosixPermissions.make_writable(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o666);
    }

    #[test]
    fn test_make_writable_missing_file_errors() {
        let dir = tempdir().unwrap();
        let result = PosixPermissions.make_writable(&dir.path().join("gone.cpp"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
