use super::WritePermission;
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use winapi::um::fileapi::{GetFileAttributesW, SetFileAttributesW, INVALID_FILE_ATTRIBUTES};
use winapi::um::winnt::FILE_ATTRIBUTE_READONLY;

/// Clears `FILE_ATTRIBUTE_READONLY`, the equivalent of `attrib -r`.
pub struct WindowsAttributes;

fn to_wide(path: &Path) -> Vec<u16> {
    path.as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

impl WritePermission for WindowsAttributes {
    fn make_writable(&self, path: &Path) -> io::Result<()> {
        let wide = to_wide(path);

        unsafe {
            let attributes = GetFileAttributesW(wide.as_ptr());
            if attributes == INVALID_FILE_ATTRIBUTES {
                return Err(io::Error::last_os_error());
            }
            if attributes & FILE_ATTRIBUTE_READONLY == 0 {
                return Ok(());
            }
            if SetFileAttributesW(wide.as_ptr(), attributes & !FILE_ATTRIBUTE_READONLY) == 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "attrib -r"
    }
}
