//! Filesystem helpers built on `cap-std` and `camino`.

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};
use std::io;

/// Open a UTF-8 file path using ambient authority.
pub(crate) fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Return whether a path exists and is a regular file.
///
/// The path is opened with ambient authority, so symlinks are followed to
/// wherever they point, and the check runs on the opened handle.
pub(crate) fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let file = open_utf8_file(path)?;
    Ok(file.metadata()?.is_file())
}
