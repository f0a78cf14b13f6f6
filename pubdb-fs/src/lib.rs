//! Filesystem helpers for pubdb built on `cap-std` and `camino`.
#![forbid(unsafe_code)]

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io::{self, Read};

/// Read the whole file at `path` into memory using ambient authority.
pub fn read_bytes(path: &Utf8Path) -> io::Result<Vec<u8>> {
    let mut file = fs_utf8::File::open_ambient(path, ambient_authority())?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

/// Return whether `path` is a regular file.
///
/// A missing path is reported as [`io::ErrorKind::NotFound`].
pub fn is_regular_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_parent_dir(path)?;
    Ok(dir.metadata(name.as_str())?.is_file())
}

/// Create every missing directory above `path`.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base_dir, relative) = split_ambient_base(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)
}

fn open_parent_dir(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

// cap-std refuses absolute paths below a directory handle, so absolute
// parents are opened from the filesystem root.
fn split_ambient_base(parent: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let (base, relative) = if parent.is_absolute() {
        let mut components = parent.components();
        let root = components
            .next()
            .ok_or_else(|| io::Error::other("absolute path without a root"))?;
        let mut base = Utf8PathBuf::from(root.as_str());
        // Windows drive prefixes are followed by a separate root component.
        if matches!(root, Utf8Component::Prefix(_))
            && let Some(next @ Utf8Component::RootDir) = components.clone().next()
        {
            base.push(next.as_str());
            components.next();
        }
        (base, components.as_path().to_path_buf())
    } else {
        (Utf8PathBuf::from("."), parent.to_path_buf())
    };
    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    Ok((dir, relative))
}
