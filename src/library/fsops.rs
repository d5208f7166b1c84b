//! File operations shared by the processors and the library passes.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Copies `src` to `dst` unless `dst` already exists.
///
/// The target is opened with exclusive create, so when two writers race for
/// the same path exactly one wins and the other sees `Ok(false)`. Parent
/// directories are created as needed. Returns `Ok(true)` if a file was
/// written.
pub fn copy_if_absent(src: &Path, dst: &Path) -> io::Result<bool> {
    let mut source = File::open(src)?;
    ensure_parent(dst)?;

    let mut target = match OpenOptions::new().write(true).create_new(true).open(dst) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e),
    };

    if let Err(e) = io::copy(&mut source, &mut target) {
        drop(target);
        let _ = fs::remove_file(dst);
        return Err(e);
    }
    Ok(true)
}

/// Copies `src` to `dst`, replacing any existing file.
pub fn copy_replacing(src: &Path, dst: &Path) -> io::Result<()> {
    ensure_parent(dst)?;
    fs::copy(src, dst).map(|_| ())
}

/// Writes `bytes` to `dst`, replacing any existing file.
pub fn write_replacing(dst: &Path, bytes: &[u8]) -> io::Result<()> {
    ensure_parent(dst)?;
    let mut file = File::create(dst)?;
    file.write_all(bytes)
}

/// Sorted list of `*.png` files directly inside `dir`.
pub fn png_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "png") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Sorted list of subdirectories directly inside `dir`.
pub fn subdirectories(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// File name of `path` as UTF-8, if it has one.
pub fn file_name_str(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// File stem of `path` as UTF-8, if it has one.
pub fn file_stem_str(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|stem| stem.to_str())
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_if_absent_never_overwrites() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.png");
        let dst = temp.path().join("nested/dir/dst.png");
        fs::write(&src, b"first").unwrap();

        assert!(copy_if_absent(&src, &dst).unwrap());
        fs::write(&src, b"second").unwrap();
        assert!(!copy_if_absent(&src, &dst).unwrap());

        assert_eq!(fs::read(&dst).unwrap(), b"first");
    }

    #[test]
    fn test_copy_if_absent_missing_source_leaves_no_target() {
        let temp = TempDir::new().unwrap();
        let dst = temp.path().join("dst.png");
        assert!(copy_if_absent(&temp.path().join("missing.png"), &dst).is_err());
        assert!(!dst.exists());
    }

    #[test]
    fn test_png_files_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        for name in ["b.png", "a.png", "notes.txt"] {
            fs::write(temp.path().join(name), b"").unwrap();
        }
        fs::create_dir(temp.path().join("dir.png")).unwrap();

        let names: Vec<_> = png_files(temp.path())
            .unwrap()
            .iter()
            .map(|p| file_name_str(p).unwrap().to_string())
            .collect();
        assert_eq!(names, ["a.png", "b.png"]);
    }
}
