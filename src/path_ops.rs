//! Stateless path-level operations. Metadata is read fresh on every call.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::{FsError, FsResult};

pub const DEFAULT_COPY_BUFFER: usize = 4096;

/// What sits at a path, as reported by `exists`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Absent,
    Directory,
    File,
}

impl EntryKind {
    /// Host encoding: 0 absent, 1 directory, 2 regular file.
    pub fn code(self) -> u8 {
        match self {
            EntryKind::Absent => 0,
            EntryKind::Directory => 1,
            EntryKind::File => 2,
        }
    }
}

impl Serialize for EntryKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Stat {
    /// -1 neither, 1 directory, 2 regular file
    pub flag: i8,
    pub length: u64,
    /// Milliseconds since the Unix epoch, 0 when unknown
    pub mtime: f64,
}

pub fn exists(path: &Path) -> EntryKind {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => EntryKind::Directory,
        Ok(meta) if meta.is_file() => EntryKind::File,
        _ => EntryKind::Absent,
    }
}

/// Missing paths report `flag: -1` with zero length and mtime rather than an error.
pub fn stat(path: &Path) -> Stat {
    let Ok(meta) = fs::metadata(path) else {
        return Stat {
            flag: -1,
            length: 0,
            mtime: 0.0,
        };
    };
    let flag = if meta.is_file() {
        2
    } else if meta.is_dir() {
        1
    } else {
        -1
    };
    let mtime = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0);
    Stat {
        flag,
        length: meta.len(),
        mtime,
    }
}

/// List the children of a directory as full paths, sorted.
pub fn readdir(path: &Path) -> FsResult<Vec<PathBuf>> {
    let entries = fs::read_dir(path).map_err(|err| FsError::at_path(path, err))?;
    let mut children = entries
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    children.sort();
    Ok(children)
}

/// Delete a file or a directory tree. A missing path is not an error.
pub fn remove(path: &Path) -> FsResult<()> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => Err(err),
    };
    result.map_err(|err| FsError::at_path(path, err))?;
    debug!(path = %path.display(), "removed");
    Ok(())
}

pub fn rename(src: &Path, dst: &Path) -> FsResult<bool> {
    ensure_transfer(src, dst)?;
    if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
        if exists(parent) != EntryKind::Directory {
            return Err(FsError::NotFound(parent.to_path_buf()));
        }
    }
    fs::rename(src, dst).map_err(|err| FsError::at_path(src, err))?;
    debug!(src = %src.display(), dst = %dst.display(), "moved");
    Ok(true)
}

/// Copy `src` to a new file at `dst` through a buffer of `buffer_size` bytes.
pub fn copy(src: &Path, dst: &Path, buffer_size: usize) -> FsResult<bool> {
    ensure_transfer(src, dst)?;
    if exists(src) != EntryKind::File {
        return Err(FsError::invalid_input(format!(
            "not a regular file: {}",
            src.display()
        )));
    }
    let mut input = File::open(src).map_err(|err| FsError::at_path(src, err))?;
    let mut output = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dst)
        .map_err(|err| FsError::at_path(dst, err))?;

    let mut buffer = vec![0u8; buffer_size.max(1)];
    let total = match transfer(&mut input, &mut output, &mut buffer) {
        Ok(total) => total,
        Err(err) => {
            drop(output);
            if let Err(cleanup) = fs::remove_file(dst) {
                warn!(dst = %dst.display(), %cleanup, "failed to remove partial copy");
            }
            return Err(err.into());
        }
    };
    debug!(src = %src.display(), dst = %dst.display(), bytes = total, "copied");
    Ok(true)
}

/// Create an empty file. Returns `false` if something already exists there.
///
/// With `parents`, missing ancestor directories are created first.
pub fn touch(path: &Path, parents: bool) -> FsResult<bool> {
    if parents {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            match exists(parent) {
                EntryKind::Directory => {}
                EntryKind::File => {
                    return Err(FsError::invalid_input(format!(
                        "not a directory: {}",
                        parent.display()
                    )))
                }
                EntryKind::Absent => {
                    fs::create_dir_all(parent).map_err(|err| FsError::at_path(parent, err))?
                }
            }
        }
    }
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(err) => Err(FsError::at_path(path, err)),
    }
}

/// Create a directory. Returns `false` if it already exists as a directory.
pub fn mkdir(path: &Path, parents: bool) -> FsResult<bool> {
    match exists(path) {
        EntryKind::Directory => return Ok(false),
        EntryKind::File => return Err(FsError::AlreadyExists(path.to_path_buf())),
        EntryKind::Absent => {}
    }
    let result = if parents {
        fs::create_dir_all(path)
    } else {
        fs::create_dir(path)
    };
    result.map_err(|err| FsError::at_path(path, err))?;
    Ok(true)
}

fn transfer(input: &mut File, output: &mut File, buffer: &mut [u8]) -> io::Result<u64> {
    let mut total = 0u64;
    loop {
        let n = match input.read(buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        output.write_all(&buffer[..n])?;
        total += n as u64;
    }
    output.flush()?;
    Ok(total)
}

fn ensure_transfer(src: &Path, dst: &Path) -> FsResult<()> {
    if exists(src) == EntryKind::Absent {
        return Err(FsError::NotFound(src.to_path_buf()));
    }
    if fs::symlink_metadata(dst).is_ok() {
        return Err(FsError::AlreadyExists(dst.to_path_buf()));
    }
    Ok(())
}
