//! Descriptor-based file access: open, seek, read, write and friends.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::codec::{self, HexDecodeMode};
use crate::error::{FsError, FsResult};
use crate::handle::{Descriptor, HandleTable};

/// The descriptor-level operation set handed to the host.
///
/// Safe to share across threads. Calls on the same descriptor are serialized;
/// calls on distinct descriptors run independently.
pub struct FileAccess {
    table: HandleTable,
    hex_decode: HexDecodeMode,
}

impl Default for FileAccess {
    fn default() -> Self {
        Self::new(HexDecodeMode::default())
    }
}

impl FileAccess {
    pub fn new(hex_decode: HexDecodeMode) -> Self {
        Self {
            table: HandleTable::new(),
            hex_decode,
        }
    }

    /// Open `path` for reading and writing, creating it if absent.
    pub fn open(&self, path: &Path) -> FsResult<Descriptor> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|err| FsError::at_path(path, err))?;
        let fd = self.table.allocate(file);
        debug!(%fd, path = %path.display(), "opened file");
        Ok(fd)
    }

    pub fn close(&self, fd: Descriptor) -> FsResult<()> {
        let file = self.table.release(fd)?;
        drop(file);
        debug!(%fd, "closed file");
        Ok(())
    }

    pub fn tell(&self, fd: Descriptor) -> FsResult<u64> {
        let handle = self.table.lookup(fd)?;
        let mut file = handle.lock()?;
        Ok(file.stream_position()?)
    }

    /// Move the cursor to an absolute offset, possibly past the end of the file.
    pub fn seek(&self, fd: Descriptor, offset: i64) -> FsResult<u64> {
        let handle = self.table.lookup(fd)?;
        let offset = non_negative(offset, "seek offset")?;
        let mut file = handle.lock()?;
        let position = file.seek(SeekFrom::Start(offset))?;
        debug!(%fd, position, "seek");
        Ok(position)
    }

    /// Set the file length, zero-extending or discarding the tail. The cursor
    /// stays where it was.
    pub fn truncate(&self, fd: Descriptor, length: i64) -> FsResult<u64> {
        let handle = self.table.lookup(fd)?;
        let length = non_negative(length, "truncate length")?;
        let file = handle.lock()?;
        file.set_len(length)?;
        debug!(%fd, length, "truncate");
        Ok(length)
    }

    /// Read up to `max_length` bytes from the cursor and return them hex-encoded.
    ///
    /// Returns fewer bytes only at end of file; an empty string means EOF.
    pub fn read(&self, fd: Descriptor, max_length: i64) -> FsResult<String> {
        let handle = self.table.lookup(fd)?;
        let max_length = non_negative(max_length, "read length")?;
        let mut file = handle.lock()?;

        let mut buf = Vec::new();
        (&mut *file).take(max_length).read_to_end(&mut buf)?;
        debug!(%fd, requested = max_length, read = buf.len(), "read");
        Ok(codec::encode(&buf))
    }

    /// Decode `hex` and write it at the cursor in a single OS call.
    ///
    /// A short write is reported as an error, not retried.
    pub fn write(&self, fd: Descriptor, hex: &str) -> FsResult<u64> {
        let handle = self.table.lookup(fd)?;
        let bytes = self.hex_decode.decode(hex)?;
        let mut file = handle.lock()?;

        let written = file.write(&bytes)?;
        if written != bytes.len() {
            return Err(FsError::ShortWrite {
                expected: bytes.len(),
                written,
            });
        }
        debug!(%fd, written, "write");
        Ok(written as u64)
    }

    pub fn open_count(&self) -> usize {
        self.table.len()
    }

    /// Close every outstanding descriptor. Returns how many were open.
    pub fn shutdown(&self) -> usize {
        let files = self.table.drain();
        let count = files.len();
        for (fd, file) in files {
            if let Err(err) = file.sync_all() {
                warn!(%fd, %err, "failed to flush file during shutdown");
            }
        }
        if count > 0 {
            debug!(count, "closed outstanding files");
        }
        count
    }
}

impl Drop for FileAccess {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn non_negative(value: i64, what: &str) -> FsResult<u64> {
    u64::try_from(value).map_err(|_| FsError::invalid_input(format!("negative {what}: {value}")))
}

