//! Descriptor table for open files.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

use crate::error::{FsError, FsResult};

/// Opaque integer identifying one open file to the host.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Descriptor(u64);

impl Descriptor {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Shared slot for one open file.
///
/// The slot is emptied on release, so a caller that looked the handle up
/// before a concurrent `close` sees `HandleNotFound` rather than a stale file.
#[derive(Clone)]
pub struct FileHandle {
    descriptor: Descriptor,
    file: Arc<Mutex<Option<File>>>,
}

impl FileHandle {
    /// Lock the file for the duration of one OS call.
    pub fn lock(&self) -> FsResult<MappedMutexGuard<'_, File>> {
        MutexGuard::try_map(self.file.lock(), Option::as_mut)
            .map_err(|_| FsError::HandleNotFound(self.descriptor))
    }
}

pub struct HandleTable {
    next: AtomicU64,
    entries: Mutex<HashMap<Descriptor, FileHandle>>,
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleTable {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Take ownership of `file` and issue a fresh descriptor for it.
    ///
    /// Descriptors come from a counter and are never reissued.
    pub fn allocate(&self, file: File) -> Descriptor {
        let descriptor = Descriptor(self.next.fetch_add(1, Ordering::Relaxed));
        let handle = FileHandle {
            descriptor,
            file: Arc::new(Mutex::new(Some(file))),
        };
        self.entries.lock().insert(descriptor, handle);
        descriptor
    }

    pub fn lookup(&self, descriptor: Descriptor) -> FsResult<FileHandle> {
        self.entries
            .lock()
            .get(&descriptor)
            .cloned()
            .ok_or(FsError::HandleNotFound(descriptor))
    }

    /// Remove the entry and hand back the file for closing.
    ///
    /// Waits for any in-flight call on the same descriptor to finish.
    pub fn release(&self, descriptor: Descriptor) -> FsResult<File> {
        let handle = self
            .entries
            .lock()
            .remove(&descriptor)
            .ok_or(FsError::HandleNotFound(descriptor))?;
        let file = handle.file.lock().take();
        file.ok_or(FsError::HandleNotFound(descriptor))
    }

    /// Remove every entry, returning the files that were still open.
    pub fn drain(&self) -> Vec<(Descriptor, File)> {
        let handles: Vec<FileHandle> = self.entries.lock().drain().map(|(_, h)| h).collect();
        handles
            .into_iter()
            .filter_map(|h| h.file.lock().take().map(|f| (h.descriptor, f)))
            .collect()
    }

    pub fn contains(&self, descriptor: Descriptor) -> bool {
        self.entries.lock().contains_key(&descriptor)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
