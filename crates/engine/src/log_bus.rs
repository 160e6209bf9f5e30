// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job log fan-out: every byte chunk the executor produces is appended
//! to `job.log` and broadcast to zero-or-more live subscribers.
//!
//! The file write is the authoritative record: it happens first and
//! synchronously, so a lagging or absent subscriber never loses data that
//! made it to disk. Subscriber delivery rides on `tokio::sync::broadcast`,
//! whose fixed-capacity ring naturally gives drop-oldest-per-subscriber
//! behavior — a subscriber that falls behind gets `RecvError::Lagged`
//! instead of blocking the writer or every other subscriber.

use grove_core::Error;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;

const SUBSCRIBER_BUFFER: usize = 1024;

/// Owns one job's `job.log` file and fans every appended chunk out to
/// subscribers. Cheap to clone; clones share the same file handle and
/// broadcast channel.
#[derive(Clone)]
pub struct LogBus {
    path: PathBuf,
    file: Arc<Mutex<File>>,
    tx: broadcast::Sender<Vec<u8>>,
}

impl LogBus {
    /// Opens (creating if needed) `path` for append and wires up the
    /// broadcast channel. Parent directories must already exist.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;
        let (tx, _rx) = broadcast::channel(SUBSCRIBER_BUFFER);
        Ok(Self { path, file: Arc::new(Mutex::new(file)), tx })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one chunk: file write first (authoritative), then fan-out.
    /// A send with no subscribers is a no-op, not an error.
    pub fn append(&self, chunk: &[u8]) -> Result<(), Error> {
        self.file.lock().write_all(chunk).map_err(|e| Error::io(&self.path, e))?;
        let _ = self.tx.send(chunk.to_vec());
        Ok(())
    }

    /// Attaches a new live subscriber. Detaching is just dropping the
    /// receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<u8>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
#[path = "log_bus_tests.rs"]
mod tests;
