//! Terminal output shared by the console and the listener tasks.

use std::{
    io::{self, Write},
    sync::{Arc, Mutex, PoisonError},
};

/// Line-oriented writer shared between tasks.
///
/// Each call writes one complete line under the lock, so output from
/// concurrent listeners never interleaves mid-line.
pub struct SharedOutput<W> {
    inner: Arc<Mutex<W>>,
}

impl<W> Clone for SharedOutput<W> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<W: Write> SharedOutput<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { inner: Arc::new(Mutex::new(writer)) }
    }

    /// Write `text` followed by a newline.
    pub fn line(&self, text: &str) -> io::Result<()> {
        let mut writer = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{text}")?;
        writer.flush()
    }

    /// Write `text` without a newline and flush, for prompts.
    pub fn prompt(&self, text: &str) -> io::Result<()> {
        let mut writer = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        write!(writer, "{text}")?;
        writer.flush()
    }

    /// Run `f` against the underlying writer.
    pub fn with<T>(&self, f: impl FnOnce(&W) -> T) -> T {
        let writer = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&writer)
    }
}
