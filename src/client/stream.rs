//! Lazy consumption of streamed response bodies.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use reqwest::blocking::Response;

use super::response::check_status;
use crate::error::Result;

const CHUNK_SIZE: usize = 8 * 1024;

/// Text chunks of a streamed body, in arrival order.
///
/// Each item is the decodable UTF-8 prefix of what has arrived so far; a
/// character split across reads is held back until its remaining bytes
/// arrive. The stream ends on EOF, on a read error (connection drop or
/// timeout) and when the caller drops it.
pub struct LogStream {
    reader: Box<dyn Read + Send>,
    buf: Vec<u8>,
    pending: Vec<u8>,
    done: bool,
}

impl LogStream {
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            buf: vec![0; CHUNK_SIZE],
            pending: Vec::new(),
            done: false,
        }
    }

    /// Start streaming a response after its status check.
    pub fn from_response(response: Response) -> Result<Self> {
        Ok(Self::new(check_status(response)?))
    }

    fn take_pending(&mut self, len: usize) -> String {
        let bytes: Vec<u8> = self.pending.drain(..len).collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl fmt::Debug for LogStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogStream")
            .field("pending", &self.pending.len())
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl Iterator for LogStream {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if self.done {
                if self.pending.is_empty() {
                    return None;
                }
                let len = self.pending.len();
                return Some(self.take_pending(len));
            }
            match self.reader.read(&mut self.buf) {
                Ok(0) => self.done = true,
                Ok(n) => {
                    self.pending.extend_from_slice(&self.buf[..n]);
                    let len = decodable_len(&self.pending);
                    if len > 0 {
                        return Some(self.take_pending(len));
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::trace!("log stream ended: {e}");
                    self.done = true;
                }
            }
        }
    }
}

/// Bytes that can be emitted now: the valid prefix, plus any invalid
/// sequence (emitted lossily), minus an incomplete trailing character.
fn decodable_len(bytes: &[u8]) -> usize {
    match std::str::from_utf8(bytes) {
        Ok(_) => bytes.len(),
        Err(e) => match e.error_len() {
            Some(bad) => e.valid_up_to() + bad,
            None => e.valid_up_to(),
        },
    }
}

/// Copy a streamed response body to `path`, creating parent directories.
/// Returns the number of bytes written. A partial file is removed when the
/// copy fails.
pub fn stream_to_file(response: Response, path: &Path) -> Result<u64> {
    let response = check_status(response)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    copy_to_file(response, path)
}

fn copy_to_file(mut reader: impl Read, path: &Path) -> Result<u64> {
    let copied = File::create(path).and_then(|file| {
        let mut writer = BufWriter::new(file);
        let written = io::copy(&mut reader, &mut writer)?;
        writer.flush()?;
        Ok(written)
    });
    match copied {
        Ok(written) => Ok(written),
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(path) {
                if cleanup.kind() != ErrorKind::NotFound {
                    tracing::warn!("Failed to remove partial file {}: {cleanup}", path.display());
                }
            }
            Err(e.into())
        }
    }
}
