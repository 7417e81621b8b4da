//! Line accumulation buffer for the serial source.
//!
//! Serial reads deliver arbitrary byte chunks: a single read may contain
//! several complete NMEA sentences, a fragment of one, or both.  [`LineBuffer`]
//! accumulates chunks and hands back one complete `\n`-terminated line at a
//! time, retaining any unterminated tail until a later chunk completes it.
//!
//! Lines are returned *verbatim*, terminator included — the bridge forwards
//! raw bytes and performs no normalization.

/// Accumulates raw source bytes and yields complete lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk of raw bytes read from the source.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Removes and returns the next complete line, terminator included.
    ///
    /// Returns `None` when the buffer holds no line terminator — whatever
    /// bytes remain are an incomplete line and stay buffered for the next
    /// readiness pass.
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let rest = self.buf.split_off(pos + 1);
        Some(std::mem::replace(&mut self.buf, rest))
    }

    /// Discards everything, including any partial line.
    ///
    /// Called when the transport is unavailable: buffered data for that
    /// readiness pass is dropped, never retried.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// `true` when nothing (not even a partial line) is buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of buffered bytes, complete or partial.
    pub fn len(&self) -> usize {
        self.buf.len()
    }
}

/// Returns `true` when `line` carries no content — only a terminator,
/// optionally preceded by a carriage return.
///
/// Empty lines are skipped by the drain loop: they are a no-op continuation,
/// not a forwarded write.
pub fn is_empty_line(line: &[u8]) -> bool {
    line.iter().all(|&b| b == b'\n' || b == b'\r')
}

// ── Tests ─────────────────────────────────────────────────────────────────────
