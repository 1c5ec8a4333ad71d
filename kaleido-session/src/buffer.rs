//! Working buffer for reply reassembly

use std::str;

/// Text received since the last fully resolved reply
///
/// Chunks may split a multi-byte character; the undecoded tail is held back
/// until the rest of it arrives.
#[derive(Debug)]
pub struct WorkingBuffer {
    text: String,
    partial: Vec<u8>,
    max_len: usize,
}

impl WorkingBuffer {
    pub fn new(max_len: usize) -> Self {
        Self {
            text: String::new(),
            partial: Vec::new(),
            max_len,
        }
    }

    /// Append a raw chunk from the transport
    pub fn push(&mut self, chunk: &[u8]) {
        self.partial.extend_from_slice(chunk);

        loop {
            match str::from_utf8(&self.partial) {
                Ok(text) => {
                    self.text.push_str(text);
                    self.partial.clear();
                    return;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    // The prefix is valid, so nothing is substituted here
                    self.text
                        .push_str(&String::from_utf8_lossy(&self.partial[..valid]));
                    match e.error_len() {
                        // Truncated sequence at the end: wait for more bytes
                        None => {
                            self.partial.drain(..valid);
                            return;
                        }
                        Some(bad) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            self.partial.drain(..valid + bad);
                        }
                    }
                }
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Drop the first `len` bytes of decoded text
    pub fn consume(&mut self, len: usize) {
        let len = len.min(self.text.len());
        self.text.drain(..len);
        if self.text.trim().is_empty() {
            self.text.clear();
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.partial.clear();
    }

    /// Whether nothing but whitespace is buffered
    pub fn is_blank(&self) -> bool {
        self.partial.is_empty() && self.text.trim().is_empty()
    }

    pub fn len(&self) -> usize {
        self.text.len() + self.partial.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the buffer has grown past its bound
    pub fn is_over_limit(&self) -> bool {
        self.len() > self.max_len
    }
}
