use std::io::{BufRead, BufReader, Read};

use flate2::read::MultiGzDecoder;
use tracing::{debug, instrument};

use crate::catalog::Book;
use crate::error::{Result, VerseError};
use crate::provider::CorpusProvider;

pub type BookReader = BufReader<MultiGzDecoder<Box<dyn Read + Send>>>;

/// One record of a book: the leading verse token and the rest of the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseLine {
    pub token: String,
    pub text: String,
}

impl VerseLine {
    /// Splits on the first whitespace; a line without any keeps an empty
    /// token and the whole line as text.
    pub fn parse(line: &str) -> Self {
        match line.split_once(char::is_whitespace) {
            Some((token, text)) => Self {
                token: token.to_string(),
                text: text.to_string(),
            },
            None => Self {
                token: String::new(),
                text: line.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractState {
    Skipping(usize),
    Streaming,
    Closed,
}

/// Forward-only reader over the records of one book, starting at a chosen
/// line. Consuming it again requires a fresh [`extract`].
pub struct VerseReader<R = BookReader> {
    resource: String,
    reader: Option<R>,
    state: ExtractState,
    buf: Vec<u8>,
}

/// Opens `book`, validates the gzip header and positions the reader so the
/// first yielded record is line `offset` (1-based).
#[instrument(skip(provider, book), fields(book = %book.name, resource = %book.resource))]
pub fn extract(provider: &dyn CorpusProvider, book: &Book, offset: usize) -> Result<VerseReader> {
    let raw = provider
        .open(&book.resource)
        .map_err(|source| VerseError::ContentOpen {
            resource: book.resource.clone(),
            source,
        })?;
    let mut reader = BufReader::new(MultiGzDecoder::new(raw));
    reader
        .fill_buf()
        .map_err(|source| VerseError::Decompression {
            resource: book.resource.clone(),
            source,
        })?;
    Ok(VerseReader::new(book.resource.clone(), reader, offset))
}

impl<R: BufRead> VerseReader<R> {
    pub fn new(resource: impl Into<String>, reader: R, offset: usize) -> Self {
        Self {
            resource: resource.into(),
            reader: Some(reader),
            state: ExtractState::Skipping(offset.saturating_sub(1)),
            buf: Vec::new(),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn is_closed(&self) -> bool {
        self.state == ExtractState::Closed
    }

    /// Releases the underlying stream; further reads yield nothing.
    pub fn close(&mut self) {
        self.state = ExtractState::Closed;
        self.reader = None;
    }

    fn read_record(&mut self) -> Result<bool> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(false);
        };
        self.buf.clear();
        let read = reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| VerseError::Decompression {
                resource: self.resource.clone(),
                source,
            })?;
        Ok(read > 0)
    }

    fn skip(&mut self, mut remaining: usize) -> Result<bool> {
        while remaining > 0 {
            if !self.read_record()? {
                debug!(
                    resource = %self.resource,
                    remaining,
                    "content ended before requested line"
                );
                return Ok(false);
            }
            remaining -= 1;
            self.state = ExtractState::Skipping(remaining);
        }
        Ok(true)
    }

    fn current_line(&self) -> VerseLine {
        let mut end = self.buf.len();
        if self.buf[..end].ends_with(b"\n") {
            end -= 1;
        }
        if self.buf[..end].ends_with(b"\r") {
            end -= 1;
        }
        VerseLine::parse(&String::from_utf8_lossy(&self.buf[..end]))
    }
}

impl<R: BufRead> Iterator for VerseReader<R> {
    type Item = Result<VerseLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                ExtractState::Closed => return None,
                ExtractState::Skipping(remaining) => match self.skip(remaining) {
                    Ok(true) => self.state = ExtractState::Streaming,
                    Ok(false) => {
                        self.close();
                        return None;
                    }
                    Err(err) => {
                        self.close();
                        return Some(Err(err));
                    }
                },
                ExtractState::Streaming => {
                    return match self.read_record() {
                        Ok(true) => Some(Ok(self.current_line())),
                        Ok(false) => {
                            self.close();
                            None
                        }
                        Err(err) => {
                            self.close();
                            Some(Err(err))
                        }
                    };
                }
            }
        }
    }
}
