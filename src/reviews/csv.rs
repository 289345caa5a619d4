//! Line-oriented CSV reading for the review file.

use super::{build_document, Document};
use crate::error::{ContrailError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, instrument};

/// One parsed data row with its zero-based index (header excluded).
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub row_index: usize,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InQuoted,
}

/// Split one CSV line into fields.
///
/// Quotes toggle the quoted state and are never emitted; commas inside a
/// quoted span are kept literally. A doubled quote flips the state twice and
/// contributes nothing. Total over all inputs.
pub fn parse_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut state = ScanState::Normal;

    for c in line.chars() {
        match (state, c) {
            (ScanState::Normal, '"') => state = ScanState::InQuoted,
            (ScanState::InQuoted, '"') => state = ScanState::Normal,
            (ScanState::Normal, ',') => fields.push(std::mem::take(&mut current)),
            (_, c) => current.push(c),
        }
    }

    fields.push(current);
    fields
}

/// Iterator over the data rows of a review file.
///
/// The first line is treated as a header and skipped. Rows are parsed
/// lazily, so a consumer that stops early never reads the remainder.
/// Bytes that are not valid UTF-8 are replaced with U+FFFD.
pub struct ReviewReader<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    header_skipped: bool,
    next_index: usize,
}

impl<R: BufRead> ReviewReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            header_skipped: false,
            next_index: 0,
        }
    }

    fn next_line(&mut self) -> Option<Result<String>> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.ends_with(b"\n") {
                    self.buf.pop();
                    if self.buf.ends_with(b"\r") {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e.into())),
        }
    }
}

impl ReviewReader<BufReader<File>> {
    /// Open a review file on disk.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                ContrailError::InputMissing(format!("CSV file not found: {}", path.display()))
            }
            _ => ContrailError::Io(e),
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for ReviewReader<R> {
    type Item = Result<ReviewRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.header_skipped {
            self.header_skipped = true;
            if let Err(e) = self.next_line()? {
                return Some(Err(e));
            }
        }

        let line = match self.next_line()? {
            Ok(line) => line,
            Err(e) => return Some(Err(e)),
        };

        let row = ReviewRow {
            row_index: self.next_index,
            fields: parse_row(&line),
        };
        self.next_index += 1;
        Some(Ok(row))
    }
}

/// Read rows and project them into documents.
///
/// With a `limit`, reading stops as soon as that many documents have been
/// accepted; lines after that point are not read.
#[instrument(skip(rows))]
pub fn read_documents<I>(rows: I, limit: Option<usize>) -> Result<Vec<Document>>
where
    I: IntoIterator<Item = Result<ReviewRow>>,
{
    let mut documents = Vec::new();
    let mut dropped = 0usize;
    let mut rows = rows.into_iter();

    loop {
        if limit.is_some_and(|l| documents.len() >= l) {
            break;
        }

        let Some(row) = rows.next() else {
            break;
        };
        let row = row?;

        match build_document(&row.fields, row.row_index) {
            Some(doc) => {
                documents.push(doc);
                if documents.len() % 50 == 0 {
                    info!("Processing row {}...", documents.len());
                }
            }
            None => {
                debug!(
                    row_index = row.row_index,
                    fields = row.fields.len(),
                    "Dropped malformed row"
                );
                dropped += 1;
            }
        }
    }

    info!("Read {} documents ({} rows dropped)", documents.len(), dropped);
    Ok(documents)
}
