//! Streaming manifest reader

use super::entry::IndexEntry;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::Path;

/// Lazy, single-pass sequence of entries from a manifest.
///
/// Lines that do not match the grammar, including lines that are not valid
/// UTF-8, are skipped. Other read errors end the sequence with an `Err`.
pub struct ManifestReader<R> {
    lines: Lines<R>,
    line_number: usize,
}

impl ManifestReader<BufReader<File>> {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ManifestReader<R> {
    pub fn new(reader: R) -> Self {
        ManifestReader {
            lines: reader.lines(),
            line_number: 0,
        }
    }

    /// 1-based number of the last line read
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> Iterator for ManifestReader<R> {
    type Item = io::Result<IndexEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    self.line_number += 1;
                    continue;
                }
                Err(e) => return Some(Err(e)),
            };
            self.line_number += 1;

            if let Some(entry) = IndexEntry::parse(&line) {
                return Some(Ok(entry));
            }
        }
    }
}
