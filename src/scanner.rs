use crate::{
    error::{FaidxError, Malformation, Result},
    index_entry::first_token,
    FastaIndex, IndexEntry,
};
use log::debug;

/// A physical line of the reference, terminator included.
struct RawLine<'a> {
    bytes: &'a [u8],
}
impl<'a> RawLine<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Bytes consumed by the line, terminator included.
    fn width(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Line content with every `\r` and `\n` removed.
    fn content(&self) -> impl Iterator<Item = u8> + 'a {
        self.bytes
            .iter()
            .copied()
            .filter(|&b| b != b'\r' && b != b'\n')
    }

    fn residues(&self) -> u64 {
        self.content().count() as u64
    }

    fn lead(&self) -> Option<u8> {
        self.content().next()
    }

    /// Everything after the record marker of a header line.
    fn header_name(&self) -> String {
        let name: Vec<u8> = self.content().skip(1).collect();
        String::from_utf8_lossy(&name).into_owned()
    }
}

/// The record currently being accumulated by the scan.
struct OpenRecord {
    name: String,
    header_end: u64,
    length: u64,
    offset: Option<u64>,
    line_bases: u64,
    line_width: u64,
    mismatched: bool,
    empty_line: bool,
}
impl OpenRecord {
    fn new(name: String, header_end: u64) -> Self {
        Self {
            name,
            header_end,
            length: 0,
            offset: None,
            line_bases: 0,
            line_width: 0,
            mismatched: false,
            empty_line: false,
        }
    }

    /// Account for one residue line starting at byte `offset`.
    ///
    /// A width change is only allowed on the last line of a record, so it is
    /// flagged here and reported if another residue line follows.
    fn push_line(&mut self, line: &RawLine, offset: u64, line_number: u64) -> Result<()> {
        let residues = line.residues();
        let width = line.width();

        if self.offset.is_none() {
            if residues == 0 {
                return Ok(());
            }
            self.offset = Some(offset);
            self.line_bases = residues;
            self.line_width = width;
            self.length = residues;
            return Ok(());
        }

        self.length += residues;
        if self.mismatched || self.empty_line {
            if residues == 0 {
                self.empty_line = true;
            } else {
                let kind = if self.empty_line {
                    Malformation::EmbeddedNewline
                } else {
                    Malformation::MismatchedLineLengths
                };
                return Err(FaidxError::malformed_reference(kind, line_number, &self.name));
            }
        }
        if width != self.line_width {
            self.mismatched = true;
            if residues == 0 {
                self.empty_line = true;
            }
        }
        Ok(())
    }

    fn finish(self) -> IndexEntry {
        let entry = IndexEntry {
            length: self.length,
            offset: self.offset.unwrap_or(self.header_end),
            line_bases: self.line_bases,
            line_width: self.line_width,
            name: self.name,
        };
        debug!(
            "indexed {} ({} residues at offset {})",
            entry.key(),
            entry.length,
            entry.offset
        );
        entry
    }
}

/// Build an index from the full contents of a FASTA or FASTQ file in one pass.
pub(crate) fn scan(bytes: &[u8]) -> Result<FastaIndex> {
    let mut index = FastaIndex::new();
    let mut record: Option<OpenRecord> = None;
    let mut offset = 0u64;
    let mut line_number = 0u64;

    let mut lines = bytes.split_inclusive(|&b| b == b'\n').map(RawLine::new);
    while let Some(line) = lines.next() {
        line_number += 1;
        match line.lead() {
            Some(b';') => {}
            Some(b'+') => {
                // quality scores are not indexed, only stepped over
                offset += line.width();
                if let Some(quality) = lines.next() {
                    line_number += 1;
                    offset += quality.width();
                }
                continue;
            }
            Some(b'>') | Some(b'@') => {
                if let Some(done) = record.take() {
                    index.insert(done.finish());
                }
                let name = line.header_name();
                if first_token(&name).is_empty() {
                    return Err(FaidxError::malformed_reference(
                        Malformation::EmptyName,
                        line_number,
                        "<none>",
                    ));
                }
                record = Some(OpenRecord::new(name, offset + line.width()));
            }
            _ => match record.as_mut() {
                Some(open) => open.push_line(&line, offset, line_number)?,
                None if line.residues() == 0 => {}
                None => {
                    return Err(FaidxError::malformed_reference(
                        Malformation::OrphanSequence,
                        line_number,
                        "<none>",
                    ))
                }
            },
        }
        offset += line.width();
    }
    if let Some(done) = record.take() {
        index.insert(done.finish());
    }
    Ok(index)
}
