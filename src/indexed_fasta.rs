use crate::{
    error::{FaidxError, Result},
    FastaIndex, IndexEntry, Region,
};
use log::debug;
use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
};

/// An indexed FASTA file.
///
/// This struct is used to query a FASTA (or FASTQ) file by name and position.
/// It keeps the file open and seeks to the byte range of each request, so the
/// file is never loaded into memory as a whole.
/// It requires a `FastaIndex`, either loaded from a sidecar or built by a scan.
///
/// Each query performs its own seek, so an `IndexedFasta` must not be shared
/// between callers without synchronisation; give each reader its own instance
/// (the index itself can be cloned freely).
///
/// # Examples
///
/// ```
/// use faifetch::{FastaIndex, IndexedFasta};
///
/// let index = FastaIndex::from_filepath("example_data/example.fa.fai")
///     .expect("Could not read index file");
/// let mut faidx = IndexedFasta::new(index, "example_data/example.fa")
///     .expect("Could not read FASTA file");
///
/// // The first 10 bases of chr1
/// let seq = faidx.subsequence("chr1", 0, 10).unwrap();
/// assert_eq!(seq, b"ACCTACGATC");
/// ```
#[derive(Debug)]
pub struct IndexedFasta<R = File> {
    index: FastaIndex,
    reader: R,
    buffer: Vec<u8>,
}
impl IndexedFasta<File> {
    /// Create a new `IndexedFasta` from a `FastaIndex` and a file path.
    pub fn new<P: AsRef<Path>>(index: FastaIndex, path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| FaidxError::open(path, e))?;
        Ok(Self::from_reader(index, file))
    }

    /// Open a FASTA file, loading its `.fai` sidecar or generating and
    /// writing one first if it does not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| FaidxError::open(path, e))?;
        let index = FastaIndex::load_or_build(path)?;
        Ok(Self::from_reader(index, file))
    }
}
impl<R: Read + Seek> IndexedFasta<R> {
    /// Create a new `IndexedFasta` over any seekable reader.
    pub fn from_reader(index: FastaIndex, reader: R) -> Self {
        Self {
            index,
            reader,
            buffer: Vec::new(),
        }
    }

    pub fn index(&self) -> &FastaIndex {
        &self.index
    }

    /// The number of residues in the named sequence.
    pub fn sequence_length(&self, name: &str) -> Result<u64> {
        Ok(self.index.entry(name)?.length)
    }

    /// Fetch a whole sequence.
    ///
    /// The sequence is returned as a `&[u8]` slice of the internal buffer with
    /// all `\r`, `\n` and NUL bytes removed.
    ///
    /// # Errors
    ///
    /// - Error if `name` is not found in the index.
    /// - Error if the file cannot be read.
    pub fn sequence(&mut self, name: &str) -> Result<&[u8]> {
        let entry = self.index.entry(name)?;
        let span = QuerySpan::whole(entry);
        self.read_span(span)
    }

    /// Fetch `length` residues starting at the 0-based position `start`.
    ///
    /// The length is clamped to the end of the sequence. A negative `start`
    /// or a range that is empty after clamping returns an empty slice rather
    /// than an error.
    ///
    /// # Errors
    ///
    /// - Error if `name` is not found in the index.
    /// - Error if the file cannot be read.
    pub fn subsequence(&mut self, name: &str, start: i64, length: i64) -> Result<&[u8]> {
        let entry = self.index.entry(name)?;
        match QuerySpan::new(entry, start, length) {
            Some(span) => self.read_span(span),
            None => {
                self.buffer.clear();
                Ok(&self.buffer)
            }
        }
    }

    /// Fetch the residues covered by a parsed region.
    ///
    /// A region without positions is the whole sequence; otherwise its 1-based
    /// inclusive bounds are converted to a 0-based start and a length.
    pub fn region(&mut self, region: &Region) -> Result<&[u8]> {
        match (region.start, region.length()) {
            (Some(start), Some(length)) => {
                self.subsequence(&region.name, start.saturating_sub(1), length)
            }
            _ => self.sequence(&region.name),
        }
    }

    /// Fetch using a textual region such as `chr1`, `chr1:5` or `chr1:5-10`.
    pub fn query(&mut self, region: &str) -> Result<&[u8]> {
        let region: Region = region.parse()?;
        self.region(&region)
    }

    /// Seek to the span, read it, and strip line structure.
    ///
    /// A read that reaches end of file early yields whatever was read.
    fn read_span(&mut self, span: QuerySpan) -> Result<&[u8]> {
        debug!("reading {} bytes at offset {}", span.size, span.pos);
        self.buffer.clear();
        self.reader.seek(SeekFrom::Start(span.pos))?;
        self.reader
            .by_ref()
            .take(span.size)
            .read_to_end(&mut self.buffer)?;
        self.buffer.retain(|&c| c != b'\r' && c != b'\n' && c != b'\0');
        Ok(&self.buffer)
    }
}

/// A query span.
///
/// The byte position and size of a request in the FASTA file, including the
/// line terminators embedded in the requested residues.
#[derive(Debug, PartialEq, Eq)]
struct QuerySpan {
    pos: u64,
    size: u64,
}
impl QuerySpan {
    fn whole(entry: &IndexEntry) -> Self {
        Self {
            pos: entry.offset,
            size: entry.byte_span(),
        }
    }

    /// The span of `length` residues from the 0-based `start`, or `None`
    /// when nothing remains after clamping to the sequence end.
    fn new(entry: &IndexEntry, start: i64, length: i64) -> Option<Self> {
        if start < 0 {
            return None;
        }
        let remaining = i64::try_from(entry.length).unwrap_or(i64::MAX) - start;
        let length = length.min(remaining);
        if length < 1 {
            return None;
        }
        let (start, length) = (start as u64, length as u64);
        let line_bases = entry.line_bases.max(1);
        let terminator = entry.terminator_width();

        // a start on the first residue of a line reads the preceding
        // terminator, which is stripped with the rest
        let newlines_before = if start > 0 {
            (start - 1) / line_bases
        } else {
            0
        };
        let newlines_by_end = (start + length - 1) / line_bases;
        let newlines_inside = newlines_by_end - newlines_before;
        Some(Self {
            pos: entry.offset + newlines_before * terminator + start,
            size: length + newlines_inside * terminator,
        })
    }
}
