use crate::{
    error::{FaidxError, Result},
    scanner, IndexEntry,
};
use hashbrown::HashMap;
use log::{info, warn};
use memmap2::Mmap;
use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

/// Suffix appended to a reference path to name its sidecar index.
pub const INDEX_EXTENSION: &str = ".fai";

/// A FASTA index.
///
/// This struct builds a map of FASTA entry keys to their corresponding
/// `IndexEntry` structs, and keeps the keys in the order they were first
/// seen (file order for a scanned reference, line order for a loaded index).
#[derive(Debug, Clone, Default)]
pub struct FastaIndex {
    names: Vec<String>,
    entries: HashMap<String, IndexEntry>,
}
impl FastaIndex {
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            entries: HashMap::new(),
        }
    }

    /// Add an entry under its key. The first entry seen for a key wins.
    pub fn insert(&mut self, entry: IndexEntry) {
        let key = entry.key().to_string();
        if self.entries.contains_key(&key) {
            warn!("duplicate sequence name {}, keeping the first entry", key);
            return;
        }
        self.names.push(key.clone());
        self.entries.insert(key, entry);
    }

    /// Load a tab-delimited index from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::parse(reader, Path::new("<reader>"))
    }

    /// Load a tab-delimited index file.
    pub fn from_filepath<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| FaidxError::open(path, e))?;
        Self::parse(file, path)
    }

    fn parse<R: Read>(mut reader: R, path: &Path) -> Result<Self> {
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents)?;

        // the csv reader skips blank lines, which have no fields at all
        let blank = contents
            .split_inclusive(|&b| b == b'\n')
            .position(|line| line == b"\n" || line == b"\r\n");
        if let Some(n) = blank {
            return Err(FaidxError::MalformedIndex {
                path: path.to_path_buf(),
                line: n as u64 + 1,
                found: 0,
            });
        }

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(contents.as_slice());
        let mut index = Self::new();
        let mut record = csv::StringRecord::new();
        loop {
            let more = csv_reader
                .read_record(&mut record)
                .map_err(|source| FaidxError::IndexField {
                    path: path.to_path_buf(),
                    line: source.position().map_or(0, |p| p.line()),
                    source,
                })?;
            if !more {
                break;
            }
            let line = record.position().map_or(0, |p| p.line());
            if record.len() != 5 {
                return Err(FaidxError::MalformedIndex {
                    path: path.to_path_buf(),
                    line,
                    found: record.len(),
                });
            }
            let entry: IndexEntry =
                record
                    .deserialize(None)
                    .map_err(|source| FaidxError::IndexField {
                        path: path.to_path_buf(),
                        line,
                        source,
                    })?;
            index.insert(entry);
        }
        Ok(index)
    }

    /// Index a FASTA or FASTQ file by scanning it once.
    ///
    /// The file is memory-mapped for the scan, so it is never loaded into
    /// memory as a whole.
    pub fn build<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| FaidxError::open(path, e))?;
        if file.metadata()?.len() == 0 {
            return Ok(Self::new());
        }
        let mmap = unsafe { Mmap::map(&file)? };
        Self::scan(&mmap)
    }

    /// Index the in-memory contents of a FASTA or FASTQ file.
    pub fn scan(bytes: &[u8]) -> Result<Self> {
        scanner::scan(bytes)
    }

    /// Write the index as tab-delimited lines sorted by offset.
    ///
    /// Only the first token of each name is written.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(writer);
        for entry in self.sorted_by_offset() {
            csv_writer.serialize((
                entry.key(),
                entry.length,
                entry.offset,
                entry.line_bases,
                entry.line_width,
            ))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the index to a file, replacing it if it exists.
    pub fn write_filepath<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| FaidxError::open(path, e))?;
        self.to_writer(file)
    }

    /// Load the sidecar index of `reference` if present, otherwise build it
    /// and write it next to the reference.
    pub fn load_or_build<P: AsRef<Path>>(reference: P) -> Result<Self> {
        let reference = reference.as_ref();
        let sidecar = Self::sidecar_path(reference);
        if sidecar.exists() {
            return Self::from_filepath(&sidecar);
        }
        info!(
            "index file {} not found, generating...",
            sidecar.display()
        );
        let index = Self::build(reference)?;
        index.write_filepath(&sidecar)?;
        Ok(index)
    }

    /// The conventional sidecar path: the reference path with `.fai` appended.
    pub fn sidecar_path<P: AsRef<Path>>(reference: P) -> PathBuf {
        let mut path = reference.as_ref().as_os_str().to_owned();
        path.push(INDEX_EXTENSION);
        PathBuf::from(path)
    }

    fn sorted_by_offset(&self) -> Vec<&IndexEntry> {
        let mut sorted: Vec<&IndexEntry> = self.iter().collect();
        sorted.sort_by_key(|entry| entry.offset);
        sorted
    }

    pub fn get(&self, name: &str) -> Option<&IndexEntry> {
        self.entries.get(name)
    }

    /// Look up an entry by key.
    ///
    /// # Errors
    ///
    /// `FaidxError::NotFound` if no entry has this key.
    pub fn entry(&self, name: &str) -> Result<&IndexEntry> {
        self.get(name)
            .ok_or_else(|| FaidxError::NotFound(name.to_string()))
    }

    /// The full stored name of the entry keyed by `prefix`, for callers
    /// holding only the first token of a header.
    pub fn name_starting_with(&self, prefix: &str) -> Result<&str> {
        self.entry(prefix).map(|entry| entry.name.as_str())
    }

    /// Keys in first-seen order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> + '_ {
        self.names.iter().filter_map(|name| self.entries.get(name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
