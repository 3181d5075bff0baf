//! # faifetch
//!
//! `faifetch` is a library for random access to sequences in FASTA and
//! FASTQ files using the FAI index format. It fetches whole sequences or
//! subsequences without loading the file into memory.
//!
//! It has two halves:
//!
//! - [`FastaIndex`] maps each sequence name to the byte offset of its first
//!   residue, its length, and its line geometry. It is built by scanning the
//!   reference once, or loaded from a `.fai` sidecar, and can be written back
//!   out in the same format.
//! - [`IndexedFasta`] keeps the reference open and turns each request into a
//!   single seek and read of exactly the bytes covering it, then strips the
//!   line terminators.
//!
//! ## Line geometry
//!
//! Random access only works if every line of a sequence but the last has the
//! same width. The scan checks this and fails with
//! [`FaidxError::MalformedReference`] rather than produce an index that would
//! return wrong residues. Both `\n` and `\r\n` terminators are supported.
//!
//! ## Example
//!
//! Here is an example fasta file:
//!
//! ### example.fa
//!
//! ```text
//! >chr1
//! ACCTACGATCGACTGATCGTAGCTAGCT
//! CATCGATCGTACGGACGATCGATCGGTT
//! CACACCGGGCATGACTGATCGGGGGCCC
//! ACGTGTGTGCAGCGCGCGGCGCGCGCGG
//! >chr2
//! TTTTGATCGATCGGCGGGCGCGCGCGGC
//! CAGATTCGGGCGCGATTATATATTAGCT
//! CGACGGCGACTCGAGCTACACGTCGGGC
//! GCGAGCGGGACGCGCGGCGCGCGCGGCC
//! AAAAAAATTTTTATATATTATTACGCGC
//! CGACTCAGTCGACTGGGGGCGCGCGCGC
//! AAACCACA
//! ```
//!
//! and its corresponding index file:
//!
//! ### example.fa.fai
//!
//! ```text
//! chr1	112	6	28	29
//! chr2	176	128	28	29
//! ```
//!
//! ### Querying the FASTA file
//!
//! The fetched residues are returned as a `&[u8]` borrowed from an internal
//! buffer that is reused between queries, so queries take `&mut self`.
//!
//! ```rust
//! use faifetch::{FastaIndex, IndexedFasta};
//!
//! let index = FastaIndex::from_filepath("example_data/example.fa.fai")
//!     .expect("Could not read index file");
//! let mut faidx = IndexedFasta::new(index, "example_data/example.fa")
//!     .expect("Could not read FASTA file");
//!
//! // 0-based start and a length
//! let seq = faidx.subsequence("chr2", 0, 10).unwrap();
//! assert_eq!(seq, b"TTTTGATCGA");
//!
//! // 1-based inclusive regions, as on the command line
//! let seq = faidx.query("chr1:21-30").unwrap();
//! assert_eq!(seq, b"AGCTAGCTCA");
//!
//! // The whole sequence, without newlines
//! let seq = faidx.sequence("chr1").unwrap();
//! assert_eq!(seq.len(), 112);
//! assert!(!seq.contains(&b'\n'));
//! ```
//!
//! ### Building an index
//!
//! ```no_run
//! use faifetch::FastaIndex;
//!
//! let index = FastaIndex::build("genome.fa").expect("Could not index FASTA file");
//! index
//!     .write_filepath(FastaIndex::sidecar_path("genome.fa"))
//!     .expect("Could not write index file");
//! ```
//!
//! [`IndexedFasta::open`] does both steps when the sidecar is missing.

mod entropy;
mod error;
mod fasta_index;
mod index_entry;
mod indexed_fasta;
mod region;
mod scanner;

/// Shannon entropy of a fetched buffer.
pub use entropy::{shannon_entropy, Entropy};

/// Errors returned by index and query operations.
pub use error::{FaidxError, Malformation, Result};

/// The `FastaIndex` struct represents a FAI index.
pub use fasta_index::{FastaIndex, INDEX_EXTENSION};

/// The `IndexEntry` struct represents a single entry in a FAI index.
pub use index_entry::IndexEntry;

/// The `IndexedFasta` struct represents a FASTA file that has been indexed
/// using the FAI format.
pub use indexed_fasta::IndexedFasta;

/// The `Region` struct represents a parsed `name:start-stop` request.
pub use region::Region;

#[cfg(test)]
mod testing {
    use crate::{FaidxError, FastaIndex, IndexEntry, IndexedFasta, Region};
    use anyhow::Result;
    use std::io::Cursor;

    const TEST_FASTA: &str = "example_data/example.fa";
    const TEST_FASTA_INDEX: &str = "example_data/example.fa.fai";

    fn example() -> Result<IndexedFasta> {
        let index = FastaIndex::from_filepath(TEST_FASTA_INDEX)?;
        Ok(IndexedFasta::new(index, TEST_FASTA)?)
    }

    /// An irregular residue pattern, so misplaced reads show up.
    fn residues(n: usize) -> Vec<u8> {
        (0..n).map(|i| b"ACGT"[(i * i + i / 7) % 4]).collect()
    }

    fn wrapped(name: &str, residues: &[u8], width: usize, eol: &str) -> Vec<u8> {
        let mut out = format!(">{}{}", name, eol).into_bytes();
        for line in residues.chunks(width) {
            out.extend_from_slice(line);
            out.extend_from_slice(eol.as_bytes());
        }
        out
    }

    fn in_memory(fasta: Vec<u8>) -> Result<IndexedFasta<Cursor<Vec<u8>>>> {
        let index = FastaIndex::scan(&fasta)?;
        Ok(IndexedFasta::from_reader(index, Cursor::new(fasta)))
    }

    #[test]
    fn standard_usage() -> Result<()> {
        let mut faidx = example()?;
        let seq = faidx.subsequence("chr1", 0, 10)?;
        assert_eq!(seq, b"ACCTACGATC");
        let seq = faidx.subsequence("chr2", 0, 10)?;
        assert_eq!(seq, b"TTTTGATCGA");
        Ok(())
    }

    #[test]
    fn interval_over_newline() -> Result<()> {
        let mut faidx = example()?;
        let seq = faidx.subsequence("chr1", 20, 10)?;
        assert_eq!(seq, b"AGCTAGCTCA");
        let seq = faidx.subsequence("chr2", 20, 10)?;
        assert_eq!(seq, b"CGCGCGGCCA");
        Ok(())
    }

    #[test]
    fn whole_sequence() -> Result<()> {
        let mut faidx = example()?;
        let seq = faidx.sequence("chr2")?;
        assert_eq!(seq.len(), 176);
        assert!(seq.starts_with(b"TTTTGATCGATCGGCGGGCGCGCGCGGCCAGATT"));
        assert!(seq.ends_with(b"CGCGCAAACCACA"));
        assert_eq!(faidx.sequence_length("chr2")?, 176);
        Ok(())
    }

    #[test]
    fn region_queries() -> Result<()> {
        let mut faidx = example()?;
        let dash = faidx.query("chr2:21-30")?.to_vec();
        let dots = faidx.query("chr2:21..30")?.to_vec();
        assert_eq!(dash, dots);
        assert_eq!(dash, b"CGCGCGGCCA");
        assert_eq!(faidx.query("chr2:1")?, b"T");
        assert_eq!(faidx.query("chr1")?.len(), 112);
        let region = Region::span("chr1", 1, 4);
        assert_eq!(faidx.region(&region)?, b"ACCT");
        Ok(())
    }

    #[test]
    fn interval_overextend_right_is_clamped() -> Result<()> {
        let mut faidx = example()?;
        let seq = faidx.subsequence("chr1", 100, 50)?;
        assert_eq!(seq, b"CGGCGCGCGCGG");
        Ok(())
    }

    #[test]
    fn empty_intervals() -> Result<()> {
        let mut faidx = example()?;
        assert!(faidx.subsequence("chr1", -1, 5)?.is_empty());
        assert!(faidx.subsequence("chr1", 112, 5)?.is_empty());
        assert!(faidx.subsequence("chr1", 130, 150)?.is_empty());
        assert!(faidx.subsequence("chr1", 10, 0)?.is_empty());
        assert!(faidx.query("chr1:0")?.is_empty());
        Ok(())
    }

    #[test]
    fn extreme_coordinates_do_not_panic() -> Result<()> {
        let mut faidx = example()?;
        assert!(faidx.subsequence("chr1", i64::MIN, 5)?.is_empty());
        assert!(faidx.subsequence("chr1", i64::MAX, i64::MAX)?.is_empty());
        assert!(faidx.query("chr1:0-9223372036854775807")?.is_empty());
        assert_eq!(faidx.query("chr1:1-9223372036854775807")?.len(), 112);
        let region = Region::span("chr1", i64::MIN, 4);
        assert!(faidx.region(&region)?.is_empty());
        Ok(())
    }

    #[test]
    fn missing_chr() -> Result<()> {
        let mut faidx = example()?;
        let err = faidx.subsequence("chr3", 0, 10).unwrap_err();
        assert!(matches!(err, FaidxError::NotFound(_)));
        assert!(faidx.sequence("chr3").is_err());
        assert!(faidx.query("chr3:1-5").is_err());
        Ok(())
    }

    #[test]
    fn wrapped_sequence_properties() -> Result<()> {
        let seq = residues(130);
        let mut faidx = in_memory(wrapped("chr1", &seq, 60, "\n"))?;

        assert_eq!(faidx.sequence("chr1")?, seq.as_slice());
        // residues 60-64, 1-based, across the first line break
        assert_eq!(faidx.subsequence("chr1", 59, 5)?, &seq[59..64]);
        assert_eq!(faidx.subsequence("chr1", 125, 100)?, &seq[125..130]);
        assert!(faidx.subsequence("chr1", -1, 5)?.is_empty());

        let dash = faidx.query("chr1:10-20")?.to_vec();
        let dots = faidx.query("chr1:10..20")?.to_vec();
        assert_eq!(dash, dots);
        assert_eq!(dash, &seq[9..20]);
        Ok(())
    }

    #[test]
    fn every_subsequence_of_wrapped_sequence() -> Result<()> {
        let seq = residues(47);
        for eol in ["\n", "\r\n"] {
            let mut faidx = in_memory(wrapped("s", &seq, 10, eol))?;
            for start in 0..seq.len() {
                for end in start + 1..=seq.len() {
                    let got = faidx.subsequence("s", start as i64, (end - start) as i64)?;
                    assert_eq!(got, &seq[start..end], "{start}..{end} with {eol:?}");
                }
            }
            assert_eq!(faidx.sequence("s")?, seq.as_slice());
        }
        Ok(())
    }

    #[test]
    fn fastq_records() -> Result<()> {
        let fastq = b"@read1 lane 1\nACGTAC\n+\n@IIIII\n@read2\nGGA\n+read2\n!!!\n".to_vec();
        let mut faidx = in_memory(fastq)?;
        assert_eq!(faidx.sequence("read1")?, b"ACGTAC");
        assert_eq!(faidx.sequence("read2")?, b"GGA");
        assert_eq!(faidx.query("read1:2-3")?, b"CG");
        Ok(())
    }

    #[test]
    fn short_read_at_end_of_file_is_truncated() -> Result<()> {
        let fasta = b">chr1\nACGT\nAC".to_vec();
        let mut index = FastaIndex::new();
        // a stale index claiming more residues than the file holds
        index.insert(IndexEntry {
            name: "chr1".to_string(),
            length: 20,
            offset: 6,
            line_bases: 4,
            line_width: 5,
        });
        let mut faidx = IndexedFasta::from_reader(index, Cursor::new(fasta));
        assert_eq!(faidx.sequence("chr1")?, b"ACGTAC");
        assert_eq!(faidx.subsequence("chr1", 3, 10)?, b"TAC");
        assert!(faidx.subsequence("chr1", 15, 2)?.is_empty());
        Ok(())
    }

    #[test]
    fn open_generates_and_reuses_sidecar() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let reference = dir.path().join("ref.fa");
        let seq = residues(130);
        let mut fasta = wrapped("chr1 extra annotation text", &seq, 60, "\n");
        fasta.extend(wrapped("chr2", b"TTTTAAAA", 60, "\n"));
        std::fs::write(&reference, &fasta)?;

        let mut faidx = IndexedFasta::open(&reference)?;
        assert_eq!(faidx.subsequence("chr1", 59, 5)?, &seq[59..64]);
        assert_eq!(
            faidx.index().name_starting_with("chr1")?,
            "chr1 extra annotation text"
        );

        let sidecar = FastaIndex::sidecar_path(&reference);
        let written = std::fs::read_to_string(&sidecar)?;
        assert_eq!(written, "chr1\t130\t28\t60\t61\nchr2\t8\t167\t8\t9\n");

        let mut reopened = IndexedFasta::open(&reference)?;
        assert_eq!(reopened.sequence("chr2")?, b"TTTTAAAA");
        assert_eq!(reopened.index().name_starting_with("chr1")?, "chr1");
        Ok(())
    }

    #[test]
    fn open_missing_reference() {
        let err = IndexedFasta::open("example_data/missing.fa").unwrap_err();
        assert!(matches!(err, FaidxError::Open { .. }));
    }
}
