use serde::Deserialize;

/// A FASTA index entry.
///
/// This struct represents a single entry in a FASTA index.
/// It contains the name of the entry, the length of the entry,
/// the offset of the first residue in the FASTA file, and the
/// number of residues (`line_bases`) and bytes (`line_width`) on
/// each full line of the entry.
///
/// The `name` is kept as it was read; lookups and the persisted index
/// use only its first whitespace-delimited token (see [`IndexEntry::key`]).
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: String,
    pub length: u64,
    pub offset: u64,
    pub line_bases: u64,
    pub line_width: u64,
}
impl IndexEntry {
    /// The lookup key: the first whitespace-delimited token of the name.
    pub fn key(&self) -> &str {
        first_token(&self.name)
    }

    /// Bytes of line terminator at the end of each full line.
    pub fn terminator_width(&self) -> u64 {
        self.line_width.saturating_sub(self.line_bases)
    }

    /// Bytes spanned by the whole sequence, from `offset` through the
    /// terminator of its last full line.
    pub fn byte_span(&self) -> u64 {
        if self.line_bases == 0 {
            return self.length;
        }
        self.length + (self.length / self.line_bases) * self.terminator_width()
    }
}

pub(crate) fn first_token(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or("")
}
