use serde::{Deserialize, Serialize};

/// Identifier of a source sequence: a reference record ordinal or a read ordinal.
pub type SequenceId = u32;

/// A slice of a source sequence as delivered by the chunked reader.
///
/// Consecutive reference chunks of one record overlap by the configured
/// chunk overlap. Reads are delivered as a single chunk at offset 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomicChunk {
    /// Ordinal of the source record
    pub id: SequenceId,

    /// Bases of this chunk
    pub sequence: Vec<u8>,

    /// Absolute position of `sequence[0]` within the source record
    pub offset: u64,

    /// True for the final chunk of a record
    pub is_last: bool,

    /// True if the chunk comes from the reference input
    pub is_reference: bool,
}

impl GenomicChunk {
    /// A whole read as a single query chunk.
    pub fn read(id: SequenceId, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            sequence: sequence.into(),
            offset: 0,
            is_last: true,
            is_reference: false,
        }
    }

    /// A reference chunk.
    pub fn reference(
        id: SequenceId,
        sequence: impl Into<Vec<u8>>,
        offset: u64,
        is_last: bool,
    ) -> Self {
        Self {
            id,
            sequence: sequence.into(),
            offset,
            is_last,
            is_reference: true,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// One emitted seed with the context needed to extend it.
///
/// Field order is the wire order: `id`, `is_reference`, `is_rc`, `offset`,
/// `left_flank`, `right_flank`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedOccurrence {
    /// Source sequence (reference record or read)
    pub id: SequenceId,

    pub is_reference: bool,

    /// Seed taken from the reverse complement of the read
    pub is_rc: bool,

    /// Absolute seed start for references; start within the oriented read for queries
    pub offset: u64,

    /// Bases left of the seed, nearest base first
    pub left_flank: Vec<u8>,

    /// Bases right of the seed, nearest base first
    pub right_flank: Vec<u8>,
}

/// A validated full-length alignment of a read against a reference span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlignmentCandidate {
    pub ref_id: SequenceId,

    /// Inclusive reference start
    pub ref_start: u64,

    /// Exclusive reference end
    pub ref_end: u64,

    /// Mismatches plus indels over the whole read
    pub differences: u32,

    /// Read aligned as its reverse complement
    pub is_rc: bool,
}

impl AlignmentCandidate {
    /// True when both candidates describe the same reference locus with the
    /// same cost, regardless of strand.
    #[must_use]
    pub fn same_locus(&self, other: &Self) -> bool {
        self.ref_id == other.ref_id
            && self.ref_start == other.ref_start
            && self.ref_end == other.ref_end
            && self.differences == other.differences
    }

    /// Ordering used for reports: reference, span, then forward before reverse.
    #[must_use]
    pub fn report_key(&self) -> (SequenceId, u64, u64, u32, bool) {
        (
            self.ref_id,
            self.ref_start,
            self.ref_end,
            self.differences,
            self.is_rc,
        )
    }

    #[must_use]
    pub fn strand(&self) -> char {
        if self.is_rc {
            '-'
        } else {
            '+'
        }
    }
}

/// A candidate tagged with the read it belongs to, as written by the
/// alignment stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadAlignment {
    pub read_id: SequenceId,
    pub alignment: AlignmentCandidate,
}

/// Sort a read's candidates for reporting and drop strand-equivalent duplicates,
/// keeping the forward-strand copy.
pub fn collapse_strand_duplicates(candidates: &mut Vec<AlignmentCandidate>) {
    candidates.sort_by_key(AlignmentCandidate::report_key);
    candidates.dedup_by(|later, earlier| later.same_locus(earlier));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(start: u64, differences: u32, is_rc: bool) -> AlignmentCandidate {
        AlignmentCandidate {
            ref_id: 0,
            ref_start: start,
            ref_end: start + 16,
            differences,
            is_rc,
        }
    }

    #[test]
    fn test_same_locus_ignores_strand() {
        assert!(candidate(4, 1, false).same_locus(&candidate(4, 1, true)));
        assert!(!candidate(4, 1, false).same_locus(&candidate(5, 1, false)));
        assert!(!candidate(4, 1, false).same_locus(&candidate(4, 2, false)));
    }

    #[test]
    fn test_collapse_strand_duplicates() {
        let mut v = vec![
            candidate(8, 0, true),
            candidate(0, 1, true),
            candidate(0, 1, false),
            candidate(8, 0, false),
            candidate(8, 0, false),
        ];
        collapse_strand_duplicates(&mut v);
        assert_eq!(v, vec![candidate(0, 1, false), candidate(8, 0, false)]);
    }

    #[test]
    fn test_read_chunk() {
        let chunk = GenomicChunk::read(7, b"ACGT".to_vec());
        assert_eq!(chunk.offset, 0);
        assert!(chunk.is_last);
        assert!(!chunk.is_reference);
        assert_eq!(chunk.len(), 4);
    }
}
