//! Nucleotide helpers used by seed emission: 2-bit packing, ambiguity and
//! low-complexity detection, and in-place reverse complementation.

/// Bases packed per byte of a seed key.
pub const BASES_PER_BYTE: usize = 4;

/// Longest repeat unit treated as low complexity (homopolymer, di- and
/// trinucleotide repeats).
pub const MAX_REPEAT_PERIOD: usize = 3;

/// 256-entry lookup: ASCII -> 2-bit code (A=0, C=1, G=2, T=3), 0xFF otherwise.
static BASE_CODE: [u8; 256] = {
    const X: u8 = 0xFF;
    let mut t = [X; 256];
    t[b'A' as usize] = 0;
    t[b'a' as usize] = 0;
    t[b'C' as usize] = 1;
    t[b'c' as usize] = 1;
    t[b'G' as usize] = 2;
    t[b'g' as usize] = 2;
    t[b'T' as usize] = 3;
    t[b't' as usize] = 3;
    t
};

/// Watson-Crick complement for A/C/G/T in either case; every other byte maps to itself.
static COMPLEMENT: [u8; 256] = {
    let mut t = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        #[allow(clippy::cast_possible_truncation)] // i < 256
        {
            t[i] = i as u8;
        }
        i += 1;
    }
    t[b'A' as usize] = b'T';
    t[b'T' as usize] = b'A';
    t[b'C' as usize] = b'G';
    t[b'G' as usize] = b'C';
    t[b'a' as usize] = b't';
    t[b't' as usize] = b'a';
    t[b'c' as usize] = b'g';
    t[b'g' as usize] = b'c';
    t
};

/// 2-bit code for a base, `None` if the base is ambiguous.
#[inline]
#[must_use]
pub fn base_code(base: u8) -> Option<u8> {
    let code = BASE_CODE[base as usize];
    (code <= 3).then_some(code)
}

/// True when `base` is one of A/C/G/T (case-insensitive).
#[inline]
#[must_use]
pub fn is_unambiguous(base: u8) -> bool {
    BASE_CODE[base as usize] <= 3
}

/// Number of bytes needed to pack `len` bases.
#[inline]
#[must_use]
pub fn packed_len(len: usize) -> usize {
    len.div_ceil(BASES_PER_BYTE)
}

/// Pack `bases[start..start + len]` into `out`, four bases per byte, most
/// significant bits first. The trailing byte is zero padded.
///
/// Ambiguous bases must be filtered out beforehand with [`contains_ambiguous`];
/// they are packed as `A`.
///
/// # Panics
///
/// Panics if `out` is shorter than [`packed_len`]`(len)` or the window runs
/// past the end of `bases`.
pub fn pack_window(bases: &[u8], start: usize, len: usize, out: &mut [u8]) {
    let out = &mut out[..packed_len(len)];
    out.fill(0);

    for (i, &base) in bases[start..start + len].iter().enumerate() {
        let code = base_code(base).unwrap_or(0);
        let shift = 6 - 2 * (i % BASES_PER_BYTE);
        out[i / BASES_PER_BYTE] |= code << shift;
    }
}

/// Unpack `len` bases from a packed buffer (inverse of [`pack_window`]).
#[must_use]
pub fn unpack_window(packed: &[u8], len: usize) -> Vec<u8> {
    const ALPHABET: [u8; 4] = *b"ACGT";

    (0..len)
        .map(|i| {
            let shift = 6 - 2 * (i % BASES_PER_BYTE);
            ALPHABET[((packed[i / BASES_PER_BYTE] >> shift) & 0b11) as usize]
        })
        .collect()
}

/// True if the window contains any base other than A/C/G/T.
#[must_use]
pub fn contains_ambiguous(bases: &[u8], start: usize, len: usize) -> bool {
    bases[start..start + len].iter().any(|&b| !is_unambiguous(b))
}

/// Count the ambiguous bases of a whole sequence.
#[must_use]
pub fn count_ambiguous(bases: &[u8]) -> usize {
    bases.iter().filter(|&&b| !is_unambiguous(b)).count()
}

/// Flag windows expected to recur extremely often genome-wide.
///
/// A window is low complexity when it is fully periodic with a period of
/// at most [`MAX_REPEAT_PERIOD`] bases. A period is only tested when the
/// window holds at least two full copies of it.
#[must_use]
pub fn is_low_complexity(bases: &[u8], start: usize, len: usize) -> bool {
    let window = &bases[start..start + len];

    (1..=MAX_REPEAT_PERIOD)
        .filter(|&period| 2 * period <= len)
        .any(|period| {
            window
                .iter()
                .skip(period)
                .zip(window)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
        })
}

/// Reverse complement a sequence in place.
pub fn reverse_complement_in_place(bases: &mut [u8]) {
    bases.reverse();
    for base in bases.iter_mut() {
        *base = COMPLEMENT[*base as usize];
    }
}

/// Reverse complement into a new vector.
#[must_use]
pub fn reverse_complement(bases: &[u8]) -> Vec<u8> {
    let mut out = bases.to_vec();
    reverse_complement_in_place(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack() {
        let seq = b"ACGTTGCAAC";
        let mut buf = vec![0u8; packed_len(seq.len())];
        pack_window(seq, 0, seq.len(), &mut buf);

        assert_eq!(buf.len(), 3);
        assert_eq!(buf[0], 0b0001_1011); // ACGT
        assert_eq!(unpack_window(&buf, seq.len()), seq.to_vec());
    }

    #[test]
    fn test_pack_is_case_insensitive() {
        let mut upper = [0u8; 2];
        let mut lower = [0u8; 2];
        pack_window(b"xxGATTACA", 2, 7, &mut upper);
        pack_window(b"gattaca", 0, 7, &mut lower);
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_contains_ambiguous() {
        assert!(!contains_ambiguous(b"ACGTACGT", 0, 8));
        assert!(contains_ambiguous(b"ACGTNCGT", 0, 8));
        assert!(!contains_ambiguous(b"ACGTNCGT", 5, 3));
        assert_eq!(count_ambiguous(b"NNACRT"), 3);
    }

    #[test]
    fn test_is_low_complexity() {
        assert!(is_low_complexity(b"AAAAAAAA", 0, 8));
        assert!(is_low_complexity(b"CACACACA", 0, 8));
        assert!(is_low_complexity(b"CAGCAGCAG", 0, 9));
        assert!(is_low_complexity(b"TTacacacaTT", 2, 7));
        assert!(!is_low_complexity(b"ACGTACGT", 0, 8));
        assert!(!is_low_complexity(b"GATTACAG", 0, 8));
        // A single base cannot show a repeat
        assert!(!is_low_complexity(b"A", 0, 1));
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement(b"AACGTN"), b"NACGTT".to_vec());
        assert_eq!(reverse_complement(b"acgg"), b"ccgt".to_vec());
        assert_eq!(reverse_complement(b""), Vec::<u8>::new());
    }

    #[test]
    fn test_reverse_complement_involution() {
        let samples: [&[u8]; 5] = [
            b"ACGTACGTACGTACGT",
            b"GATTACA",
            b"NNNNACGTRYKM",
            b"acgtNacgt",
            &[0, 1, 2, 200, 255, b'A'],
        ];
        for s in samples {
            let mut twice = s.to_vec();
            reverse_complement_in_place(&mut twice);
            reverse_complement_in_place(&mut twice);
            assert_eq!(twice, s.to_vec());
        }
    }
}
