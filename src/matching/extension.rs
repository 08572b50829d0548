//! Budget-limited flank extension.
//!
//! Flanks are given nearest-base-first, so both sides of a seed are extended
//! outward from the seed boundary with the same routine. The whole query
//! flank must be consumed; any prefix of the reference flank may be.

use crate::core::dna::is_unambiguous;
use crate::core::types::{AlignmentCandidate, SeedOccurrence};

/// A single difference, positioned by query flank index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// Query base `p` aligned to a different reference base
    Mismatch(usize),
    /// Query base `p` has no reference counterpart
    Insertion(usize),
    /// A reference base is skipped just before query base `p`
    Deletion(usize),
}

/// Result of extending one flank.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extension {
    /// Reference bases consumed
    pub ref_len: usize,

    pub differences: usize,

    /// Differences in increasing query flank order
    pub edits: Vec<Edit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Start,
    Mismatch,
    Deletion,
    Insertion,
    Carry,
}

const UNREACHED: isize = -1;

fn bases_match(a: u8, b: u8) -> bool {
    is_unambiguous(a) && a.eq_ignore_ascii_case(&b)
}

/// Landau–Vishkin extender with reusable scratch tables.
///
/// In mismatch mode the extension is a bounded Hamming comparison. In indel
/// mode `reach[e][d]` holds the furthest query index reachable with `e`
/// differences on diagonal `d` (reference index minus query index), which
/// costs O(budget × (budget + flank length)).
#[derive(Debug, Clone)]
pub struct LandauVishkin {
    allow_indels: bool,
    reach: Vec<isize>,
    steps: Vec<Step>,
}

impl LandauVishkin {
    #[must_use]
    pub fn new(allow_indels: bool) -> Self {
        Self {
            allow_indels,
            reach: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Extender whose tables already fit `budget`.
    #[must_use]
    pub fn with_budget(allow_indels: bool, budget: usize) -> Self {
        let mut extender = Self::new(allow_indels);
        if allow_indels {
            extender.reserve(budget);
        }
        extender
    }

    fn reserve(&mut self, budget: usize) {
        let cells = (budget + 1) * (2 * budget + 1);
        if self.reach.len() < cells {
            self.reach.resize(cells, UNREACHED);
            self.steps.resize(cells, Step::Start);
        }
    }

    /// Align all of `query` against a prefix of `reference` with at most
    /// `budget` differences, returning the cheapest such alignment.
    pub fn extend(&mut self, query: &[u8], reference: &[u8], budget: usize) -> Option<Extension> {
        if query.is_empty() {
            return Some(Extension::default());
        }
        if self.allow_indels {
            self.extend_with_indels(query, reference, budget)
        } else {
            extend_mismatches(query, reference, budget)
        }
    }

    fn extend_with_indels(
        &mut self,
        query: &[u8],
        reference: &[u8],
        budget: usize,
    ) -> Option<Extension> {
        self.reserve(budget);

        let m = query.len() as isize;
        let n = reference.len() as isize;
        let k = budget as isize;
        let width = 2 * budget + 1;
        let idx = |e: usize, d: isize| e * width + (d + k) as usize;
        let slide = |mut i: isize, d: isize| {
            while i < m && i + d < n && bases_match(query[i as usize], reference[(i + d) as usize]) {
                i += 1;
            }
            i
        };

        for e in 0..=budget {
            for d in -k..=k {
                self.reach[idx(e, d)] = UNREACHED;
            }

            if e == 0 {
                self.reach[idx(0, 0)] = slide(0, 0);
                self.steps[idx(0, 0)] = Step::Start;
            } else {
                let span = e as isize;
                for d in -span..=span {
                    let prev = self.reach[idx(e - 1, d)];
                    let mut best = UNREACHED;
                    let mut step = Step::Start;

                    if prev != UNREACHED && prev < m && prev + d < n {
                        best = prev + 1;
                        step = Step::Mismatch;
                    }
                    if d > -k {
                        let from = self.reach[idx(e - 1, d - 1)];
                        if from != UNREACHED && from + d <= n && from > best {
                            best = from;
                            step = Step::Deletion;
                        }
                    }
                    if d < k {
                        let from = self.reach[idx(e - 1, d + 1)];
                        if from != UNREACHED && from < m && from + 1 > best {
                            best = from + 1;
                            step = Step::Insertion;
                        }
                    }
                    if prev > best {
                        best = prev;
                        step = Step::Carry;
                    }

                    if best != UNREACHED {
                        self.reach[idx(e, d)] = slide(best, d);
                        self.steps[idx(e, d)] = step;
                    }
                }
            }

            // Smallest |d| wins, negative before positive
            let finished = (0..=2 * e)
                .map(|t| {
                    let a = t.div_ceil(2) as isize;
                    if t % 2 == 1 {
                        -a
                    } else {
                        a
                    }
                })
                .find(|&d| self.reach[idx(e, d)] == m);

            if let Some(d) = finished {
                return Some(Extension {
                    ref_len: (m + d) as usize,
                    differences: e,
                    edits: self.traceback(width, k, e, d),
                });
            }
        }

        None
    }

    fn traceback(&self, width: usize, k: isize, mut e: usize, mut d: isize) -> Vec<Edit> {
        let idx = |e: usize, d: isize| e * width + (d + k) as usize;
        let mut edits = Vec::with_capacity(e);

        while e > 0 {
            match self.steps[idx(e, d)] {
                Step::Mismatch => edits.push(Edit::Mismatch(self.reach[idx(e - 1, d)] as usize)),
                Step::Deletion => {
                    d -= 1;
                    edits.push(Edit::Deletion(self.reach[idx(e - 1, d)] as usize));
                }
                Step::Insertion => {
                    d += 1;
                    edits.push(Edit::Insertion(self.reach[idx(e - 1, d)] as usize));
                }
                Step::Carry => {}
                Step::Start => break,
            }
            e -= 1;
        }

        edits.reverse();
        edits
    }

    /// Extend a query seed occurrence against a reference seed occurrence.
    ///
    /// The left flank is extended first with the whole budget and must leave
    /// the seed canonical; the right flank gets what remains. Returns `None`
    /// when either side fails.
    pub fn extend_seed_pair(
        &mut self,
        reference: &SeedOccurrence,
        query: &SeedOccurrence,
        seed_len: usize,
        k: usize,
    ) -> Option<AlignmentCandidate> {
        let left = self.extend(&query.left_flank, &reference.left_flank, k)?;
        if !is_canonical_seed(&left, query.left_flank.len(), seed_len) {
            return None;
        }

        let right = self.extend(&query.right_flank, &reference.right_flank, k - left.differences)?;

        Some(AlignmentCandidate {
            ref_id: reference.id,
            ref_start: reference.offset.checked_sub(left.ref_len as u64)?,
            ref_end: reference.offset + (seed_len + right.ref_len) as u64,
            differences: u32::try_from(left.differences + right.differences).ok()?,
            is_rc: query.is_rc,
        })
    }
}

fn extend_mismatches(query: &[u8], reference: &[u8], budget: usize) -> Option<Extension> {
    if query.len() > reference.len() {
        return None;
    }

    let mut edits = Vec::new();
    for (i, (&q, &r)) in query.iter().zip(reference).enumerate() {
        if !bases_match(q, r) {
            if edits.len() == budget {
                return None;
            }
            edits.push(Edit::Mismatch(i));
        }
    }

    Some(Extension {
        ref_len: query.len(),
        differences: edits.len(),
        edits,
    })
}

/// True when every seed window left of the current seed is broken by the
/// left-flank alignment.
///
/// `left_len` is the query left flank length, a multiple of `seed_len` for
/// read seeds. Windows are `[j * seed_len, (j + 1) * seed_len)` in read
/// coordinates; flank index `p` is read position `left_len - 1 - p`. If some
/// earlier window aligned error-free, that window's seed finds this alignment
/// too, so only the leftmost error-free seed reports it.
#[must_use]
pub fn is_canonical_seed(left: &Extension, left_len: usize, seed_len: usize) -> bool {
    let windows = left_len / seed_len.max(1);
    if windows == 0 {
        return true;
    }
    let window_of = |flank_pos: usize| left_len.checked_sub(flank_pos + 1).map(|q| q / seed_len);

    let mut broken = 0;
    let mut last = None;
    for edit in &left.edits {
        let window = match *edit {
            Edit::Mismatch(p) | Edit::Insertion(p) => window_of(p),
            // Gap between read positions left_len - p and left_len - 1 - p
            Edit::Deletion(p) if p >= 1 => match (window_of(p - 1), window_of(p)) {
                (Some(a), Some(b)) if a == b => Some(a),
                _ => None,
            },
            Edit::Deletion(_) => None,
        };

        // Edits are ordered, so windows arrive in non-increasing order
        if let Some(w) = window {
            if w < windows && last != Some(w) {
                broken += 1;
                last = Some(w);
            }
        }
    }

    broken == windows
}
