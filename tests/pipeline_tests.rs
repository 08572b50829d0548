//! End-to-end alignment tests over the in-process executor.

use burst_align::core::dna::reverse_complement;
use burst_align::parsing::fasta::chunk_reference;
use burst_align::{pipeline, AlignConfig, AlignmentReport, GenomicChunk};

type Hit = (u32, u32, u64, u64, u32, bool);

fn config(min_read_len: usize, max_read_len: usize, k: usize) -> AlignConfig {
    AlignConfig {
        min_read_len,
        max_read_len,
        k,
        allow_indels: false,
        block_size: 128,
        redundancy: 1,
        filter_ambiguous: false,
        partitions: 4,
        filter_partitions: 3,
        chunk_overlap: 1024,
    }
}

/// Deterministic pseudo-random bases.
fn random_bases(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            b"ACGT"[((state >> 33) % 4) as usize]
        })
        .collect()
}

fn substitute(base: u8) -> u8 {
    match base {
        b'A' => b'C',
        b'C' => b'G',
        b'G' => b'T',
        _ => b'A',
    }
}

fn whole(reference: &[u8]) -> Vec<GenomicChunk> {
    vec![GenomicChunk::reference(0, reference.to_vec(), 0, true)]
}

fn reads(sequences: &[Vec<u8>]) -> Vec<GenomicChunk> {
    sequences
        .iter()
        .enumerate()
        .map(|(id, seq)| GenomicChunk::read(id as u32, seq.clone()))
        .collect()
}

fn hits(report: &AlignmentReport) -> Vec<Hit> {
    report
        .alignments
        .iter()
        .map(|r| {
            let a = &r.alignment;
            (r.read_id, a.ref_id, a.ref_start, a.ref_end, a.differences, a.is_rc)
        })
        .collect()
}

#[test]
fn test_exact_read_single_alignment() {
    let reference = b"ACGTACGTACGTACGT";
    let report = pipeline::run(
        &config(16, 16, 0),
        &whole(reference),
        &reads(&[reference.to_vec()]),
    )
    .unwrap();

    assert_eq!(hits(&report), vec![(0, 0, 0, 16, 0, false)]);
}

#[test]
fn test_one_mismatch_single_alignment() {
    let reference = b"ACGTACGTACGTACGT";
    let mut read = reference.to_vec();
    read[8] = b'T';

    let report = pipeline::run(&config(16, 16, 1), &whole(reference), &reads(&[read.clone()])).unwrap();
    assert_eq!(hits(&report), vec![(0, 0, 0, 16, 1, false)]);

    // Not reachable without a difference budget
    let report = pipeline::run(&config(16, 16, 0), &whole(reference), &reads(&[read])).unwrap();
    assert!(report.alignments.is_empty());
}

#[test]
fn test_filter_drops_read_with_two_best_loci() {
    let read = b"GATTACAGGCTAACGT".to_vec();
    let mut reference = read.clone();
    reference.extend_from_slice(b"GGGGGGGG");
    reference.extend_from_slice(&read);

    let report = pipeline::run(&config(16, 16, 1), &whole(&reference), &reads(&[read.clone()])).unwrap();
    assert_eq!(
        hits(&report),
        vec![(0, 0, 0, 16, 0, false), (0, 0, 24, 40, 0, false)]
    );

    let mut filtered = config(16, 16, 1);
    filtered.filter_ambiguous = true;
    let report = pipeline::run(&filtered, &whole(&reference), &reads(&[read])).unwrap();
    assert!(report.alignments.is_empty());
    let resolve = report.stats.resolve.unwrap();
    assert_eq!(resolve.ambiguous, 1);
    assert_eq!(resolve.unique, 0);
}

#[test]
fn test_filter_keeps_unique_best() {
    let read = b"GATTACAGGCTAACGT".to_vec();
    let mut variant = read.clone();
    variant[12] = substitute(variant[12]);

    let mut reference = read.clone();
    reference.extend_from_slice(b"GGGGGGGG");
    reference.extend_from_slice(&variant);

    let mut filtered = config(16, 16, 1);
    filtered.filter_ambiguous = true;
    let report = pipeline::run(&filtered, &whole(&reference), &reads(&[read])).unwrap();
    assert_eq!(hits(&report), vec![(0, 0, 0, 16, 0, false)]);
}

#[test]
fn test_reverse_strand_read() {
    let reference = random_bases(120, 7);
    let mut read = reverse_complement(&reference[40..64]);
    read[3] = substitute(read[3]);

    let report = pipeline::run(&config(24, 24, 2), &whole(&reference), &reads(&[read])).unwrap();
    assert_eq!(hits(&report), vec![(0, 0, 40, 64, 1, true)]);
}

#[test]
fn test_chunk_seams_do_not_change_results() {
    let reference = random_bases(300, 11);
    let origins = [0usize, 15, 22, 38, 41, 60, 77, 100, 139, 161, 200, 242, 280];
    let sequences: Vec<Vec<u8>> = origins
        .iter()
        .enumerate()
        .map(|(i, &origin)| {
            let mut read = reference[origin..origin + 20].to_vec();
            if i % 2 == 1 {
                read[(i * 3) % 20] = substitute(read[(i * 3) % 20]);
            }
            read
        })
        .collect();

    let mut cfg = config(20, 20, 1);
    cfg.chunk_overlap = 40;

    let whole_report = pipeline::run(&cfg, &whole(&reference), &reads(&sequences)).unwrap();
    let chunked = chunk_reference(0, &reference, 60, 40);
    assert!(chunked.len() > 5);
    let chunked_report = pipeline::run(&cfg, &chunked, &reads(&sequences)).unwrap();

    assert_eq!(hits(&chunked_report), hits(&whole_report));

    for (i, &origin) in origins.iter().enumerate() {
        let found: Vec<Hit> = hits(&chunked_report)
            .into_iter()
            .filter(|h| h.0 == i as u32)
            .collect();
        let differences = u32::from(i % 2 == 1);
        assert_eq!(found, vec![(i as u32, 0, origin as u64, origin as u64 + 20, differences, false)]);
    }
}

#[test]
fn test_every_read_with_k_mismatches_is_found() {
    let reference = random_bases(400, 23);
    let mut sequences = Vec::new();
    let mut origins = Vec::new();
    for i in 0..30 {
        let origin = (i * 37) % 370;
        let mut read = reference[origin..origin + 24].to_vec();
        // Two mismatches in distinct seed windows or the same one
        let first = (i * 5) % 24;
        let second = (first + 1 + (i * 7) % 23) % 24;
        read[first] = substitute(read[first]);
        read[second] = substitute(read[second]);
        sequences.push(read);
        origins.push(origin);
    }

    let report = pipeline::run(&config(24, 24, 2), &whole(&reference), &reads(&sequences)).unwrap();
    let found = hits(&report);
    for (i, &origin) in origins.iter().enumerate() {
        let expected = (i as u32, 0, origin as u64, origin as u64 + 24, 2, false);
        assert!(found.contains(&expected), "read {i} at {origin} not found");
    }
}

#[test]
fn test_redundancy_does_not_change_results() {
    let mut reference = random_bases(40, 3);
    reference.extend(std::iter::repeat(b'A').take(30));
    reference.extend(b"CACACACACACACACACACACA");
    reference.extend(random_bases(40, 5));

    let sequences = vec![
        vec![b'A'; 20],
        b"ACACACACACACACACACAC".to_vec(),
        reference[30..50].to_vec(),
        reference[95..115].to_vec(),
        {
            let mut read = reference[60..80].to_vec();
            read[2] = substitute(read[2]);
            read
        },
    ];

    let baseline = pipeline::run(&config(20, 20, 1), &whole(&reference), &reads(&sequences)).unwrap();
    assert!(!baseline.alignments.is_empty());

    for redundancy in [2, 3, 8] {
        let mut cfg = config(20, 20, 1);
        cfg.redundancy = redundancy;
        let report = pipeline::run(&cfg, &whole(&reference), &reads(&sequences)).unwrap();
        assert_eq!(hits(&report), hits(&baseline), "redundancy {redundancy}");
        assert!(report.stats.emit.low_complexity > 0);
    }
}

#[test]
fn test_block_size_does_not_change_results() {
    let unit = random_bases(30, 17);
    let mut reference = Vec::new();
    for copy in 0..5 {
        let mut repeat = unit.clone();
        repeat[copy * 5] = substitute(repeat[copy * 5]);
        reference.extend(repeat);
        reference.extend(random_bases(10, 100 + copy as u64));
    }
    let sequences: Vec<Vec<u8>> = (0..6).map(|i| unit[i..i + 20].to_vec()).collect();

    for filter in [false, true] {
        let mut cfg = config(20, 20, 2);
        cfg.filter_ambiguous = filter;
        let expected = pipeline::run(&cfg, &whole(&reference), &reads(&sequences)).unwrap();
        if !filter {
            assert!(expected.alignments.len() > sequences.len());
        }
        for block_size in [1, 2, 3, 7] {
            cfg.block_size = block_size;
            let report = pipeline::run(&cfg, &whole(&reference), &reads(&sequences)).unwrap();
            assert_eq!(hits(&report), hits(&expected), "block size {block_size}, filter {filter}");
        }
    }
}

#[test]
fn test_partition_count_does_not_change_results() {
    let reference = random_bases(200, 31);
    let sequences: Vec<Vec<u8>> = (0..8).map(|i| reference[i * 20..i * 20 + 20].to_vec()).collect();

    let expected = pipeline::run(&config(20, 20, 1), &whole(&reference), &reads(&sequences)).unwrap();
    assert_eq!(expected.alignments.len(), sequences.len());
    for partitions in [1, 2, 13] {
        let mut cfg = config(20, 20, 1);
        cfg.partitions = partitions;
        let report = pipeline::run(&cfg, &whole(&reference), &reads(&sequences)).unwrap();
        assert_eq!(hits(&report), hits(&expected));
    }
}

#[test]
fn test_filter_partition_count_does_not_change_results() {
    let unit = random_bases(30, 53);
    let mut reference = random_bases(25, 59);
    // Two exact copies of the unit make reads drawn from it ambiguous
    reference.extend_from_slice(&unit);
    reference.extend(random_bases(25, 61));
    reference.extend_from_slice(&unit);
    reference.extend(random_bases(25, 67));

    let mut sequences: Vec<Vec<u8>> = (0..4).map(|i| unit[i..i + 20].to_vec()).collect();
    sequences.extend((0..4).map(|i| reference[i * 5..i * 5 + 20].to_vec()));
    sequences.push(reference[110..130].to_vec());

    let mut cfg = config(20, 20, 1);
    cfg.filter_ambiguous = true;
    cfg.filter_partitions = 1;
    let expected = pipeline::run(&cfg, &whole(&reference), &reads(&sequences)).unwrap();
    let resolve = expected.stats.resolve.unwrap();
    assert_eq!(resolve.ambiguous, 4);
    assert_eq!(resolve.unique, 5);

    for filter_partitions in [2, 5, 11] {
        cfg.filter_partitions = filter_partitions;
        let report = pipeline::run(&cfg, &whole(&reference), &reads(&sequences)).unwrap();
        assert_eq!(hits(&report), hits(&expected), "filter partitions {filter_partitions}");
        assert_eq!(report.stats.resolve, Some(resolve));
    }
}

#[test]
fn test_indels() {
    let reference = random_bases(200, 41);

    // Reference base 60 missing from the read
    let mut deletion = reference[50..60].to_vec();
    deletion.extend_from_slice(&reference[61..71]);

    // Extra base between reference 109 and 110
    let mut insertion = reference[100..110].to_vec();
    insertion.push(substitute(reference[110]));
    insertion.extend_from_slice(&reference[110..120]);

    let mut cfg = config(20, 22, 1);
    cfg.allow_indels = true;
    let report = pipeline::run(&cfg, &whole(&reference), &reads(&[deletion.clone(), insertion.clone()])).unwrap();
    assert_eq!(
        hits(&report),
        vec![(0, 0, 50, 71, 1, false), (1, 0, 100, 120, 1, false)]
    );

    let report = pipeline::run(&config(20, 22, 1), &whole(&reference), &reads(&[deletion, insertion])).unwrap();
    assert!(report.alignments.is_empty());
}

#[test]
fn test_read_with_too_many_ns_is_skipped() {
    let reference = random_bases(100, 43);
    let mut read = reference[10..30].to_vec();
    read[3] = b'N';
    read[15] = b'N';

    let report = pipeline::run(&config(20, 20, 1), &whole(&reference), &reads(&[read.clone()])).unwrap();
    assert!(report.alignments.is_empty());
    assert_eq!(report.stats.emit.reads_discarded, 1);

    // One N costs one difference
    read[15] = reference[25];
    let report = pipeline::run(&config(20, 20, 1), &whole(&reference), &reads(&[read])).unwrap();
    assert_eq!(hits(&report), vec![(0, 0, 10, 30, 1, false)]);
}
