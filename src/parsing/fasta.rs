//! Chunked FASTA reading using noodles.
//!
//! Reference records are cut into overlapping chunks; every read is a single
//! chunk. Bases are uppercased on input.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna` (uncompressed)
//! - `.fa.gz`, `.fasta.gz`, `.fna.gz` (gzip compressed)
//! - `.fa.bgz`, `.fasta.bgz`, `.fna.bgz` (bgzip compressed)

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::types::{GenomicChunk, SequenceId};
use crate::utils::validation::{check_chunk_geometry, ConfigError};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid FASTA file: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Too many sequences: {0} exceeds the maximum sequence id")]
    TooManySequences(usize),
}

/// Sequence names and the chunks cut from them. Chunk ids index `names`.
#[derive(Debug, Clone, Default)]
pub struct SequenceSet {
    pub names: Vec<String>,
    pub chunks: Vec<GenomicChunk>,
}

impl SequenceSet {
    /// Name of a sequence id, if known.
    #[must_use]
    pub fn name(&self, id: SequenceId) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }
}

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    if path_str.ends_with(".fa.gz")
        || path_str.ends_with(".fasta.gz")
        || path_str.ends_with(".fna.gz")
        || path_str.ends_with(".fa.bgz")
        || path_str.ends_with(".fasta.bgz")
        || path_str.ends_with(".fna.bgz")
    {
        return true;
    }

    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna")
    )
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

fn open(path: &Path) -> Result<fasta::io::Reader<Box<dyn BufRead>>, ParseError> {
    let file = File::open(path)?;
    let inner: Box<dyn BufRead> = if is_gzipped(path) {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(fasta::io::Reader::new(inner))
}

/// Read every record as `(name, uppercase bases)`.
fn read_records<R: BufRead>(reader: &mut fasta::io::Reader<R>) -> Result<Vec<(String, Vec<u8>)>, ParseError> {
    let mut records = Vec::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        if SequenceId::try_from(records.len()).is_err() {
            return Err(ParseError::TooManySequences(records.len()));
        }

        let name = String::from_utf8_lossy(record.name()).to_string();
        let bases: Vec<u8> = record
            .sequence()
            .as_ref()
            .iter()
            .map(u8::to_ascii_uppercase)
            .collect();
        records.push((name, bases));
    }

    if records.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA file".to_string(),
        ));
    }

    Ok(records)
}

/// Cut one reference sequence into chunks of `chunk_size` bases whose starts
/// are `chunk_size - overlap` apart. The final chunk is flagged last.
#[must_use]
pub fn chunk_reference(
    id: SequenceId,
    bases: &[u8],
    chunk_size: usize,
    overlap: usize,
) -> Vec<GenomicChunk> {
    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();

    let mut start = 0;
    while start < bases.len() {
        let end = (start + chunk_size).min(bases.len());
        let is_last = end == bases.len();
        chunks.push(GenomicChunk::reference(
            id,
            bases[start..end].to_vec(),
            start as u64,
            is_last,
        ));
        if is_last {
            break;
        }
        start += step;
    }

    chunks
}

/// Read a reference FASTA and cut every record into overlapping chunks.
///
/// # Errors
///
/// Returns `ParseError::Config` for invalid chunk geometry, `ParseError::Io`
/// or `ParseError::Noodles` if the file cannot be read, and
/// `ParseError::InvalidFormat` if it holds no records.
pub fn read_reference(path: &Path, chunk_size: usize, overlap: usize) -> Result<SequenceSet, ParseError> {
    check_chunk_geometry(chunk_size, overlap)?;

    let mut set = SequenceSet::default();
    for (id, (name, bases)) in read_records(&mut open(path)?)?.into_iter().enumerate() {
        // Record count was checked against the id range
        let id = id as SequenceId;
        if bases.is_empty() {
            warn!("Reference sequence {name} is empty");
        }
        let chunks = chunk_reference(id, &bases, chunk_size, overlap);
        debug!("Reference {name}: {} bases in {} chunks", bases.len(), chunks.len());
        set.chunks.extend(chunks);
        set.names.push(name);
    }

    Ok(set)
}

/// Read a FASTA of reads; each record becomes one chunk.
///
/// # Errors
///
/// Returns `ParseError::Io` or `ParseError::Noodles` if the file cannot be
/// read, and `ParseError::InvalidFormat` if it holds no records.
pub fn read_queries(path: &Path) -> Result<SequenceSet, ParseError> {
    let mut set = SequenceSet::default();
    for (id, (name, bases)) in read_records(&mut open(path)?)?.into_iter().enumerate() {
        set.chunks.push(GenomicChunk::read(id as SequenceId, bases));
        set.names.push(name);
    }
    debug!("Read {} query sequences", set.names.len());

    Ok(set)
}
