//! Centralized validation of run parameters and chunk geometry.

use crate::core::config::AlignConfig;

/// Largest shard count accepted for low-complexity seeds.
pub const MAX_REDUNDANCY: u32 = 1024;

/// Default bases per reference chunk used by the reader.
pub const DEFAULT_CHUNK_SIZE: usize = 65_536;

/// Default overlap between consecutive reference chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 1024;

/// Configuration validation error types
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("min read length {min} exceeds max read length {max}")]
    ReadLengthRange { min: usize, max: usize },

    #[error("min read length {min_read_len} is too short for k={k}: seeds would be empty")]
    SeedTooShort { min_read_len: usize, k: usize },

    #[error("block size must be at least 1")]
    EmptyBlock,

    #[error("redundancy must be between 1 and 1024, got {0}")]
    Redundancy(u32),

    #[error("at least one partition is required")]
    NoPartitions,

    #[error("at least one filter partition is required")]
    NoFilterPartitions,

    #[error("chunk overlap {overlap} must be at least the max read length {max_read_len}")]
    OverlapShorterThanRead { overlap: usize, max_read_len: usize },

    #[error(
        "chunk overlap {overlap} leaves no room for flanks: need at least {required} \
         (2 x flank {flank_len} + seed {seed_len} - 1)"
    )]
    OverlapShorterThanFlanks {
        overlap: usize,
        required: usize,
        flank_len: usize,
        seed_len: usize,
    },

    #[error("chunk size {chunk_size} must exceed chunk overlap {overlap}")]
    ChunkSize { chunk_size: usize, overlap: usize },
}

/// Validate an [`AlignConfig`].
///
/// # Errors
///
/// Returns the first violated constraint.
pub fn validate_config(config: &AlignConfig) -> Result<(), ConfigError> {
    if config.min_read_len > config.max_read_len {
        return Err(ConfigError::ReadLengthRange {
            min: config.min_read_len,
            max: config.max_read_len,
        });
    }

    if config.seed_len() == 0 {
        return Err(ConfigError::SeedTooShort {
            min_read_len: config.min_read_len,
            k: config.k,
        });
    }

    if config.block_size == 0 {
        return Err(ConfigError::EmptyBlock);
    }

    if config.redundancy == 0 || config.redundancy > MAX_REDUNDANCY {
        return Err(ConfigError::Redundancy(config.redundancy));
    }

    if config.partitions == 0 {
        return Err(ConfigError::NoPartitions);
    }

    if config.filter_partitions == 0 {
        return Err(ConfigError::NoFilterPartitions);
    }

    if config.chunk_overlap < config.max_read_len {
        return Err(ConfigError::OverlapShorterThanRead {
            overlap: config.chunk_overlap,
            max_read_len: config.max_read_len,
        });
    }

    // The first seed of a non-first chunk sits at overlap + 1 - flank - seed
    // and still needs a full left flank inside the chunk.
    let required = (2 * config.flank_len() + config.seed_len()).saturating_sub(1);
    if config.chunk_overlap < required {
        return Err(ConfigError::OverlapShorterThanFlanks {
            overlap: config.chunk_overlap,
            required,
            flank_len: config.flank_len(),
            seed_len: config.seed_len(),
        });
    }

    Ok(())
}

/// Check reader chunk geometry.
///
/// # Errors
///
/// Returns `ConfigError::ChunkSize` unless `chunk_size > overlap`.
pub fn check_chunk_geometry(chunk_size: usize, overlap: usize) -> Result<(), ConfigError> {
    if chunk_size <= overlap {
        return Err(ConfigError::ChunkSize {
            chunk_size,
            overlap,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::test_config;

    #[test]
    fn test_valid_config() {
        assert_eq!(validate_config(&test_config(36, 36, 2)), Ok(()));
        assert_eq!(validate_config(&test_config(16, 16, 0)), Ok(()));
    }

    #[test]
    fn test_read_length_range() {
        assert_eq!(
            validate_config(&test_config(40, 36, 2)),
            Err(ConfigError::ReadLengthRange { min: 40, max: 36 })
        );
    }

    #[test]
    fn test_seed_too_short() {
        assert!(matches!(
            validate_config(&test_config(3, 36, 3)),
            Err(ConfigError::SeedTooShort { .. })
        ));
    }

    #[test]
    fn test_parameter_bounds() {
        let mut config = test_config(36, 36, 2);
        config.block_size = 0;
        assert_eq!(validate_config(&config), Err(ConfigError::EmptyBlock));

        let mut config = test_config(36, 36, 2);
        config.redundancy = 0;
        assert_eq!(validate_config(&config), Err(ConfigError::Redundancy(0)));

        let mut config = test_config(36, 36, 2);
        config.partitions = 0;
        assert_eq!(validate_config(&config), Err(ConfigError::NoPartitions));

        let mut config = test_config(36, 36, 2);
        config.filter_partitions = 0;
        assert_eq!(validate_config(&config), Err(ConfigError::NoFilterPartitions));
    }

    #[test]
    fn test_overlap_limits() {
        let mut config = test_config(36, 36, 2);
        config.chunk_overlap = 30;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::OverlapShorterThanRead { .. })
        ));

        // flank = 26, seed = 12: need 2 * 26 + 12 - 1 = 63
        config.chunk_overlap = 62;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::OverlapShorterThanFlanks { required: 63, .. })
        ));
        config.chunk_overlap = 63;
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_chunk_geometry() {
        assert!(check_chunk_geometry(100, 10).is_ok());
        assert!(check_chunk_geometry(10, 10).is_err());
    }
}
