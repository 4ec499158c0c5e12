//! A library to deduplicate short biological sequences by approximate matching
//!
//! `seqdedup` stores sequences (reads, barcodes, UMIs) in a compact
//! radix [`Trie`] and groups them into clusters of sequences that lie
//! within a bounded hamming distance of each other. All sequences of a
//! cluster are considered duplicates of the same original molecule.
//!
//! The crate provides:
//!
//! - [`Trie`]: the indexing engine with approximate-match lookup and
//!   destructive cluster extraction ([`Trie::pop_cluster`])
//! - [`Cluster`] and [`ClusterMember`]: owned results of one extraction
//! - [`QualityFilter`]: a phred-score based read filter
//! - [`distance`]: standalone hamming and edit distance predicates
//!
//! # Examples
//!
//! ```
//! use seqdedup::Trie;
//!
//! let mut trie = Trie::new();
//! trie.add_sequence("ACGT").unwrap();
//! trie.add_sequence("ACGT").unwrap();
//! trie.add_sequence("ACGA").unwrap();
//!
//! // "ACGT" is stored twice, "ACGA" lies one mismatch away
//! assert!(trie.contains_sequence("ACGT", 0).unwrap());
//! assert!(trie.contains_sequence("AGGA", 1).unwrap());
//!
//! let cluster = trie.pop_cluster(1).unwrap();
//! assert_eq!(cluster.len(), 2);
//! assert_eq!(cluster.total_count(), 3);
//! assert!(trie.is_empty());
//! ```

use thiserror::Error;

mod alphabet;
pub mod cluster;
pub mod distance;
mod quality;
mod trie;

pub use cluster::{Cluster, ClusterMember};
pub use quality::QualityFilter;
pub use trie::Trie;

/// Child vectors address at most 254 distinct characters, one index is
/// reserved as the absent marker
const MAX_ALPHABET_SIZE: usize = 254;

/// Suffix lengths are stored in 31 bits
const MAX_SEQUENCE_LENGTH: usize = 0x7FFF_FFFF;

/// Offset of the Sanger/Illumina 1.8+ phred encoding
const DEFAULT_PHRED_OFFSET: u8 = 33;

/// Error conditions of `seqdedup` operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupError {
    #[error("alphabet characters must be unique")]
    InvalidAlphabet,
    #[error("the alphabet cannot hold more than 254 distinct characters")]
    AlphabetFull,
    #[error("sequence must consist only of ASCII characters")]
    NonAscii,
    #[error("sequence exceeds the maximum storable length")]
    SequenceTooLong,
    #[error("trie node resized beyond the maximum alphabet size")]
    NodeTooWide,
    #[error("no sequences left in the trie")]
    EmptyTrie,
    #[error("invalid phred character {0:?}")]
    BadPhred(char),
}

/// Result type used throughout the crate
pub type DedupResult<T> = Result<T, DedupError>;
