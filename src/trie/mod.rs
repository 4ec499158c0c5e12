//! The indexing and clustering engine of the crate
//!
//! The [`Trie`] stores sequences in a compact radix tree and supports
//! approximate-match lookups within a bounded hamming distance. The
//! destructive [`Trie::pop_cluster`] repeatedly extracts one cluster of
//! neighbouring sequences until the trie is empty.

use tracing::debug;

use crate::alphabet::Alphabet;
use crate::cluster::{Cluster, ClusterMember};
use crate::{DedupError, DedupResult, MAX_SEQUENCE_LENGTH};

mod node;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// A radix trie over ASCII sequences with approximate-match clustering
///
/// Sequences are added one at a time. The trie learns its alphabet on
/// the fly: every distinct character is assigned the next free child
/// index, so two tries fed the same input in the same order have the
/// same shape and extract the same clusters.
///
/// Branches without siblings are not expanded node by node. Instead a
/// leaf stores the whole remaining suffix, which keeps memory usage
/// well below one node per character:
///
/// ```mermaid
/// graph TD
///     root((root)) -- A --> a((routing))
///     a -- C --> ac((routing))
///     ac -- G --> acg((count 2))
///     acg -- A --> leaf1[empty leaf]
///     acg -- T --> leaf2[empty leaf]
///     a -- T --> leaf3[leaf TACA, count 1]
/// ```
///
/// # Examples
///
/// ```
/// use seqdedup::Trie;
///
/// let mut trie = Trie::new();
/// for read in ["ACGTACGT", "ACGTACGT", "ACGAACGT", "TTTTACGT"] {
///     trie.add_sequence(read).unwrap();
/// }
/// assert_eq!(trie.number_of_sequences(), 4);
///
/// // the first cluster groups the three reads within one mismatch
/// let cluster = trie.pop_cluster(1).unwrap();
/// assert_eq!(cluster.len(), 2);
/// assert_eq!(cluster.total_count(), 3);
///
/// // the distant read forms its own cluster
/// let cluster = trie.pop_cluster(1).unwrap();
/// assert_eq!(cluster.total_count(), 1);
/// assert!(trie.pop_cluster(1).is_err());
/// ```
#[derive(Clone, Default)]
pub struct Trie {
    alphabet: Alphabet,
    root: Option<Box<node::Node>>,
    number_of_sequences: usize,
    max_sequence_size: usize,
    /// scratch space for cluster extraction, sized to the longest
    /// sequence ever added
    buffer: Vec<u8>,
}

impl std::fmt::Debug for Trie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Trie with {} sequences", self.number_of_sequences)
    }
}

impl Trie {
    /// Creates an empty trie with an empty alphabet
    pub fn new() -> Self {
        Trie::default()
    }

    /// Creates an empty trie with a pre-seeded alphabet
    ///
    /// Seeding fixes the child-index order independently of the later
    /// insertion order. The seed must be ASCII and must not contain a
    /// character twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use seqdedup::Trie;
    ///
    /// let trie = Trie::with_alphabet("ACGTN").unwrap();
    /// assert_eq!(trie.alphabet(), b"ACGTN");
    ///
    /// assert!(Trie::with_alphabet("ACGA").is_err());
    /// ```
    pub fn with_alphabet(alphabet: &str) -> DedupResult<Self> {
        if !alphabet.is_ascii() {
            return Err(DedupError::NonAscii);
        }
        let alphabet = Alphabet::from_seed(alphabet.as_bytes())?;
        debug!("seeded the alphabet with {} characters", alphabet.len());
        Ok(Trie {
            alphabet,
            ..Trie::default()
        })
    }

    /// Adds a sequence to the trie
    ///
    /// Adding the same sequence again increments its stored count.
    /// Empty sequences are legal and are counted at the root.
    ///
    /// # Errors
    ///
    /// - [`DedupError::NonAscii`] for non-ASCII sequences
    /// - [`DedupError::SequenceTooLong`] for sequences beyond 2³¹ - 1
    ///   characters
    /// - [`DedupError::AlphabetFull`] once more than 254 distinct
    ///   characters have been observed
    pub fn add_sequence(&mut self, sequence: &str) -> DedupResult<()> {
        if !sequence.is_ascii() {
            return Err(DedupError::NonAscii);
        }
        if sequence.len() > MAX_SEQUENCE_LENGTH {
            return Err(DedupError::SequenceTooLong);
        }
        node::add(&mut self.root, sequence.as_bytes(), &mut self.alphabet, 1)?;
        self.number_of_sequences += 1;
        self.max_sequence_size = self.max_sequence_size.max(sequence.len());
        Ok(())
    }

    /// Checks whether a sequence within `max_hamming_distance`
    /// mismatches of `sequence` is stored in the trie
    ///
    /// Sequences of a different length never match, regardless of the
    /// allowed distance. The lookup is a best-effort depth-first search
    /// that commits to exactly-matching branches: a neighbour hiding
    /// behind a branch that fails late can be missed even though it is
    /// within the allowed distance.
    ///
    /// # Examples
    ///
    /// ```
    /// use seqdedup::Trie;
    ///
    /// let mut trie = Trie::new();
    /// trie.add_sequence("ACGT").unwrap();
    ///
    /// assert!(trie.contains_sequence("ACGT", 0).unwrap());
    /// assert!(trie.contains_sequence("ACCT", 1).unwrap());
    /// assert!(!trie.contains_sequence("AGCT", 1).unwrap());
    /// assert!(!trie.contains_sequence("ACG", 4).unwrap());
    /// ```
    pub fn contains_sequence(
        &self,
        sequence: &str,
        max_hamming_distance: usize,
    ) -> DedupResult<bool> {
        if !sequence.is_ascii() {
            return Err(DedupError::NonAscii);
        }
        if sequence.len() > MAX_SEQUENCE_LENGTH {
            return Err(DedupError::SequenceTooLong);
        }
        let Some(root) = self.root.as_deref() else {
            return Ok(false);
        };
        let count = node::find_nearest(
            root,
            sequence.as_bytes(),
            max_hamming_distance,
            &self.alphabet,
            None,
        );
        Ok(count != 0)
    }

    /// Extracts one cluster of sequences within `max_hamming_distance`
    /// of each other and removes it from the trie
    ///
    /// The cluster is seeded with the first stored sequence (in
    /// child-index order) and expanded breadth-first: every member is
    /// used as a template to search for further neighbours until no
    /// member finds one. Members are therefore *transitively* within
    /// the allowed distance of the seed, two members can differ by more
    /// than `max_hamming_distance`.
    ///
    /// Every returned sequence is deleted from the trie and
    /// [`Trie::number_of_sequences`] shrinks by the summed counts.
    ///
    /// # Errors
    ///
    /// [`DedupError::EmptyTrie`] when no sequences are left.
    ///
    /// # Examples
    ///
    /// ```
    /// use seqdedup::Trie;
    ///
    /// let mut trie = Trie::new();
    /// for umi in ["AACC", "AACC", "AACG", "GGTT"] {
    ///     trie.add_sequence(umi).unwrap();
    /// }
    ///
    /// let mut clusters = Vec::new();
    /// while let Ok(cluster) = trie.pop_cluster(1) {
    ///     clusters.push(cluster);
    /// }
    /// assert_eq!(clusters.len(), 2);
    /// assert_eq!(trie.number_of_sequences(), 0);
    /// ```
    pub fn pop_cluster(&mut self, max_hamming_distance: usize) -> DedupResult<Cluster> {
        if self.root.is_none() {
            return Err(DedupError::EmptyTrie);
        }
        if self.buffer.len() < self.max_sequence_size {
            self.buffer.resize(self.max_sequence_size, 0);
        }

        let root = self
            .root
            .as_deref()
            .expect("the root was checked to be present");
        let length = node::first_sequence(root, &self.alphabet, &mut self.buffer)
            .expect("the scratch buffer covers the longest stored sequence");
        let seed = ascii_string(&self.buffer[..length]);
        let seed_count = node::delete(&mut self.root, seed.as_bytes(), &self.alphabet)
            .expect("the enumerated sequence is stored in the trie");
        self.number_of_sequences -= seed_count as usize;

        let mut members = vec![ClusterMember::new(seed_count, seed)];
        if max_hamming_distance == 0 {
            return Ok(Cluster::new(members));
        }

        let mut index = 0;
        while index < members.len() {
            let Some(root) = self.root.as_deref() else {
                break;
            };
            let template = members[index].sequence();
            let length = template.len();
            let found = node::find_nearest(
                root,
                template.as_bytes(),
                max_hamming_distance,
                &self.alphabet,
                Some(&mut self.buffer),
            );
            if found == 0 {
                // The next member becomes the template, traversing the
                // whole cluster before giving up.
                index += 1;
                continue;
            }
            let sequence = ascii_string(&self.buffer[..length]);
            let removed = node::delete(&mut self.root, sequence.as_bytes(), &self.alphabet)
                .expect("sequences found in the trie can be deleted");
            self.number_of_sequences -= removed as usize;
            members.push(ClusterMember::new(found, sequence));
        }

        debug!("popped a cluster of {} sequences", members.len());
        Ok(Cluster::new(members))
    }

    /// Returns the total number of stored sequences, counting
    /// duplicates
    pub fn number_of_sequences(&self) -> usize {
        self.number_of_sequences
    }

    /// Returns `true` if the trie stores no sequences
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns all characters observed so far, in child-index order
    pub fn alphabet(&self) -> &[u8] {
        self.alphabet.as_bytes()
    }

    /// Returns the summed allocation footprint of all nodes in bytes
    pub fn memory_size(&self) -> usize {
        self.root.as_deref().map_or(0, node::memory_size)
    }

    /// Returns node counts per depth layer
    ///
    /// Row `d` describes the nodes at depth `d` (the root is depth 0).
    /// Column 0 counts leaves, column `w` counts internal nodes with a
    /// child vector of width `w`, for `w` up to the alphabet size.
    pub fn raw_stats(&self) -> Vec<Vec<usize>> {
        let mut stats = Vec::new();
        if let Some(root) = self.root.as_deref() {
            node::collect_raw_stats(root, 0, self.alphabet.len() + 1, &mut stats);
        }
        stats
    }
}

fn ascii_string(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).expect("stored sequences are ASCII")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn count_increments_on_repeated_adds() {
        let mut trie = Trie::new();
        for _ in 0..3 {
            trie.add_sequence("ACGT").unwrap();
        }
        assert_eq!(trie.number_of_sequences(), 3);

        let cluster = trie.pop_cluster(0).unwrap();
        assert_eq!(cluster.len(), 1);
        assert_eq!(cluster.total_count(), 3);
        assert_eq!(trie.number_of_sequences(), 0);
    }

    #[test]
    fn empty_sequences_are_counted_at_the_root() {
        let mut trie = Trie::new();
        trie.add_sequence("").unwrap();
        assert!(trie.contains_sequence("", 0).unwrap());
        assert_eq!(trie.number_of_sequences(), 1);

        let cluster = trie.pop_cluster(0).unwrap();
        assert_eq!(cluster.iter().next().unwrap().sequence(), "");
        assert!(trie.is_empty());
    }

    #[test]
    fn lookups_on_an_empty_trie_find_nothing() {
        let trie = Trie::new();
        assert!(!trie.contains_sequence("ACGT", 10).unwrap());
    }

    #[test]
    fn non_ascii_input_is_rejected() {
        let mut trie = Trie::new();
        assert_eq!(trie.add_sequence("ACGé"), Err(DedupError::NonAscii));
        assert_eq!(
            trie.contains_sequence("é", 0).unwrap_err(),
            DedupError::NonAscii
        );
        assert_eq!(
            Trie::with_alphabet("äö").unwrap_err(),
            DedupError::NonAscii
        );
    }

    #[test]
    fn the_alphabet_is_learned_in_insertion_order() {
        let mut trie = Trie::new();
        trie.add_sequence("TG").unwrap();
        trie.add_sequence("TC").unwrap();
        // 'T' is interned when the first leaf splits, 'G' when the
        // second split re-inserts the old suffix, 'C' last
        assert_eq!(trie.alphabet(), b"TGC");
    }

    #[test]
    fn a_generous_distance_matches_any_equal_length_sequence() {
        let mut trie = Trie::new();
        trie.add_sequence("AAAA").unwrap();
        trie.add_sequence("TTTT").unwrap();

        assert!(trie.contains_sequence("CCCC", 100).unwrap());
        assert!(!trie.contains_sequence("CC", 100).unwrap());
    }

    #[test]
    fn memory_size_reflects_the_tree() {
        let mut trie = Trie::new();
        assert_eq!(trie.memory_size(), 0);

        trie.add_sequence("ACGTACGT").unwrap();
        let single = trie.memory_size();
        assert!(single > 0);

        trie.add_sequence("ACGTACGA").unwrap();
        assert!(trie.memory_size() > single);
    }

    #[test]
    fn raw_stats_counts_nodes_per_layer() {
        let mut trie = Trie::new();
        trie.add_sequence("AA").unwrap();
        trie.add_sequence("AC").unwrap();

        // root routes 'A', its child routes 'A' and 'C' into two
        // empty-suffix leaves
        let stats = trie.raw_stats();
        assert_eq!(stats, vec![vec![0, 1, 0], vec![0, 0, 1], vec![2, 0, 0],]);
    }

    #[test]
    fn raw_stats_is_empty_without_sequences() {
        let trie = Trie::new();
        assert!(trie.raw_stats().is_empty());
    }

    #[test]
    fn popping_an_empty_trie_fails() {
        let mut trie = Trie::new();
        assert_eq!(trie.pop_cluster(1).unwrap_err(), DedupError::EmptyTrie);
    }
}
