use std::mem;

use smallvec::SmallVec;

use crate::alphabet::Alphabet;
use crate::{DedupError, DedupResult, MAX_ALPHABET_SIZE};

/// A child position of an internal node
///
/// `None` means no stored sequence passes through this position.
pub(super) type Slot = Option<Box<Node>>;

/// Inline capacity of the child vector, covering the nucleotide
/// alphabet without a heap allocation per node
const INLINE_CHILDREN: usize = 4;

/// A node of the radix trie
///
/// Internal nodes route sequences through their child vector, indexed
/// by the trie's alphabet. Leaves store the remaining bytes of a branch
/// as a single suffix. Both variants carry the number of sequences that
/// end exactly at them; an internal node with `count == 0` is a pure
/// routing point.
#[derive(Clone)]
pub(super) enum Node {
    Internal {
        children: SmallVec<[Slot; INLINE_CHILDREN]>,
        count: u32,
    },
    Leaf {
        suffix: Box<[u8]>,
        count: u32,
    },
}

impl Node {
    fn leaf(suffix: &[u8], count: u32) -> Box<Node> {
        Box::new(Node::Leaf {
            suffix: Box::from(suffix),
            count,
        })
    }
}

/// Inserts `sequence` at `slot`, adding `count` to its stored count
///
/// New characters are interned into the alphabet on the way down. The
/// child vector of a node grows lazily to one past the largest index
/// routed through it.
pub(super) fn add(
    slot: &mut Slot,
    sequence: &[u8],
    alphabet: &mut Alphabet,
    count: u32,
) -> DedupResult<()> {
    let Some(node) = slot.as_deref_mut() else {
        *slot = Some(Node::leaf(sequence, count));
        return Ok(());
    };
    if let Node::Leaf {
        suffix,
        count: stored,
    } = node
    {
        if suffix.as_ref() == sequence {
            *stored += count;
            return Ok(());
        }
        // The leaf is in the way: turn it into a routing node and
        // re-insert its suffix below, keeping the stored count.
        let old_suffix = mem::take(suffix);
        let old_count = mem::replace(stored, 0);
        *node = Node::Internal {
            children: SmallVec::new(),
            count: 0,
        };
        insert_below(node, &old_suffix, alphabet, old_count)?;
    }
    insert_below(node, sequence, alphabet, count)
}

fn insert_below(
    node: &mut Node,
    sequence: &[u8],
    alphabet: &mut Alphabet,
    count: u32,
) -> DedupResult<()> {
    let Node::Internal {
        children,
        count: stored,
    } = node
    else {
        unreachable!("leaves are split before descending");
    };
    if sequence.is_empty() {
        *stored += count;
        return Ok(());
    }
    let index = usize::from(alphabet.intern(sequence[0])?);
    if index >= children.len() {
        grow(children, index + 1)?;
    }
    add(&mut children[index], &sequence[1..], alphabet, count)
}

fn grow(children: &mut SmallVec<[Slot; INLINE_CHILDREN]>, width: usize) -> DedupResult<()> {
    if width > MAX_ALPHABET_SIZE {
        return Err(DedupError::NodeTooWide);
    }
    while children.len() < width {
        children.push(None);
    }
    Ok(())
}

/// Removes `sequence` from the subtree at `slot`
///
/// Returns the count that was stored for the sequence, or `None` if it
/// is not present. Dead ends are pruned on the way back up: an internal
/// node whose children are all empty collapses into an empty-suffix
/// leaf when sequences still end at it, and disappears otherwise.
pub(super) fn delete(slot: &mut Slot, sequence: &[u8], alphabet: &Alphabet) -> Option<u32> {
    let node = slot.as_deref_mut()?;
    match node {
        Node::Leaf { suffix, count } => {
            if suffix.as_ref() != sequence {
                return None;
            }
            let count = *count;
            *slot = None;
            Some(count)
        }
        Node::Internal { children, count } => {
            if sequence.is_empty() {
                if *count == 0 {
                    return None;
                }
                return Some(mem::replace(count, 0));
            }
            let index = usize::from(alphabet.index_of(sequence[0])?);
            let removed = delete(children.get_mut(index)?, &sequence[1..], alphabet)?;
            if children.iter().any(Option::is_some) {
                return Some(removed);
            }
            let remaining = *count;
            *slot = if remaining > 0 {
                Some(Node::leaf(b"", remaining))
            } else {
                None
            };
            Some(removed)
        }
    }
}

/// Searches for a stored sequence within `max_distance` mismatches of
/// `sequence` and returns its count, or 0 if none is found
///
/// Only equal-length sequences can match. The search is depth-first and
/// stops at the first hit: descending into the exactly-matching branch
/// is free and committed, every mismatching branch point spends one
/// unit of the budget and scans the remaining children in index order.
/// When a buffer is passed, the matched sequence is written to it.
pub(super) fn find_nearest(
    node: &Node,
    sequence: &[u8],
    mut max_distance: usize,
    alphabet: &Alphabet,
    mut buffer: Option<&mut [u8]>,
) -> u32 {
    match node {
        Node::Leaf { suffix, count } => {
            if suffix.len() != sequence.len() {
                // Hamming distance is only defined for equal lengths.
                return 0;
            }
            for (a, b) in sequence.iter().zip(suffix.iter()) {
                if a != b {
                    let Some(budget) = max_distance.checked_sub(1) else {
                        return 0;
                    };
                    max_distance = budget;
                }
            }
            if let Some(buffer) = buffer {
                buffer[..suffix.len()].copy_from_slice(suffix);
            }
            *count
        }
        Node::Internal { children, count } => {
            if sequence.is_empty() {
                return *count;
            }
            let character = sequence[0];
            let matched = alphabet
                .index_of(character)
                .and_then(|index| children.get(usize::from(index)))
                .and_then(|slot| slot.as_deref());
            if let Some(child) = matched {
                if let Some(buffer) = buffer.as_deref_mut() {
                    buffer[0] = character;
                }
                return find_nearest(
                    child,
                    &sequence[1..],
                    max_distance,
                    alphabet,
                    buffer.map(|b| &mut b[1..]),
                );
            }
            // Mismatch: one unit of the budget buys a detour through
            // the populated branches, in index order.
            let Some(budget) = max_distance.checked_sub(1) else {
                return 0;
            };
            for (index, slot) in children.iter().enumerate() {
                let Some(child) = slot else { continue };
                if let Some(buffer) = buffer.as_deref_mut() {
                    buffer[0] = alphabet.character(index);
                }
                let found = find_nearest(
                    child,
                    &sequence[1..],
                    budget,
                    alphabet,
                    buffer.as_deref_mut().map(|b| &mut b[1..]),
                );
                if found != 0 {
                    return found;
                }
            }
            0
        }
    }
}

/// Writes the first stored sequence (in child-index order) into
/// `buffer` and returns its length
///
/// Returns `None` when the buffer is too small to hold the sequence.
pub(super) fn first_sequence(node: &Node, alphabet: &Alphabet, buffer: &mut [u8]) -> Option<usize> {
    match node {
        Node::Leaf { suffix, .. } => {
            let target = buffer.get_mut(..suffix.len())?;
            target.copy_from_slice(suffix);
            Some(suffix.len())
        }
        Node::Internal { children, count } => {
            let (first, rest) = buffer.split_first_mut()?;
            for (index, slot) in children.iter().enumerate() {
                let Some(child) = slot else { continue };
                *first = alphabet.character(index);
                return first_sequence(child, alphabet, rest).map(|length| length + 1);
            }
            // No children left; only the count marks stored sequences.
            (*count > 0).then_some(0)
        }
    }
}

/// Returns the allocation footprint of the subtree in bytes
pub(super) fn memory_size(node: &Node) -> usize {
    let mut size = mem::size_of::<Node>();
    match node {
        Node::Internal { children, .. } => {
            if children.spilled() {
                size += children.capacity() * mem::size_of::<Slot>();
            }
            for child in children.iter().flatten() {
                size += memory_size(child);
            }
        }
        Node::Leaf { suffix, .. } => {
            size += suffix.len();
        }
    }
    size
}

/// Tallies the subtree into per-depth rows of `stats`
///
/// Column 0 counts leaves, column `w` counts internal nodes with a
/// child vector of width `w`. Each row has `columns` entries.
pub(super) fn collect_raw_stats(
    node: &Node,
    depth: usize,
    columns: usize,
    stats: &mut Vec<Vec<usize>>,
) {
    if stats.len() <= depth {
        stats.push(vec![0; columns]);
    }
    match node {
        Node::Leaf { .. } => stats[depth][0] += 1,
        Node::Internal { children, .. } => {
            stats[depth][children.len()] += 1;
            for child in children.iter().flatten() {
                collect_raw_stats(child, depth + 1, columns, stats);
            }
        }
    }
}
