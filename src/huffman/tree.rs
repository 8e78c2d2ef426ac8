use std::{
    cmp::{Ordering, Reverse},
    collections::{BTreeMap, BinaryHeap},
};

use crate::{CodecError, Result};

/// How many times each byte occurs in some input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<u8, u64>,
}

impl FrequencyTable {
    /// Count every byte of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        for &b in bytes {
            counts[b as usize] += 1;
        }

        let counts = (0..=u8::MAX)
            .zip(counts)
            .filter(|&(_, count)| count != 0)
            .collect();
        Self { counts }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn get(&self, symbol: u8) -> Option<u64> {
        self.counts.get(&symbol).copied()
    }

    /// Total number of occurrences across all symbols.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// `(symbol, count)` pairs, in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts.iter().map(|(&s, &c)| (s, c))
    }

    /// `(symbol, count / total)` pairs, in ascending symbol order.
    pub fn probabilities(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        let total = self.total() as f64;
        self.iter().map(move |(s, c)| (s, c as f64 / total))
    }
}

impl FromIterator<(u8, u64)> for FrequencyTable {
    /// Repeated symbols have their counts summed.
    fn from_iter<I: IntoIterator<Item = (u8, u64)>>(iter: I) -> Self {
        let mut counts = BTreeMap::new();
        for (symbol, count) in iter {
            *counts.entry(symbol).or_insert(0) += count;
        }
        Self { counts }
    }
}

/// A node of a Huffman tree.
///
/// Internal nodes always own exactly two children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: u8,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    /// Sum of the frequencies of all leaves under this node.
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

/// A Huffman tree, built bottom-up from a [`FrequencyTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    /// Build the tree by repeatedly merging the two lightest nodes.
    ///
    /// Ties on weight go to whichever node entered the queue first. Leaves
    /// enter in ascending symbol order and merged nodes enter as they are
    /// created, so the same table always gives the same tree. Of each merged
    /// pair, the first node taken off the queue becomes the left child.
    ///
    /// A table with a single symbol gives a tree that is a single leaf.
    pub fn build(frequencies: &FrequencyTable) -> Result<Self> {
        if frequencies.is_empty() {
            return Err(CodecError::InvalidInput(
                "can't build a huffman tree from an empty frequency table".into(),
            ));
        }

        let mut queue = BinaryHeap::with_capacity(frequencies.len());
        let mut seq = 0;
        let mut enqueue = |queue: &mut BinaryHeap<Queued>, node: Node| {
            queue.push(Queued {
                key: Reverse((node.weight(), seq)),
                node,
            });
            seq += 1;
        };

        for (symbol, weight) in frequencies.iter() {
            enqueue(&mut queue, Node::Leaf { symbol, weight });
        }

        loop {
            // Non-empty by construction: seeded with at least one node, and
            // every iteration that takes two puts one back.
            let Some(Queued { node: left, .. }) = queue.pop() else {
                unreachable!("huffman queue drained");
            };
            let Some(Queued { node: right, .. }) = queue.pop() else {
                return Ok(Self { root: left });
            };

            let merged = Node::Internal {
                weight: left.weight() + right.weight(),
                left: Box::new(left),
                right: Box::new(right),
            };
            enqueue(&mut queue, merged);
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }
}

/// Priority queue entry; the max-heap pops the smallest `(weight, seq)`.
struct Queued {
    key: Reverse<(u64, u64)>,
    node: Node,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}
