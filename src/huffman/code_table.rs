use std::collections::{BTreeMap, HashMap};

use bitvec::prelude::*;

use super::tree::{HuffmanTree, Node};
use crate::{BitSequence, Bits, CodecError, Result};

/// A prefix code: each symbol maps to a distinct code, and no code is a
/// prefix of another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    sym_to_code: BTreeMap<u8, BitSequence>,
    code_to_sym: HashMap<BitSequence, u8>,
    max_code_len: usize,
}

impl CodeTable {
    /// Read the codes off a tree: `0` for each left branch, `1` for each right.
    ///
    /// A tree that is a single leaf gives its symbol the one-bit code `0`, so
    /// that every occurrence still costs one bit.
    ///
    /// Fails with [`CodecError::TreeTooDeep`] if any leaf is more than
    /// `max_depth` levels below the root.
    pub fn from_tree(tree: &HuffmanTree, max_depth: usize) -> Result<Self> {
        if let Node::Leaf { symbol, .. } = tree.root() {
            return Self::from_codes([(*symbol, bitvec![u8, Msb0; 0])]);
        }

        let mut codes = vec![];
        let mut stack = vec![(tree.root(), BitSequence::new())];
        while let Some((node, path)) = stack.pop() {
            if path.len() > max_depth {
                return Err(CodecError::TreeTooDeep { limit: max_depth });
            }

            match node {
                Node::Leaf { symbol, .. } => codes.push((*symbol, path)),
                Node::Internal { left, right, .. } => {
                    let mut right_path = path.clone();
                    right_path.push(true);
                    stack.push((right.as_ref(), right_path));

                    let mut left_path = path;
                    left_path.push(false);
                    stack.push((left.as_ref(), left_path));
                }
            }
        }

        Self::from_codes(codes)
    }

    /// Assemble a table from explicit `(symbol, code)` pairs.
    ///
    /// Rejects empty codes, repeated symbols or codes, and code sets that
    /// aren't prefix-free.
    pub fn from_codes(codes: impl IntoIterator<Item = (u8, BitSequence)>) -> Result<Self> {
        let mut sym_to_code = BTreeMap::new();
        let mut code_to_sym = HashMap::new();
        let mut max_code_len = 0;

        for (symbol, code) in codes {
            if code.is_empty() {
                let msg = format!("empty code for symbol {symbol:#04x}");
                return Err(CodecError::InvalidInput(msg));
            }
            if sym_to_code.contains_key(&symbol) {
                let msg = format!("symbol {symbol:#04x} appears twice");
                return Err(CodecError::InvalidInput(msg));
            }
            if let Some(other) = code_to_sym.insert(code.clone(), symbol) {
                let msg = format!("symbols {other:#04x} and {symbol:#04x} share code {code:b}");
                return Err(CodecError::InvalidInput(msg));
            }

            max_code_len = max_code_len.max(code.len());
            sym_to_code.insert(symbol, code);
        }

        if sym_to_code.is_empty() {
            return Err(CodecError::InvalidInput("code table is empty".into()));
        }

        // In lexicographic order, a code is followed directly by anything it
        // is a prefix of.
        let mut sorted: Vec<&BitSequence> = sym_to_code.values().collect();
        sorted.sort();
        let prefixed = sorted
            .windows(2)
            .find(|pair| pair[1].starts_with(pair[0].as_bitslice()));
        if let Some(pair) = prefixed {
            let msg = format!("code {:b} is a prefix of {:b}", pair[0], pair[1]);
            return Err(CodecError::InvalidInput(msg));
        }

        Ok(Self {
            sym_to_code,
            code_to_sym,
            max_code_len,
        })
    }

    pub fn len(&self) -> usize {
        self.sym_to_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sym_to_code.is_empty()
    }

    pub fn code(&self, symbol: u8) -> Option<&Bits> {
        self.sym_to_code.get(&symbol).map(BitSequence::as_bitslice)
    }

    pub fn symbol(&self, code: &BitSequence) -> Option<u8> {
        self.code_to_sym.get(code).copied()
    }

    /// Length of the longest code in the table.
    pub fn max_code_len(&self) -> usize {
        self.max_code_len
    }

    /// `(symbol, code)` pairs, in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Bits)> + '_ {
        self.sym_to_code.iter().map(|(&s, c)| (s, c.as_bitslice()))
    }

    /// Concatenate the codes of every input symbol.
    pub fn encode(&self, input: &[u8]) -> Result<BitSequence> {
        if input.is_empty() {
            return Err(CodecError::EmptyInput);
        }

        let mut bits = BitSequence::new();
        for &symbol in input {
            let code = self.code(symbol).ok_or_else(|| {
                CodecError::InvalidInput(format!("symbol {symbol:#04x} is not in the code table"))
            })?;
            bits.extend_from_bitslice(code);
        }
        Ok(bits)
    }

    /// Split `bits` back into codes and map each one to its symbol.
    pub fn decode(&self, bits: &Bits) -> Result<Vec<u8>> {
        let mut output = vec![];
        let mut pending = BitSequence::with_capacity(self.max_code_len);

        for (i, bit) in bits.iter().by_vals().enumerate() {
            pending.push(bit);
            if let Some(symbol) = self.symbol(&pending) {
                output.push(symbol);
                pending.clear();
            } else if pending.len() >= self.max_code_len {
                let msg = format!(
                    "no code matches the {} bits ending at bit {i}",
                    pending.len()
                );
                return Err(CodecError::CorruptStream(msg));
            }
        }

        if !pending.is_empty() {
            let msg = format!("{} trailing bits don't form a complete code", pending.len());
            return Err(CodecError::CorruptStream(msg));
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::{
        rand_core::{RngCore, SeedableRng},
        ChaCha8Rng,
    };
    use test_case::test_case;

    use super::*;
    use crate::huffman::tree::FrequencyTable;

    fn code(s: &str) -> BitSequence {
        s.chars().map(|c| c == '1').collect()
    }

    fn table_for(input: &[u8]) -> CodeTable {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(input)).unwrap();
        CodeTable::from_tree(&tree, 255).unwrap()
    }

    /// Frequencies following the fibonacci sequence give the most lopsided
    /// tree possible: one more level per symbol.
    fn fibonacci_frequencies(n: usize) -> FrequencyTable {
        let (mut a, mut b) = (1u64, 1u64);
        (0..n as u8)
            .map(|symbol| {
                let f = a;
                (a, b) = (b, a + b);
                (symbol, f)
            })
            .collect()
    }

    #[test]
    fn example() {
        let actual = table_for(b"abracadabra");

        // a:5 b:2 r:2 c:1 d:1
        let expected: HashMap<_, _> = [
            ("0", b'a'),
            ("100", b'c'),
            ("101", b'd'),
            ("110", b'b'),
            ("111", b'r'),
        ]
        .into_iter()
        .map(|(c, s)| (code(c), s))
        .collect();

        assert_eq!(actual.code_to_sym, expected);
        assert_eq!(actual.max_code_len(), 3);
    }

    #[test]
    fn aaab() {
        let table = table_for(b"AAAB");
        assert_eq!(table.code(b'A'), Some(code("1").as_bitslice()));
        assert_eq!(table.code(b'B'), Some(code("0").as_bitslice()));

        let bits = table.encode(b"AAAB").unwrap();
        assert_eq!(bits, code("1110"));
        assert_eq!(table.decode(&bits).unwrap(), b"AAAB");
    }

    #[test]
    fn single_symbol_gets_a_one_bit_code() {
        let table = table_for(b"xxxxxxx");
        assert_eq!(table.len(), 1);
        assert_eq!(table.code(b'x'), Some(code("0").as_bitslice()));

        let bits = table.encode(b"xxxxxxx").unwrap();
        assert_eq!(bits.len(), 7);
        assert_eq!(table.decode(&bits).unwrap(), b"xxxxxxx");
    }

    #[test]
    fn random_tables_are_prefix_free_and_optimal() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        for _ in 0..50 {
            let n = 2 + rng.next_u32() as usize % 255;
            let freqs: FrequencyTable = (0..n)
                .map(|s| (s as u8, 1 + rng.next_u64() % 1000))
                .collect();
            let tree = HuffmanTree::build(&freqs).unwrap();
            let table = CodeTable::from_tree(&tree, 255).unwrap();
            assert_eq!(table.len(), freqs.len());

            let codes: Vec<_> = table.iter().collect();
            for &(s1, c1) in &codes {
                for &(s2, c2) in &codes {
                    if s1 == s2 {
                        continue;
                    }
                    assert!(!c2.starts_with(c1), "{c1:b} is a prefix of {c2:b}");

                    let (f1, f2) = (freqs.get(s1).unwrap(), freqs.get(s2).unwrap());
                    if f1 > f2 {
                        assert!(c1.len() <= c2.len());
                    }
                }
            }
        }
    }

    #[test]
    fn lopsided_tree_hits_the_depth_limit() {
        let tree = HuffmanTree::build(&fibonacci_frequencies(20)).unwrap();

        let table = CodeTable::from_tree(&tree, 19).unwrap();
        assert_eq!(table.max_code_len(), 19);

        let err = CodeTable::from_tree(&tree, 18).unwrap_err();
        assert_eq!(err, CodecError::TreeTooDeep { limit: 18 });
    }

    #[test]
    fn round_trips_random_bytes() {
        let mut input = vec![0; 10_000];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        rng.fill_bytes(&mut input);
        // Skew the distribution so codes have varied lengths.
        for b in input.iter_mut().step_by(3) {
            *b %= 4;
        }

        let table = table_for(&input);
        let bits = table.encode(&input).unwrap();
        assert_eq!(table.decode(&bits).unwrap(), input);
    }

    #[test]
    fn encoding_nothing_is_an_error() {
        let table = table_for(b"abc");
        assert_eq!(table.encode(b""), Err(CodecError::EmptyInput));
    }

    #[test]
    fn encoding_an_unknown_symbol_is_an_error() {
        let table = table_for(b"abc");
        assert!(matches!(
            table.encode(b"abd"),
            Err(CodecError::InvalidInput(_))
        ));
    }

    #[test_case(&[("0", b'a'), ("01", b'b')] ; "prefix")]
    #[test_case(&[("0", b'a'), ("0", b'b')] ; "duplicate code")]
    #[test_case(&[("0", b'a'), ("1", b'a')] ; "duplicate symbol")]
    #[test_case(&[("", b'a')] ; "empty code")]
    #[test_case(&[] ; "no entries")]
    fn malformed_tables_are_rejected(entries: &[(&str, u8)]) {
        let codes = entries.iter().map(|&(c, s)| (s, code(c)));
        assert!(matches!(
            CodeTable::from_codes(codes),
            Err(CodecError::InvalidInput(_))
        ));
    }

    #[test_case("1111" ; "no code matches")]
    #[test_case("0001" ; "incomplete trailing code")]
    fn corrupt_streams_are_rejected(bits: &str) {
        // a=0 b=10 c=110
        let table =
            CodeTable::from_codes([(b'a', code("0")), (b'b', code("10")), (b'c', code("110"))])
                .unwrap();
        assert!(matches!(
            table.decode(&code(bits)),
            Err(CodecError::CorruptStream(_))
        ));
    }
}
