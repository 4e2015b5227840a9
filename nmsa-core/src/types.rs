use serde::{Deserialize, Serialize};
use std::fmt;

/// Alignment score in the scorer's integer (scaled) units
pub type Score = i32;

/// One position of an alignment column: a nucleotide or a gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    A,
    C,
    G,
    T,
    Gap,
}

impl Symbol {
    pub fn is_gap(self) -> bool {
        matches!(self, Symbol::Gap)
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        match c {
            'A' => Symbol::A,
            'C' => Symbol::C,
            'G' => Symbol::G,
            'T' => Symbol::T,
            _ => Symbol::Gap, // Anything unrecognized is read as a gap
        }
    }
}

impl From<u8> for Symbol {
    fn from(b: u8) -> Self {
        Symbol::from(b as char)
    }
}

impl From<Symbol> for char {
    fn from(symbol: Symbol) -> Self {
        match symbol {
            Symbol::A => 'A',
            Symbol::C => 'C',
            Symbol::G => 'G',
            Symbol::T => 'T',
            Symbol::Gap => '-',
        }
    }
}

/// An immutable, 0-indexed run of symbols
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Sequence {
    symbols: Vec<Symbol>,
}

impl Sequence {
    /// Encode a raw string; characters other than `A`, `C`, `G`, `T` become gaps
    pub fn encode(raw: &str) -> Self {
        Self {
            symbols: raw.chars().map(Symbol::from).collect(),
        }
    }

    /// Encode raw bytes, e.g. a FASTA record body
    pub fn from_bytes(raw: &[u8]) -> Self {
        Self {
            symbols: raw.iter().copied().map(Symbol::from).collect(),
        }
    }

    pub fn encode_all<S: AsRef<str>>(raws: &[S]) -> Vec<Self> {
        raws.iter().map(|raw| Self::encode(raw.as_ref())).collect()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.symbols.get(index).copied()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}

impl From<Vec<Symbol>> for Sequence {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &symbol in &self.symbols {
            write!(f, "{}", char::from(symbol))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_bases() {
        let seq = Sequence::encode("AATTATGG");
        assert_eq!(
            seq.symbols(),
            &[
                Symbol::A,
                Symbol::A,
                Symbol::T,
                Symbol::T,
                Symbol::A,
                Symbol::T,
                Symbol::G,
                Symbol::G
            ]
        );
        assert_eq!(seq.len(), 8);
        assert_eq!(seq.to_string(), "AATTATGG");
    }

    #[test]
    fn test_unrecognized_characters_are_gaps() {
        let seq = Sequence::encode("AN-c?");
        assert_eq!(
            seq.symbols(),
            &[Symbol::A, Symbol::Gap, Symbol::Gap, Symbol::Gap, Symbol::Gap]
        );
    }

    #[test]
    fn test_bytes_match_chars() {
        assert_eq!(Sequence::from_bytes(b"GATTACA"), Sequence::encode("GATTACA"));
    }

    #[test]
    fn test_encode_all() {
        let seqs = Sequence::encode_all(&["AC", "", "T"]);
        assert_eq!(seqs.len(), 3);
        assert!(seqs[1].is_empty());
        assert_eq!(seqs[2].get(0), Some(Symbol::T));
        assert_eq!(seqs[2].get(1), None);
    }

    proptest! {
        #[test]
        fn prop_non_base_characters_encode_as_gap(c in any::<char>()) {
            prop_assume!(!matches!(c, 'A' | 'C' | 'G' | 'T'));
            prop_assert_eq!(Symbol::from(c), Symbol::Gap);
        }

        #[test]
        fn prop_base_strings_round_trip(raw in "[ACGT]{0,32}") {
            prop_assert_eq!(Sequence::encode(&raw).to_string(), raw);
        }
    }
}
