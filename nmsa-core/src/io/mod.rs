//! Sequence input formats

#[cfg(feature = "io-fasta")] pub mod fasta;

#[cfg(feature = "io-fasta")] pub use fasta::{parse_fasta, read_fasta, FastaRecord};
