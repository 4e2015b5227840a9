//! FASTA/FASTQ input via needletail
//!
//! Gzip-compressed files are detected and decompressed by needletail itself.
//! Record bodies are encoded with [`Sequence::from_bytes`], so any byte other
//! than `A`, `C`, `G`, `T` becomes a gap.

use std::path::Path;

use needletail::{parse_fastx_file, parse_fastx_reader};

use crate::error::{AlignError, AlignResult};
use crate::types::Sequence;

/// One named input sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: String,
    pub seq: Sequence,
}

impl FastaRecord {
    fn from_needletail(record: needletail::parser::SequenceRecord) -> Self {
        Self {
            id: String::from_utf8_lossy(record.id()).to_string(),
            seq: Sequence::from_bytes(&record.seq()),
        }
    }
}

/// Read every record of a FASTA/FASTQ file, in file order
pub fn read_fasta<P: AsRef<Path>>(path: P) -> AlignResult<Vec<FastaRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AlignError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )));
    }

    let mut reader = parse_fastx_file(path).map_err(|e| AlignError::Parse(e.to_string()))?;
    let mut records = Vec::new();
    while let Some(record) = reader.next() {
        let record = record.map_err(|e| AlignError::Parse(e.to_string()))?;
        records.push(FastaRecord::from_needletail(record));
    }

    log::debug!("Read {} records from {}", records.len(), path.display());
    non_empty(records)
}

/// Parse FASTA/FASTQ data from any reader
pub fn parse_fasta<R: std::io::Read + Send>(reader: R) -> AlignResult<Vec<FastaRecord>> {
    let mut fastx = parse_fastx_reader(reader).map_err(|e| AlignError::Parse(e.to_string()))?;
    let mut records = Vec::new();
    while let Some(record) = fastx.next() {
        let record = record.map_err(|e| AlignError::Parse(e.to_string()))?;
        records.push(FastaRecord::from_needletail(record));
    }
    non_empty(records)
}

fn non_empty(records: Vec<FastaRecord>) -> AlignResult<Vec<FastaRecord>> {
    if records.is_empty() {
        Err(AlignError::Parse("no sequences found".to_string()))
    } else {
        Ok(records)
    }
}
