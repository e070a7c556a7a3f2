//! Multiple sequence alignment of a FASTA file
//!
//! A FASTA holding one record needs no alignment and is copied unchanged;
//! anything larger goes through MAFFT.

use crate::config::AlignConfig;
use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};
use toa_common::{LineReader, Result, ToaError};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignOutcome {
    Copied,
    Aligned,
}

/// Count the `>` header lines of a FASTA file
pub fn count_fasta_records(path: &Path) -> Result<usize> {
    let mut reader = LineReader::open(path)?;
    let mut records = 0;
    while let Some(line) = reader.next_line()? {
        if line.starts_with('>') {
            records += 1;
        }
    }
    Ok(records)
}

/// Align `fasta` into `output`
pub fn align(fasta: &Path, output: &Path, config: &AlignConfig) -> Result<AlignOutcome> {
    let records = count_fasta_records(fasta)?;
    debug!(fasta = %fasta.display(), records, "FASTA scanned");

    if records <= 1 {
        std::fs::copy(fasta, output).map_err(|e| ToaError::file_create(output, e))?;
        info!(output = %output.display(), "single sequence copied without alignment");
        return Ok(AlignOutcome::Copied);
    }

    let stdout = File::create(output).map_err(|e| ToaError::file_create(output, e))?;
    let threads = config.threads.max(1).to_string();

    info!(program = %config.program, records, threads = %threads, "running aligner");
    let result = Command::new(&config.program)
        .args(["--auto", "--thread", &threads])
        .arg(fasta)
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| ToaError::module(&config.program, e.to_string()))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let message = match stderr.trim() {
            "" => result.status.to_string(),
            text => text.to_string(),
        };
        return Err(ToaError::module(&config.program, message));
    }

    info!(output = %output.display(), "alignment written");
    Ok(AlignOutcome::Aligned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_single_record_is_copied() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = dir.path().join("one.fasta");
        let output = dir.path().join("one.aln");
        let content = ">seq1 Quercus robur\nMKTAYIAKQR\nQISFVKSHFS\n";
        std::fs::write(&fasta, content).unwrap();

        let outcome = align(&fasta, &output, &AlignConfig::default()).unwrap();

        assert_eq!(outcome, AlignOutcome::Copied);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), content);
    }

    #[test]
    fn test_count_records() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = dir.path().join("two.fasta");
        std::fs::write(&fasta, ">a\nMK\n>b\nMR\n").unwrap();
        assert_eq!(count_fasta_records(&fasta).unwrap(), 2);
    }

    #[test]
    fn test_missing_aligner_is_module_error() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = dir.path().join("two.fasta");
        std::fs::write(&fasta, ">a\nMK\n>b\nMR\n").unwrap();
        let config = AlignConfig {
            program: "toa-no-such-aligner".to_string(),
            threads: 2,
        };

        let err = align(&fasta, &dir.path().join("two.aln"), &config).unwrap_err();
        assert_eq!(err.code(), "M001");
        assert!(err.to_string().contains("toa-no-such-aligner"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_aligner_is_module_error() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = dir.path().join("two.fasta");
        std::fs::write(&fasta, ">a\nMK\n>b\nMR\n").unwrap();
        let config = AlignConfig {
            program: "false".to_string(),
            threads: 1,
        };

        let err = align(&fasta, &dir.path().join("two.aln"), &config).unwrap_err();
        assert_eq!(err.code(), "M001");
    }
}
