//! Pipeline configuration
//!
//! Optional TOML file (`--config` or `TOA_CONFIG`) overriding output names
//! and defaults of the batch tools:
//!
//! ```toml
//! [stats]
//! species = "stats-species.csv"
//! gzip = true
//!
//! [homology]
//! merge_strategy = "union"
//!
//! [align]
//! program = "/opt/mafft/bin/mafft"
//! threads = 8
//! ```

use crate::homology::MergeStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use toa_common::{Result, ToaError};
use tracing::debug;

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SPECIES_FILE: &str = "stats-species.csv";
pub const DEFAULT_GOTERMS_FILE: &str = "stats-goterms.csv";
pub const DEFAULT_NAMESPACES_FILE: &str = "stats-namespaces.csv";
pub const DEFAULT_SEQ_PER_GOTERM_FILE: &str = "stats-seq-per-goterm.csv";
pub const DEFAULT_ALIGNER: &str = "mafft";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub stats: StatsConfig,
    pub homology: HomologyConfig,
    pub align: AlignConfig,
}

/// Names of the four statistics files written into `--outdir`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatsConfig {
    pub species: String,
    pub goterms: String,
    pub namespaces: String,
    pub seq_per_goterm: String,
    /// Append `.gz` to every name and compress the files
    pub gzip: bool,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            species: DEFAULT_SPECIES_FILE.to_string(),
            goterms: DEFAULT_GOTERMS_FILE.to_string(),
            namespaces: DEFAULT_NAMESPACES_FILE.to_string(),
            seq_per_goterm: DEFAULT_SEQ_PER_GOTERM_FILE.to_string(),
            gzip: false,
        }
    }
}

impl StatsConfig {
    fn resolve(&self, outdir: &Path, name: &str) -> PathBuf {
        if self.gzip {
            outdir.join(format!("{name}.gz"))
        } else {
            outdir.join(name)
        }
    }

    pub fn species_path(&self, outdir: &Path) -> PathBuf {
        self.resolve(outdir, &self.species)
    }

    pub fn goterms_path(&self, outdir: &Path) -> PathBuf {
        self.resolve(outdir, &self.goterms)
    }

    pub fn namespaces_path(&self, outdir: &Path) -> PathBuf {
        self.resolve(outdir, &self.namespaces)
    }

    pub fn seq_per_goterm_path(&self, outdir: &Path) -> PathBuf {
        self.resolve(outdir, &self.seq_per_goterm)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HomologyConfig {
    pub merge_strategy: MergeStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlignConfig {
    pub program: String,
    pub threads: usize,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_ALIGNER.to_string(),
            threads: 1,
        }
    }
}

impl PipelineConfig {
    /// Load the configuration file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|e| ToaError::file_open(path, e))?;
        let config = Self::from_toml(&text)
            .map_err(|e| ToaError::config(format!("{}: {}", path.display(), e)))?;

        debug!(config = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
