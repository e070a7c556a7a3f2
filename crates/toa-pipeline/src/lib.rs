//! TOA annotation pipeline
//!
//! Reconciles per-algorithm alignment outputs into functional annotations of
//! oak sequences and derives statistics and homology relationships from them.
//!
//! # Stages
//!
//! - [`reader`]: typed records out of the alignment, annotation and homology layouts
//! - [`lookup`]: keyed read-only access to the annotation database
//! - [`merge`]: best-hit fold over records grouped by query id
//! - [`dedup`]: blastp → blastx → blastn priority merge into complete and best-hit files
//! - [`stats`]: species, GO term and namespace frequency tables
//! - [`homology`]: homologous genes of every best hit
//! - [`align`]: MAFFT alignment of a FASTA file
//!
//! Each stage is driven by one executable under `src/bin`.
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod align;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod homology;
pub mod lookup;
pub mod merge;
pub mod progress;
pub mod reader;
pub mod records;
pub mod stats;

pub use config::PipelineConfig;
pub use lookup::{LookupProvider, SqliteLookup};
pub use reader::{ReadOutcome, ReadRecord, RecordReader};
pub use records::{AlignmentRecord, Algorithm, FunctionalAnnotation, HomologyRelationship};
