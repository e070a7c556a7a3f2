//! Homology Relationship Resolver
//!
//! For the best hit of each query: cluster representative protein, then all
//! isoforms of its gene, then the lifted-over orthologs of every isoform.
//! Relationships are keyed by (species id, gene id) within one query.

use crate::lookup::LookupProvider;
use crate::merge::GroupMerger;
use crate::progress::RecordCounter;
use crate::reader::RecordReader;
use crate::records::{FunctionalAnnotation, HomologyRelationship, HOMOLOGY_COLUMNS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use toa_common::{LineWriter, Result};
use tracing::{debug, info};

/// What happens when a (species, gene) key is written twice
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// The later isoform list replaces the earlier one
    #[default]
    LastWriteWins,
    /// Isoform lists are merged, first appearance order kept
    Union,
}

/// Relationships of one query sequence
#[derive(Debug, Clone)]
pub struct HomologySet {
    sequence_id: String,
    strategy: MergeStrategy,
    entries: BTreeMap<(String, String), Vec<String>>,
}

impl HomologySet {
    pub fn new(sequence_id: impl Into<String>, strategy: MergeStrategy) -> Self {
        Self {
            sequence_id: sequence_id.into(),
            strategy,
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, species_id: &str, gene_id: &str, isoforms: Vec<String>) {
        let key = (species_id.to_string(), gene_id.to_string());
        match self.strategy {
            MergeStrategy::LastWriteWins => {
                self.entries.insert(key, isoforms);
            },
            MergeStrategy::Union => {
                let existing = self.entries.entry(key).or_default();
                for isoform in isoforms {
                    if !existing.contains(&isoform) {
                        existing.push(isoform);
                    }
                }
            },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Relationships sorted by species and gene
    pub fn into_relationships(self) -> Vec<HomologyRelationship> {
        let sequence_id = self.sequence_id;
        self.entries
            .into_iter()
            .map(|((species_id, gene_id), isoforms)| HomologyRelationship {
                sequence_id: sequence_id.clone(),
                species_id,
                gene_id,
                isoforms,
            })
            .collect()
    }
}

/// Resolve the homologs of one best hit
pub fn resolve<L: LookupProvider>(
    lookup: &L,
    best: &FunctionalAnnotation,
    strategy: MergeStrategy,
) -> Result<HomologySet> {
    let mut set = HomologySet::new(&best.query_id, strategy);
    if best.is_placeholder() {
        return Ok(set);
    }

    let Some(cluster) = lookup.cluster(&best.subject_id)? else {
        debug!(cluster = %best.subject_id, "cluster not found");
        return Ok(set);
    };
    let (Some(species), Some(protein)) = (
        cluster.representative_species_id,
        cluster.representative_protein_id,
    ) else {
        debug!(cluster = %best.subject_id, "cluster without representative protein");
        return Ok(set);
    };
    let Some(gene) = lookup.gene_of_protein(&species, &protein)? else {
        debug!(%species, %protein, "representative protein without gene");
        return Ok(set);
    };

    let isoforms = lookup.gene_isoforms(&species, &gene)?;
    set.insert(&species, &gene, isoforms.clone());

    for isoform in &isoforms {
        let mut targets: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
        for hit in lookup.orthologs(&species, isoform)? {
            targets
                .entry((hit.species_id, hit.gene_id))
                .or_default()
                .push(hit.protein_id);
        }
        for ((target_species, target_gene), proteins) in targets {
            set.insert(&target_species, &target_gene, proteins);
        }
    }

    Ok(set)
}

/// Counters of a homology run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomologySummary {
    pub queries: u64,
    pub resolved: u64,
    pub relationships: u64,
}

/// Resolve the best hit of every query of an annotation file
pub fn write_relationships<L: LookupProvider>(
    lookup: &L,
    annotations: &Path,
    output: &Path,
    strategy: MergeStrategy,
    progress: &RecordCounter,
) -> Result<HomologySummary> {
    info!(file = %annotations.display(), ?strategy, "resolving homology relationships");
    progress.restart("annotations");

    let mut writer = LineWriter::create(output)?;
    writer.write_line(&HOMOLOGY_COLUMNS.join(";"))?;

    let mut summary = HomologySummary::default();
    let mut merger: GroupMerger<FunctionalAnnotation> = GroupMerger::new();

    let mut emit = |best: &FunctionalAnnotation, summary: &mut HomologySummary| -> Result<()> {
        summary.queries += 1;
        let set = resolve(lookup, best, strategy)?;
        if !set.is_empty() {
            summary.resolved += 1;
        }
        for relationship in set.into_relationships() {
            writer.write_line(&relationship.to_line())?;
            summary.relationships += 1;
        }
        Ok(())
    };

    for read in RecordReader::annotations(annotations)? {
        let record = read?.record;
        progress.inc();
        if let Some(group) = merger.begin(&record.query_id) {
            emit(&group.best, &mut summary)?;
        }
        merger.offer(record);
    }
    if let Some(group) = merger.finish() {
        emit(&group.best, &mut summary)?;
    }
    progress.finish();
    writer.finish()?;

    info!(
        queries = summary.queries,
        resolved = summary.resolved,
        relationships = summary.relationships,
        "homology relationships written"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::lookup::fixture;
    use crate::records::{AlignmentRecord, Algorithm, AnnotationInfo, HitMetrics};

    fn best_hit(query: &str, cluster: &str) -> FunctionalAnnotation {
        let record = AlignmentRecord {
            query_id: query.to_string(),
            subject_id: cluster.to_string(),
            metrics: HitMetrics {
                pident: 99.0.into(),
                length: 100,
                mismatch: 1,
                gapopen: 0,
                qstart: 1,
                qend: 100,
                sstart: 1,
                send: 100,
                evalue: 1e-50.into(),
                bitscore: 300.0.into(),
            },
            algorithm: Algorithm::Blastp,
        };
        FunctionalAnnotation::from_alignment(record, AnnotationInfo::default())
    }

    fn find<'a>(
        relationships: &'a [HomologyRelationship],
        species: &str,
        gene: &str,
    ) -> &'a HomologyRelationship {
        relationships
            .iter()
            .find(|r| r.species_id == species && r.gene_id == gene)
            .unwrap()
    }

    #[test]
    fn test_last_write_wins_overwrites() {
        let set = resolve(&fixture::lookup(), &best_hit("s1", "c1"), MergeStrategy::LastWriteWins)
            .unwrap();
        let relationships = set.into_relationships();

        assert_eq!(relationships.len(), 3);
        assert_eq!(
            find(&relationships, "qrobur", "Qrob_G001").isoforms,
            vec!["Qrob_P001.1", "Qrob_P001.2"]
        );
        assert_eq!(
            find(&relationships, "qsuber", "Qsub_G001").isoforms,
            vec!["Qsub_P001.2"]
        );
        assert_eq!(
            find(&relationships, "qlobata", "Qlob_G001").isoforms,
            vec!["Qlob_P001.1"]
        );
        assert!(relationships.iter().all(|r| r.sequence_id == "s1"));
    }

    #[test]
    fn test_union_merges_isoforms() {
        let set =
            resolve(&fixture::lookup(), &best_hit("s1", "c1"), MergeStrategy::Union).unwrap();
        let relationships = set.into_relationships();

        assert_eq!(
            find(&relationships, "qsuber", "Qsub_G001").isoforms,
            vec!["Qsub_P001.1", "Qsub_P001.2"]
        );
    }

    #[test]
    fn test_unresolvable_hits_are_empty() {
        let lookup = fixture::lookup();
        let placeholder = FunctionalAnnotation::lncrna_placeholder("s2");
        assert!(resolve(&lookup, &placeholder, MergeStrategy::Union)
            .unwrap()
            .is_empty());
        assert!(resolve(&lookup, &best_hit("s3", "unknown"), MergeStrategy::Union)
            .unwrap()
            .is_empty());
        // representative protein has no gene entry
        assert!(resolve(&lookup, &best_hit("s4", "c3"), MergeStrategy::Union)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_merge_strategy_names() {
        use clap::ValueEnum;
        let parsed = MergeStrategy::from_str("last-write-wins", false).unwrap();
        assert_eq!(parsed, MergeStrategy::LastWriteWins);
        assert_eq!(
            MergeStrategy::from_str("union", false).unwrap(),
            MergeStrategy::Union
        );
    }
}
