//! Frequency Aggregator
//!
//! Builds the species, GO term, namespace and GO-terms-per-sequence tables
//! from a complete annotation file. Each key carries two counters: `best`
//! (credited once per query through its best hit) and `complete` (credited
//! by every non-placeholder hit).

use crate::config::StatsConfig;
use crate::lookup::LookupProvider;
use crate::merge::{Group, GroupMerger};
use crate::progress::RecordCounter;
use crate::reader::RecordReader;
use crate::records::FunctionalAnnotation;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::collections::BTreeMap;
use std::path::Path;
use toa_common::codec::encode_latin1;
use toa_common::{LineWriter, Result, ToaError};
use tracing::{debug, info};

/// Name and namespace written for GO ids missing from the ontology
pub const NOT_AVAILABLE: &str = "N/A";

/// Counter pair of one statistics key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub best: u64,
    pub complete: u64,
}

impl std::ops::AddAssign for Counts {
    fn add_assign(&mut self, other: Self) {
        self.best += other.best;
        self.complete += other.complete;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatTable {
    Species,
    GoTerm,
}

/// Which counter a hit credits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tally {
    Best,
    Complete,
}

/// Table → key → counters
#[derive(Debug)]
pub struct NestedCounts<T: Ord, K: Ord> {
    tables: BTreeMap<T, BTreeMap<K, Counts>>,
}

impl<T: Ord, K: Ord> Default for NestedCounts<T, K> {
    fn default() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }
}

impl<T: Ord, K: Ord> NestedCounts<T, K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters of `key`, inserted as zero when missing
    pub fn entry(&mut self, table: T, key: K) -> &mut Counts {
        self.tables
            .entry(table)
            .or_default()
            .entry(key)
            .or_default()
    }

    pub fn credit(&mut self, table: T, key: K, tally: Tally) {
        let counts = self.entry(table, key);
        match tally {
            Tally::Best => counts.best += 1,
            Tally::Complete => counts.complete += 1,
        }
    }

    pub fn get(&self, table: &T, key: &K) -> Option<Counts> {
        self.tables.get(table).and_then(|t| t.get(key)).copied()
    }

    /// Rows of a table in key order
    pub fn rows(&self, table: &T) -> impl Iterator<Item = (&K, &Counts)> {
        self.tables.get(table).into_iter().flat_map(|t| t.iter())
    }
}

/// Two whitespace tokens, the genus alphabetic and capitalised; no `sp.`
/// suffix and no `AltName` fragments.
pub fn is_binomial(name: &str) -> bool {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    let [genus, _] = tokens.as_slice() else {
        return false;
    };
    genus.chars().all(char::is_alphabetic)
        && genus.chars().next().is_some_and(char::is_uppercase)
        && !name.trim_end().ends_with("sp.")
        && !name.contains("AltName")
}

/// Aggregation context for one statistics run
#[derive(Debug, Default)]
pub struct StatsAggregator {
    counts: NestedCounts<StatTable, String>,
    histogram: BTreeMap<usize, u64>,
    merger: GroupMerger<FunctionalAnnotation>,
    records: u64,
    queries: u64,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record of the complete file
    pub fn add(&mut self, record: FunctionalAnnotation) {
        self.records += 1;
        if let Some(group) = self.merger.begin(&record.query_id) {
            self.credit_best(group);
        }
        if !record.is_placeholder() {
            self.credit(&record, Tally::Complete);
        }
        self.merger.offer(record);
    }

    /// Close the last group and hand over the tables
    pub fn finish(mut self) -> Statistics {
        if let Some(group) = self.merger.finish() {
            self.credit_best(group);
        }
        debug!(
            records = self.records,
            queries = self.queries,
            "statistics aggregated"
        );
        Statistics {
            counts: self.counts,
            histogram: self.histogram,
            queries: self.queries,
        }
    }

    fn credit_best(&mut self, group: Group<FunctionalAnnotation>) {
        self.queries += 1;
        let best = group.best;
        if best.is_placeholder() {
            return;
        }
        self.credit(&best, Tally::Best);
        *self.histogram.entry(best.go_terms().len()).or_default() += 1;
    }

    fn credit(&mut self, record: &FunctionalAnnotation, tally: Tally) {
        if let Some(species) = record.info.protein_species.as_deref() {
            let species = species.trim();
            if !species.is_empty() {
                self.counts
                    .credit(StatTable::Species, species.to_string(), tally);
            }
        }
        for term in record.go_terms() {
            self.counts.credit(StatTable::GoTerm, term.to_string(), tally);
        }
    }
}

/// One row of the GO term table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoTermRow {
    pub go_id: String,
    pub name: String,
    pub namespace: String,
    pub counts: Counts,
}

/// Finished tables of a statistics run
#[derive(Debug)]
pub struct Statistics {
    counts: NestedCounts<StatTable, String>,
    histogram: BTreeMap<usize, u64>,
    queries: u64,
}

impl Statistics {
    /// Species rows that pass the binomial filter, sorted by name
    pub fn species_rows(&self) -> Vec<(&str, Counts)> {
        self.counts
            .rows(&StatTable::Species)
            .filter(|(name, _)| is_binomial(name))
            .map(|(name, counts)| (name.as_str(), *counts))
            .collect()
    }

    pub fn species(&self, name: &str) -> Option<Counts> {
        self.counts.get(&StatTable::Species, &name.to_string())
    }

    pub fn goterm(&self, go_id: &str) -> Option<Counts> {
        self.counts.get(&StatTable::GoTerm, &go_id.to_string())
    }

    /// GO term rows with name and namespace resolved through `lookup`
    pub fn goterm_rows(&self, lookup: &impl LookupProvider) -> Result<Vec<GoTermRow>> {
        self.counts
            .rows(&StatTable::GoTerm)
            .map(|(go_id, counts)| {
                let (name, namespace) = match lookup.go_term(go_id)? {
                    Some(term) => (term.name, term.namespace),
                    None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
                };
                Ok(GoTermRow {
                    go_id: go_id.clone(),
                    name,
                    namespace,
                    counts: *counts,
                })
            })
            .collect()
    }

    /// GO term counters summed per namespace
    pub fn namespace_rows(goterms: &[GoTermRow]) -> BTreeMap<String, Counts> {
        let mut namespaces: BTreeMap<String, Counts> = BTreeMap::new();
        for row in goterms {
            *namespaces.entry(row.namespace.clone()).or_default() += row.counts;
        }
        namespaces
    }

    /// Number of GO terms of a best hit → number of query sequences
    pub fn histogram(&self) -> &BTreeMap<usize, u64> {
        &self.histogram
    }

    /// Query ids seen, placeholders included
    pub fn queries(&self) -> u64 {
        self.queries
    }
}

/// Aggregate a complete annotation file
pub fn aggregate(annotations: &Path, progress: &RecordCounter) -> Result<Statistics> {
    info!(file = %annotations.display(), "aggregating annotation statistics");
    progress.restart("annotations");

    let mut aggregator = StatsAggregator::new();
    for read in RecordReader::annotations(annotations)? {
        aggregator.add(read?.record);
        progress.inc();
    }
    progress.finish();

    Ok(aggregator.finish())
}

/// Write the four statistics files into `outdir`
pub fn write_statistics(
    stats: &Statistics,
    lookup: &impl LookupProvider,
    outdir: &Path,
    files: &StatsConfig,
) -> Result<()> {
    std::fs::create_dir_all(outdir).map_err(|e| ToaError::file_create(outdir, e))?;

    let species = stats.species_rows();
    write_table(
        &files.species_path(outdir),
        &["species", "best_hit", "all_hits"],
        species.iter().map(|(name, counts)| {
            vec![
                name.to_string(),
                counts.best.to_string(),
                counts.complete.to_string(),
            ]
        }),
    )?;

    let goterms = stats.goterm_rows(lookup)?;
    write_table(
        &files.goterms_path(outdir),
        &["goterm_id", "goterm_name", "namespace", "best_hit", "all_hits"],
        goterms.iter().map(|row| {
            vec![
                row.go_id.clone(),
                row.name.clone(),
                row.namespace.clone(),
                row.counts.best.to_string(),
                row.counts.complete.to_string(),
            ]
        }),
    )?;

    let namespaces = Statistics::namespace_rows(&goterms);
    write_table(
        &files.namespaces_path(outdir),
        &["namespace", "best_hit", "all_hits"],
        namespaces.iter().map(|(namespace, counts)| {
            vec![
                namespace.clone(),
                counts.best.to_string(),
                counts.complete.to_string(),
            ]
        }),
    )?;

    write_table(
        &files.seq_per_goterm_path(outdir),
        &["goterm_num", "seq_num"],
        stats
            .histogram()
            .iter()
            .map(|(terms, sequences)| vec![terms.to_string(), sequences.to_string()]),
    )?;

    info!(
        species = species.len(),
        goterms = goterms.len(),
        namespaces = namespaces.len(),
        outdir = %outdir.display(),
        "statistics written"
    );
    Ok(())
}

/// `;`-separated table with quoted text fields
fn write_table(
    path: &Path,
    header: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
) -> Result<()> {
    let sink = LineWriter::create(path)?;
    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .quote_style(QuoteStyle::NonNumeric)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(sink);

    let csv_error = |e: csv::Error| ToaError::file_write(path, std::io::Error::from(e));

    writer.write_record(header).map_err(csv_error)?;
    for row in rows {
        writer
            .write_record(row.iter().map(|field| encode_latin1(field)))
            .map_err(csv_error)?;
    }

    let sink = writer
        .into_inner()
        .map_err(|e| ToaError::file_write(path, e.into_error()))?;
    sink.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::lookup::fixture;
    use crate::records::{AlignmentRecord, Algorithm, AnnotationInfo, HitMetrics};

    fn annotation(
        query: &str,
        subject: &str,
        evalue: f64,
        species: &str,
        goterms: &str,
    ) -> FunctionalAnnotation {
        let record = AlignmentRecord {
            query_id: query.to_string(),
            subject_id: subject.to_string(),
            metrics: HitMetrics {
                pident: 90.0.into(),
                length: 100,
                mismatch: 0,
                gapopen: 0,
                qstart: 1,
                qend: 100,
                sstart: 1,
                send: 100,
                evalue: evalue.into(),
                bitscore: 100.0.into(),
            },
            algorithm: Algorithm::Blastp,
        };
        let info = AnnotationInfo {
            protein_species: Some(species.to_string()),
            interpro_goterms: Some(goterms.to_string()),
            ..Default::default()
        };
        FunctionalAnnotation::from_alignment(record, info)
    }

    #[test]
    fn test_binomial_filter() {
        assert!(is_binomial("Quercus robur"));
        assert!(!is_binomial("Quercus"));
        assert!(!is_binomial("Quercus robur subsp. robur"));
        assert!(!is_binomial("Quercus sp."));
        assert!(!is_binomial("quercus robur"));
        assert!(!is_binomial("Q3rcus robur"));
        assert!(!is_binomial("AltName: Full=Dehydrin"));
    }

    #[test]
    fn test_nested_counts_get_or_insert() {
        let mut counts: NestedCounts<StatTable, String> = NestedCounts::new();
        counts.credit(StatTable::Species, "Quercus robur".to_string(), Tally::Complete);
        counts.credit(StatTable::Species, "Quercus robur".to_string(), Tally::Best);
        counts.entry(StatTable::GoTerm, "GO:1".to_string());

        assert_eq!(
            counts.get(&StatTable::Species, &"Quercus robur".to_string()),
            Some(Counts {
                best: 1,
                complete: 1
            })
        );
        assert_eq!(
            counts.get(&StatTable::GoTerm, &"GO:1".to_string()),
            Some(Counts::default())
        );
        assert_eq!(counts.rows(&StatTable::Species).count(), 1);
    }

    #[test]
    fn test_best_and_complete_crediting() {
        let mut aggregator = StatsAggregator::new();
        aggregator.add(annotation("q1", "c1", 1e-5, "Quercus robur", "GO:1|GO:2"));
        aggregator.add(annotation("q1", "c2", 1e-9, "Quercus suber", "GO:2"));
        aggregator.add(annotation("q2", "c3", 1e-3, "Quercus robur", "-"));
        aggregator.add(FunctionalAnnotation::lncrna_placeholder("q3"));
        let stats = aggregator.finish();

        assert_eq!(
            stats.species("Quercus robur"),
            Some(Counts {
                best: 1,
                complete: 2
            })
        );
        assert_eq!(
            stats.species("Quercus suber"),
            Some(Counts {
                best: 1,
                complete: 1
            })
        );
        assert_eq!(
            stats.goterm("GO:1"),
            Some(Counts {
                best: 0,
                complete: 1
            })
        );
        assert_eq!(
            stats.goterm("GO:2"),
            Some(Counts {
                best: 1,
                complete: 2
            })
        );

        // q1 best has one term, q2 none, q3 is a placeholder
        let histogram: Vec<_> = stats.histogram().iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(histogram, vec![(0, 1), (1, 1)]);
        assert_eq!(stats.queries(), 3);
    }

    #[test]
    fn test_unknown_goterm_is_not_available() {
        let mut aggregator = StatsAggregator::new();
        aggregator.add(annotation("q1", "c1", 1e-5, "Quercus robur", "GO:0003677|GO:9999999"));
        let stats = aggregator.finish();

        let rows = stats.goterm_rows(&fixture::lookup()).unwrap();
        let unknown = rows.iter().find(|r| r.go_id == "GO:9999999").unwrap();
        assert_eq!(unknown.name, NOT_AVAILABLE);
        assert_eq!(unknown.namespace, NOT_AVAILABLE);

        let namespaces = Statistics::namespace_rows(&rows);
        assert_eq!(
            namespaces.get(NOT_AVAILABLE),
            Some(&Counts {
                best: 1,
                complete: 1
            })
        );
        assert_eq!(namespaces["molecular_function"].complete, 1);
    }

    #[test]
    fn test_write_statistics_files() {
        let mut aggregator = StatsAggregator::new();
        aggregator.add(annotation("q1", "c1", 1e-5, "Quercus robur", "GO:0003677"));
        aggregator.add(annotation("q2", "c2", 1e-5, "Fagus sp.", "-"));
        let stats = aggregator.finish();

        let dir = tempfile::tempdir().unwrap();
        let files = StatsConfig::default();
        write_statistics(&stats, &fixture::lookup(), dir.path(), &files).unwrap();

        let species = std::fs::read_to_string(files.species_path(dir.path())).unwrap();
        assert_eq!(
            species,
            "\"species\";\"best_hit\";\"all_hits\"\n\"Quercus robur\";1;1\n"
        );

        let goterms = std::fs::read_to_string(files.goterms_path(dir.path())).unwrap();
        assert!(goterms.contains("\"GO:0003677\";\"DNA binding\";\"molecular_function\";1;1"));

        let histogram = std::fs::read_to_string(files.seq_per_goterm_path(dir.path())).unwrap();
        assert_eq!(histogram, "\"goterm_num\";\"seq_num\"\n0;1\n1;1\n");
    }
}
