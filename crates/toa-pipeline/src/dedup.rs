//! Cross-Source Deduplicator
//!
//! Merges the blastp, blastx and blastn alignment streams, in that priority,
//! into the complete and best-hit annotation files. A query id annotated by
//! an earlier stream is ignored by the later ones.

use crate::lookup::LookupProvider;
use crate::merge::{Group, GroupMerger};
use crate::progress::RecordCounter;
use crate::reader::{ReadOutcome, RecordReader};
use crate::records::{
    AlignmentRecord, Algorithm, AnnotationInfo, FunctionalAnnotation, ANNOTATION_COLUMNS,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use toa_common::{LineWriter, Result};
use tracing::{debug, info, warn};

/// Alignment inputs of a merge run
#[derive(Debug, Clone)]
pub struct AlignmentSources {
    pub blastp: PathBuf,
    pub blastx: Option<PathBuf>,
    /// lncRNA detector output
    pub blastn: Option<PathBuf>,
}

/// Counters reported at the end of a merge run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub records: u64,
    /// Rows written to the complete file (header excluded)
    pub complete_rows: u64,
    /// Rows written to the best-hit file (header excluded)
    pub best_rows: u64,
    pub repeated_pairs: u64,
    /// Hits whose subject is unknown to the database
    pub unannotated: u64,
    pub skipped_seen: u64,
    pub lncrna: u64,
}

pub struct Deduplicator<'a, L: LookupProvider> {
    lookup: &'a L,
    complete: LineWriter,
    best: LineWriter,
    seen: HashSet<String>,
    summary: MergeSummary,
    progress: &'a RecordCounter,
}

impl<'a, L: LookupProvider> Deduplicator<'a, L> {
    /// Create both output files and write their header rows
    pub fn create(
        lookup: &'a L,
        complete_path: &Path,
        best_path: &Path,
        progress: &'a RecordCounter,
    ) -> Result<Self> {
        let header = ANNOTATION_COLUMNS.join(";");

        let mut complete = LineWriter::create(complete_path)?;
        complete.write_line(&header)?;
        let mut best = LineWriter::create(best_path)?;
        best.write_line(&header)?;

        Ok(Self {
            lookup,
            complete,
            best,
            seen: HashSet::new(),
            summary: MergeSummary::default(),
            progress,
        })
    }

    /// Annotate a blastp or blastx stream, skipping query ids already seen
    pub fn merge_alignments(&mut self, path: &Path, algorithm: Algorithm) -> Result<()> {
        info!(file = %path.display(), %algorithm, "merging alignments");
        self.progress.restart(algorithm.as_str());

        let mut reader = RecordReader::alignments(path, algorithm)?;
        let mut merger: GroupMerger<FunctionalAnnotation> = GroupMerger::new();
        let mut skipping = false;

        loop {
            let read = match reader.read_next()? {
                ReadOutcome::Record(read) => read,
                ReadOutcome::Done => break,
            };
            self.summary.records += 1;
            self.progress.inc();

            if merger.current_key() != Some(read.key()) {
                if let Some(group) = merger.begin(read.key()) {
                    self.close_group(group)?;
                }
                skipping = self.seen.contains(read.key());
                if skipping && algorithm == Algorithm::Blastp {
                    warn!(query = read.key(), "records of query are not contiguous");
                }
            }

            if skipping {
                self.summary.skipped_seen += 1;
                continue;
            }

            // a repeated HSP still competes for the best hit but gets no complete row
            let pair = read.pair_key();
            let first_of_pair = merger.admit_pair(&pair);
            let annotation = self.annotate(read.record)?;
            if first_of_pair {
                self.write_complete(&annotation)?;
            } else {
                debug!(%pair, "repeated HSP kept out of the complete file");
                self.summary.repeated_pairs += 1;
            }
            merger.offer(annotation);
        }

        if let Some(group) = merger.finish() {
            self.close_group(group)?;
        }
        Ok(())
    }

    /// Emit a placeholder for every query of the nucleotide search not yet seen
    pub fn merge_lncrna(&mut self, path: &Path) -> Result<()> {
        info!(file = %path.display(), "merging lncRNA candidates");
        self.progress.restart(Algorithm::Blastn.as_str());

        for read in RecordReader::alignments(path, Algorithm::Blastn)? {
            let read = read?;
            self.summary.records += 1;
            self.progress.inc();

            if self.seen.contains(read.key()) {
                self.summary.skipped_seen += 1;
                continue;
            }

            let placeholder = FunctionalAnnotation::lncrna_placeholder(read.key());
            self.write_complete(&placeholder)?;
            self.write_best(&placeholder)?;
            self.seen.insert(placeholder.query_id);
            self.summary.lncrna += 1;
        }
        Ok(())
    }

    /// Flush both outputs and return the run counters
    pub fn finish(self) -> Result<MergeSummary> {
        self.progress.finish();
        self.complete.finish()?;
        self.best.finish()?;
        Ok(self.summary)
    }

    fn annotate(&mut self, record: AlignmentRecord) -> Result<FunctionalAnnotation> {
        let info = match self.lookup.annotation_info(&record.subject_id)? {
            Some(info) => info,
            None => {
                debug!(subject = %record.subject_id, "subject not found in the database");
                self.summary.unannotated += 1;
                AnnotationInfo::default()
            },
        };
        Ok(FunctionalAnnotation::from_alignment(record, info))
    }

    fn close_group(&mut self, group: Group<FunctionalAnnotation>) -> Result<()> {
        self.write_best(&group.best)?;
        self.seen.insert(group.key);
        Ok(())
    }

    fn write_complete(&mut self, annotation: &FunctionalAnnotation) -> Result<()> {
        self.summary.complete_rows += 1;
        self.complete.write_line(&annotation.to_line())
    }

    fn write_best(&mut self, annotation: &FunctionalAnnotation) -> Result<()> {
        self.summary.best_rows += 1;
        self.best.write_line(&annotation.to_line())
    }
}

/// Run the whole merge: blastp, then blastx, then the lncRNA stream
pub fn merge_annotations<L: LookupProvider>(
    lookup: &L,
    sources: &AlignmentSources,
    complete_path: &Path,
    best_path: &Path,
    progress: &RecordCounter,
) -> Result<MergeSummary> {
    let mut dedup = Deduplicator::create(lookup, complete_path, best_path, progress)?;

    dedup.merge_alignments(&sources.blastp, Algorithm::Blastp)?;
    if let Some(ref blastx) = sources.blastx {
        dedup.merge_alignments(blastx, Algorithm::Blastx)?;
    }
    if let Some(ref blastn) = sources.blastn {
        dedup.merge_lncrna(blastn)?;
    }

    let summary = dedup.finish()?;
    info!(
        records = summary.records,
        complete = summary.complete_rows,
        best = summary.best_rows,
        lncrna = summary.lncrna,
        unannotated = summary.unannotated,
        "annotation merge finished"
    );
    Ok(summary)
}
