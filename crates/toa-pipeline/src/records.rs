//! Record types of the annotation pipeline and their fixed text layouts
//!
//! Absent values travel as `-` in the files and as `None` in memory.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use toa_common::{Result, ToaError};

/// Placeholder text of an absent field
pub const ABSENT: &str = "-";

/// Subject id written for queries only matched by the non-coding search
pub const LNCRNA_MARKER: &str = "potential lncRNA";

/// Alignment input: BLAST/DIAMOND tabular output, 12 columns
pub const ALIGNMENT_COLUMNS: [&str; 12] = [
    "qseqid", "sseqid", "pident", "length", "mismatch", "gapopen", "qstart", "qend", "sstart",
    "send", "evalue", "bitscore",
];

/// Complete and best-hit annotation files, 37 columns
pub const ANNOTATION_COLUMNS: [&str; 37] = [
    "qseqid",
    "sseqid",
    "pident",
    "length",
    "mismatch",
    "gapopen",
    "qstart",
    "qend",
    "sstart",
    "send",
    "evalue",
    "bitscore",
    "algorithm",
    "protein_description",
    "protein_species",
    "tair10_ortholog_seq_id",
    "tair10_description",
    "qlobata_gene_id",
    "interpro_goterms",
    "panther_goterms",
    "metacyc_pathways",
    "eggnog_ortholog_seq_id",
    "eggnog_ortholog_species",
    "eggnog_ogs",
    "cog_category",
    "eggnog_description",
    "eggnog_goterms",
    "ec",
    "kegg_kos",
    "kegg_pathways",
    "kegg_modules",
    "kegg_reactions",
    "kegg_rclasses",
    "brite",
    "kegg_tc",
    "cazy",
    "pfams",
];

/// Homology relationships file, 4 columns
pub const HOMOLOGY_COLUMNS: [&str; 4] = [
    "Sequence id",
    "Species id",
    "Homologous gene id",
    "Homologous protein isoforms",
];

/// Search program that produced an alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    /// protein vs protein
    Blastp,
    /// translated nucleotide vs protein
    Blastx,
    /// nucleotide vs nucleotide (lncRNA detection)
    Blastn,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Blastp => "blastp",
            Algorithm::Blastx => "blastx",
            Algorithm::Blastn => "blastn",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "blastp" => Ok(Algorithm::Blastp),
            "blastx" => Ok(Algorithm::Blastx),
            "blastn" => Ok(Algorithm::Blastn),
            other => Err(format!("unknown algorithm {other}")),
        }
    }
}

/// A floating point column that keeps the text it was read from,
/// so `1e-180` is written back as `1e-180`.
#[derive(Debug, Clone)]
pub struct Metric {
    value: f64,
    text: String,
}

impl Metric {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl PartialEq for Metric {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl From<f64> for Metric {
    fn from(value: f64) -> Self {
        Self {
            value,
            text: value.to_string(),
        }
    }
}

impl FromStr for Metric {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().parse::<f64>() {
            Ok(value) if !value.is_nan() => Ok(Self {
                value,
                text: s.trim().to_string(),
            }),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Numeric columns 3-12 of a tabular search hit
#[derive(Debug, Clone, PartialEq)]
pub struct HitMetrics {
    pub pident: Metric,
    pub length: u64,
    pub mismatch: u64,
    pub gapopen: u64,
    pub qstart: u64,
    pub qend: u64,
    pub sstart: u64,
    pub send: u64,
    pub evalue: Metric,
    pub bitscore: Metric,
}

impl HitMetrics {
    fn parse(cursor: &mut FieldCursor<'_>) -> Result<Self> {
        Ok(Self {
            pident: cursor.metric()?,
            length: cursor.integer()?,
            mismatch: cursor.integer()?,
            gapopen: cursor.integer()?,
            qstart: cursor.integer()?,
            qend: cursor.integer()?,
            sstart: cursor.integer()?,
            send: cursor.integer()?,
            evalue: cursor.metric()?,
            bitscore: cursor.metric()?,
        })
    }

    fn push_fields(&self, out: &mut Vec<String>) {
        out.push(self.pident.to_string());
        out.push(self.length.to_string());
        out.push(self.mismatch.to_string());
        out.push(self.gapopen.to_string());
        out.push(self.qstart.to_string());
        out.push(self.qend.to_string());
        out.push(self.sstart.to_string());
        out.push(self.send.to_string());
        out.push(self.evalue.to_string());
        out.push(self.bitscore.to_string());
    }
}

/// One hit of a pairwise sequence search
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRecord {
    pub query_id: String,
    pub subject_id: String,
    pub metrics: HitMetrics,
    pub algorithm: Algorithm,
}

impl AlignmentRecord {
    pub(crate) fn parse(cursor: &mut FieldCursor<'_>, algorithm: Algorithm) -> Result<Self> {
        Ok(Self {
            query_id: cursor.text()?,
            subject_id: cursor.text()?,
            metrics: HitMetrics::parse(cursor)?,
            algorithm,
        })
    }

    pub fn to_line(&self) -> String {
        let mut fields = Vec::with_capacity(ALIGNMENT_COLUMNS.len());
        fields.push(self.query_id.clone());
        fields.push(self.subject_id.clone());
        self.metrics.push_fields(&mut fields);
        fields.join("\t")
    }
}

/// Lookup data attached to a hit, in output column order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationInfo {
    pub protein_description: Option<String>,
    pub protein_species: Option<String>,
    pub tair10_ortholog_seq_id: Option<String>,
    pub tair10_description: Option<String>,
    pub qlobata_gene_id: Option<String>,
    pub interpro_goterms: Option<String>,
    pub panther_goterms: Option<String>,
    pub metacyc_pathways: Option<String>,
    pub eggnog_ortholog_seq_id: Option<String>,
    pub eggnog_ortholog_species: Option<String>,
    pub eggnog_ogs: Option<String>,
    pub cog_category: Option<String>,
    pub eggnog_description: Option<String>,
    pub eggnog_goterms: Option<String>,
    pub ec: Option<String>,
    pub kegg_kos: Option<String>,
    pub kegg_pathways: Option<String>,
    pub kegg_modules: Option<String>,
    pub kegg_reactions: Option<String>,
    pub kegg_rclasses: Option<String>,
    pub brite: Option<String>,
    pub kegg_tc: Option<String>,
    pub cazy: Option<String>,
    pub pfams: Option<String>,
}

impl AnnotationInfo {
    fn fields(&self) -> [&Option<String>; 24] {
        [
            &self.protein_description,
            &self.protein_species,
            &self.tair10_ortholog_seq_id,
            &self.tair10_description,
            &self.qlobata_gene_id,
            &self.interpro_goterms,
            &self.panther_goterms,
            &self.metacyc_pathways,
            &self.eggnog_ortholog_seq_id,
            &self.eggnog_ortholog_species,
            &self.eggnog_ogs,
            &self.cog_category,
            &self.eggnog_description,
            &self.eggnog_goterms,
            &self.ec,
            &self.kegg_kos,
            &self.kegg_pathways,
            &self.kegg_modules,
            &self.kegg_reactions,
            &self.kegg_rclasses,
            &self.brite,
            &self.kegg_tc,
            &self.cazy,
            &self.pfams,
        ]
    }

    fn parse(cursor: &mut FieldCursor<'_>) -> Result<Self> {
        Ok(Self {
            protein_description: cursor.optional()?,
            protein_species: cursor.optional()?,
            tair10_ortholog_seq_id: cursor.optional()?,
            tair10_description: cursor.optional()?,
            qlobata_gene_id: cursor.optional()?,
            interpro_goterms: cursor.optional()?,
            panther_goterms: cursor.optional()?,
            metacyc_pathways: cursor.optional()?,
            eggnog_ortholog_seq_id: cursor.optional()?,
            eggnog_ortholog_species: cursor.optional()?,
            eggnog_ogs: cursor.optional()?,
            cog_category: cursor.optional()?,
            eggnog_description: cursor.optional()?,
            eggnog_goterms: cursor.optional()?,
            ec: cursor.optional()?,
            kegg_kos: cursor.optional()?,
            kegg_pathways: cursor.optional()?,
            kegg_modules: cursor.optional()?,
            kegg_reactions: cursor.optional()?,
            kegg_rclasses: cursor.optional()?,
            brite: cursor.optional()?,
            kegg_tc: cursor.optional()?,
            cazy: cursor.optional()?,
            pfams: cursor.optional()?,
        })
    }
}

/// An alignment hit enriched with lookup data, or an lncRNA placeholder
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionalAnnotation {
    pub query_id: String,
    pub subject_id: String,
    /// `None` only for lncRNA placeholders
    pub metrics: Option<HitMetrics>,
    pub algorithm: Algorithm,
    pub info: AnnotationInfo,
}

impl FunctionalAnnotation {
    pub fn from_alignment(record: AlignmentRecord, info: AnnotationInfo) -> Self {
        Self {
            query_id: record.query_id,
            subject_id: record.subject_id,
            metrics: Some(record.metrics),
            algorithm: record.algorithm,
            info,
        }
    }

    /// Row marking a query matched only by the nucleotide search
    pub fn lncrna_placeholder(query_id: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            subject_id: LNCRNA_MARKER.to_string(),
            metrics: None,
            algorithm: Algorithm::Blastn,
            info: AnnotationInfo::default(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.metrics.is_none()
    }

    /// Deduplicated, sorted union of the InterPro, PANTHER and eggNOG GO terms
    pub fn go_terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = [
            &self.info.interpro_goterms,
            &self.info.panther_goterms,
            &self.info.eggnog_goterms,
        ]
        .into_iter()
        .flat_map(|list| split_terms(list.as_deref()))
        .collect();
        terms.sort_unstable();
        terms.dedup();
        terms
    }

    pub(crate) fn parse(cursor: &mut FieldCursor<'_>) -> Result<Self> {
        let query_id = cursor.text()?;
        let subject_id = cursor.text()?;

        let metrics = if cursor.remaining_metrics_absent() {
            cursor.skip(10);
            None
        } else {
            Some(HitMetrics::parse(cursor)?)
        };

        let algorithm = cursor.algorithm()?;
        let info = AnnotationInfo::parse(cursor)?;

        Ok(Self {
            query_id,
            subject_id,
            metrics,
            algorithm,
            info,
        })
    }

    pub fn to_line(&self) -> String {
        let mut fields = Vec::with_capacity(ANNOTATION_COLUMNS.len());
        fields.push(self.query_id.clone());
        fields.push(self.subject_id.clone());
        match self.metrics {
            Some(ref metrics) => metrics.push_fields(&mut fields),
            None => fields.extend(std::iter::repeat(ABSENT.to_string()).take(10)),
        }
        fields.push(self.algorithm.as_str().to_string());
        fields.extend(
            self.info
                .fields()
                .iter()
                .map(|v| v.as_deref().unwrap_or(ABSENT).to_string()),
        );
        fields.join(";")
    }
}

/// GO term ids of one list column: empty, `-`, or pipe-delimited
pub fn split_terms(list: Option<&str>) -> impl Iterator<Item = &str> {
    list.unwrap_or_default()
        .split('|')
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != ABSENT)
}

/// One species' homologous gene for a query sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomologyRelationship {
    pub sequence_id: String,
    pub species_id: String,
    pub gene_id: String,
    pub isoforms: Vec<String>,
}

impl HomologyRelationship {
    pub(crate) fn parse(cursor: &mut FieldCursor<'_>) -> Result<Self> {
        let sequence_id = cursor.text()?;
        let species_id = cursor.text()?;
        let gene_id = cursor.text()?;
        let isoforms = cursor
            .text()?
            .split('|')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self {
            sequence_id,
            species_id,
            gene_id,
            isoforms,
        })
    }

    pub fn to_line(&self) -> String {
        format!(
            "{};{};{};{}",
            self.sequence_id,
            self.species_id,
            self.gene_id,
            self.isoforms.join("|")
        )
    }
}

/// Walks the split columns of one line, producing located parse errors
pub(crate) struct FieldCursor<'a> {
    fields: &'a [&'a str],
    columns: &'static [&'static str],
    pos: usize,
    path: &'a Path,
    record: u64,
}

impl<'a> FieldCursor<'a> {
    pub(crate) fn new(
        fields: &'a [&'a str],
        columns: &'static [&'static str],
        path: &'a Path,
        record: u64,
    ) -> Self {
        Self {
            fields,
            columns,
            pos: 0,
            path,
            record,
        }
    }

    fn next_raw(&mut self) -> Result<(&'static str, &'a str)> {
        let column = self.columns.get(self.pos).copied().unwrap_or("extra column");
        let value = self.fields.get(self.pos).copied().ok_or_else(|| {
            ToaError::column_count(self.path, self.record, self.columns.len(), self.fields.len())
        })?;
        self.pos += 1;
        Ok((column, value))
    }

    fn skip(&mut self, n: usize) {
        self.pos += n;
    }

    fn text(&mut self) -> Result<String> {
        Ok(self.next_raw()?.1.to_string())
    }

    fn optional(&mut self) -> Result<Option<String>> {
        let (_, value) = self.next_raw()?;
        Ok((value != ABSENT).then(|| value.to_string()))
    }

    fn integer(&mut self) -> Result<u64> {
        let (column, value) = self.next_raw()?;
        value
            .trim()
            .parse()
            .map_err(|_| ToaError::field_parse(self.path, self.record, column, value))
    }

    fn metric(&mut self) -> Result<Metric> {
        let (column, value) = self.next_raw()?;
        value
            .parse()
            .map_err(|_| ToaError::field_parse(self.path, self.record, column, value))
    }

    fn algorithm(&mut self) -> Result<Algorithm> {
        let (column, value) = self.next_raw()?;
        value
            .parse()
            .map_err(|_| ToaError::field_parse(self.path, self.record, column, value))
    }

    /// True when the next ten columns (pident..bitscore) are all `-`
    fn remaining_metrics_absent(&self) -> bool {
        self.fields
            .get(self.pos..self.pos + 10)
            .is_some_and(|cols| cols.iter().all(|c| *c == ABSENT))
    }
}
