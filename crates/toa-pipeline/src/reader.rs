//! Record Reader
//!
//! Streams typed records out of the three fixed text layouts. Each call to
//! [`RecordReader::read_next`] yields either one record or [`ReadOutcome::Done`];
//! memory use is one line at a time.

use crate::records::{
    AlignmentRecord, Algorithm, FieldCursor, FunctionalAnnotation, HomologyRelationship,
    ALIGNMENT_COLUMNS, ANNOTATION_COLUMNS, HOMOLOGY_COLUMNS,
};
use std::path::Path;
use toa_common::{LineReader, Result, ToaError};
use tracing::trace;

/// A record type bound to one fixed line layout
pub trait LineRecord: Sized {
    /// Extra data the caller supplies for every record of a stream
    type Context: Copy;

    const DELIMITER: char;
    const COLUMNS: &'static [&'static str];
    /// Whether a first line starting with the first column name is a header
    const HAS_HEADER: bool;
    /// Lines starting with this prefix are skipped
    const COMMENT: Option<&'static str> = None;

    fn parse_fields(
        fields: &[&str],
        path: &Path,
        record: u64,
        context: Self::Context,
    ) -> Result<Self>;

    /// Grouping key
    fn query_id(&self) -> &str;

    fn subject_id(&self) -> &str;
}

impl LineRecord for AlignmentRecord {
    type Context = Algorithm;

    const DELIMITER: char = '\t';
    const COLUMNS: &'static [&'static str] = &ALIGNMENT_COLUMNS;
    const HAS_HEADER: bool = false;
    const COMMENT: Option<&'static str> = Some("#");

    fn parse_fields(fields: &[&str], path: &Path, record: u64, context: Algorithm) -> Result<Self> {
        let mut cursor = FieldCursor::new(fields, Self::COLUMNS, path, record);
        AlignmentRecord::parse(&mut cursor, context)
    }

    fn query_id(&self) -> &str {
        &self.query_id
    }

    fn subject_id(&self) -> &str {
        &self.subject_id
    }
}

impl LineRecord for FunctionalAnnotation {
    type Context = ();

    const DELIMITER: char = ';';
    const COLUMNS: &'static [&'static str] = &ANNOTATION_COLUMNS;
    const HAS_HEADER: bool = true;

    fn parse_fields(fields: &[&str], path: &Path, record: u64, _: ()) -> Result<Self> {
        let mut cursor = FieldCursor::new(fields, Self::COLUMNS, path, record);
        FunctionalAnnotation::parse(&mut cursor)
    }

    fn query_id(&self) -> &str {
        &self.query_id
    }

    fn subject_id(&self) -> &str {
        &self.subject_id
    }
}

impl LineRecord for HomologyRelationship {
    type Context = ();

    const DELIMITER: char = ';';
    const COLUMNS: &'static [&'static str] = &HOMOLOGY_COLUMNS;
    const HAS_HEADER: bool = true;

    fn parse_fields(fields: &[&str], path: &Path, record: u64, _: ()) -> Result<Self> {
        let mut cursor = FieldCursor::new(fields, Self::COLUMNS, path, record);
        HomologyRelationship::parse(&mut cursor)
    }

    fn query_id(&self) -> &str {
        &self.sequence_id
    }

    fn subject_id(&self) -> &str {
        &self.gene_id
    }
}

/// A parsed record together with the line it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRecord<T> {
    pub raw: String,
    pub record: T,
}

impl<T: LineRecord> ReadRecord<T> {
    /// Query id, the grouping key
    pub fn key(&self) -> &str {
        self.record.query_id()
    }

    /// `"{query}-{subject}"`
    pub fn pair_key(&self) -> String {
        format!("{}-{}", self.record.query_id(), self.record.subject_id())
    }
}

/// Result of one read
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<T> {
    Record(ReadRecord<T>),
    Done,
}

pub struct RecordReader<T: LineRecord> {
    lines: LineReader,
    context: T::Context,
    records: u64,
}

impl RecordReader<AlignmentRecord> {
    /// Open a tabular alignment file whose hits came from `algorithm`
    pub fn alignments(path: impl AsRef<Path>, algorithm: Algorithm) -> Result<Self> {
        Self::open(path, algorithm)
    }
}

impl RecordReader<FunctionalAnnotation> {
    pub fn annotations(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path, ())
    }
}

impl RecordReader<HomologyRelationship> {
    pub fn relationships(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path, ())
    }
}

impl<T: LineRecord> RecordReader<T> {
    pub fn open(path: impl AsRef<Path>, context: T::Context) -> Result<Self> {
        Ok(Self::from_lines(LineReader::open(path)?, context))
    }

    pub fn from_lines(lines: LineReader, context: T::Context) -> Self {
        Self {
            lines,
            context,
            records: 0,
        }
    }

    /// Read the next record, skipping blank lines, comments and the header row
    pub fn read_next(&mut self) -> Result<ReadOutcome<T>> {
        loop {
            let Some(line) = self.lines.next_line()? else {
                trace!(path = %self.lines.path().display(), records = self.records, "end of stream");
                return Ok(ReadOutcome::Done);
            };

            if line.trim().is_empty() {
                continue;
            }
            if T::COMMENT.is_some_and(|prefix| line.starts_with(prefix)) {
                continue;
            }

            let line_number = self.lines.line_number();
            let fields: Vec<&str> = line.split(T::DELIMITER).collect();

            if T::HAS_HEADER && line_number == 1 && is_header(&fields, T::COLUMNS) {
                continue;
            }

            // data records only, comments and the header are not counted
            let record_number = self.records + 1;
            if fields.len() != T::COLUMNS.len() {
                return Err(ToaError::column_count(
                    self.lines.path(),
                    record_number,
                    T::COLUMNS.len(),
                    fields.len(),
                ));
            }

            let record = T::parse_fields(&fields, self.lines.path(), record_number, self.context)?;
            self.records += 1;

            return Ok(ReadOutcome::Record(ReadRecord { raw: line, record }));
        }
    }

    /// Number of records returned so far
    pub fn records_read(&self) -> u64 {
        self.records
    }

    pub fn path(&self) -> &Path {
        self.lines.path()
    }
}

impl<T: LineRecord> Iterator for RecordReader<T> {
    type Item = Result<ReadRecord<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_next() {
            Ok(ReadOutcome::Record(record)) => Some(Ok(record)),
            Ok(ReadOutcome::Done) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

fn is_header(fields: &[&str], columns: &[&str]) -> bool {
    fields
        .first()
        .zip(columns.first())
        .is_some_and(|(field, column)| field.trim_matches('"').eq_ignore_ascii_case(column))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn alignment_reader(text: &str) -> RecordReader<AlignmentRecord> {
        let lines = LineReader::from_reader("blastp.tsv", Cursor::new(text.as_bytes().to_vec()));
        RecordReader::from_lines(lines, Algorithm::Blastp)
    }

    #[test]
    fn test_read_alignment_records() {
        let mut reader = alignment_reader(
            "# BLASTP 2.12.0+\n\
             q1\tc1\t90.5\t100\t9\t0\t1\t100\t1\t100\t1e-50\t200.1\n\
             \n\
             q1\tc2\t80.0\t100\t20\t1\t1\t100\t1\t100\t1e-30\t150\n",
        );

        let ReadOutcome::Record(first) = reader.read_next().unwrap() else {
            panic!("expected a record");
        };
        assert_eq!(first.key(), "q1");
        assert_eq!(first.pair_key(), "q1-c1");
        assert_eq!(first.record.metrics.evalue.value(), 1e-50);
        assert_eq!(first.record.algorithm, Algorithm::Blastp);
        assert!(first.raw.starts_with("q1\tc1"));

        assert!(matches!(reader.read_next().unwrap(), ReadOutcome::Record(_)));
        assert_eq!(reader.read_next().unwrap(), ReadOutcome::Done);
        assert_eq!(reader.records_read(), 2);
    }

    #[test]
    fn test_column_count_error_names_record() {
        let mut reader = alignment_reader(
            "q1\tc1\t90\t100\t9\t0\t1\t100\t1\t100\t1e-50\t200\n\
             q2\tc1\t90\t100\t9\t0\t1\t100\t1\t100\t1e-50\n",
        );
        reader.read_next().unwrap();

        let err = reader.read_next().unwrap_err();
        assert_eq!(err.code(), "F005");
        let message = err.to_string();
        assert!(message.contains("blastp.tsv"));
        assert!(message.contains("record 2"));
        assert!(message.contains("found 11"));
    }

    #[test]
    fn test_error_record_number_ignores_comments_and_blanks() {
        let mut reader = alignment_reader(
            "# BLASTP 2.12.0+\n\
             # Fields: query id, subject id\n\
             q1\tc1\t90\t100\t9\t0\t1\t100\t1\t100\t1e-50\t200\n\
             \n\
             q2\tc1\t90\t100\t9\t0\t1\t100\t1\t100\tNaN\t200\n",
        );
        reader.read_next().unwrap();

        let err = reader.read_next().unwrap_err();
        assert_eq!(err.code(), "F006");
        assert!(err.to_string().contains("record 2"));
    }

    #[test]
    fn test_bad_evalue_is_parse_error() {
        let mut reader = alignment_reader("q1\tc1\t90\t100\t9\t0\t1\t100\t1\t100\tNaN\t200\n");
        let err = reader.read_next().unwrap_err();
        assert_eq!(err.code(), "F006");
        assert!(err.to_string().contains("evalue"));
    }

    #[test]
    fn test_annotation_header_is_skipped() {
        let header = ANNOTATION_COLUMNS.join(";");
        let row = FunctionalAnnotation::lncrna_placeholder("q9").to_line();
        let text = format!("{header}\n{row}\n");
        let lines = LineReader::from_reader("complete.csv", Cursor::new(text.into_bytes()));
        let mut reader: RecordReader<FunctionalAnnotation> = RecordReader::from_lines(lines, ());

        let records: Vec<_> = reader.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key(), "q9");
        assert!(records[0].record.is_placeholder());
    }

    #[test]
    fn test_homology_reader() {
        let text = "Sequence id;Species id;Homologous gene id;Homologous protein isoforms\n\
                    s1;qrobur;G1;P1|P2\n";
        let lines = LineReader::from_reader("homology.csv", Cursor::new(text.as_bytes().to_vec()));
        let mut reader: RecordReader<HomologyRelationship> = RecordReader::from_lines(lines, ());

        let ReadOutcome::Record(record) = reader.read_next().unwrap() else {
            panic!("expected a record");
        };
        assert_eq!(record.record.isoforms, vec!["P1", "P2"]);
        assert_eq!(record.pair_key(), "s1-G1");
        assert_eq!(reader.read_next().unwrap(), ReadOutcome::Done);
    }
}
