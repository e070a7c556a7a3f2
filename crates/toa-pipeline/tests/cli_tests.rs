//! End-to-end tests of the batch executables

mod common;

use assert_cmd::Command;
use common::{create_database, hit, read_rows, write_lines};
use predicates::prelude::*;

fn tool(name: &str) -> Command {
    let mut cmd = Command::cargo_bin(name).unwrap();
    for var in [
        "TOA_DB",
        "TOA_CONFIG",
        "TOA_VERBOSE",
        "TOA_TRACE",
        "TOA_LOG_DIR",
        "TOA_THREADS",
        "TOA_MERGE_STRATEGY",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_merge_without_flags_lists_every_problem() {
    tool("toa-merge-annotations")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "*** error: The parameter --db has not been indicated.",
        ))
        .stderr(predicate::str::contains(
            "*** error: The parameter --blastp-alignments has not been indicated.",
        ))
        .stderr(predicate::str::contains(
            "*** error: The parameter --best-annotations has not been indicated.",
        ))
        .stderr(predicate::str::contains("*** ERROR P001"));
}

#[test]
fn test_stats_with_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = create_database(dir.path());

    tool("toa-annotation-stats")
        .arg("--db")
        .arg(&db)
        .arg("--annotations")
        .arg(dir.path().join("absent.csv"))
        .arg("--outdir")
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("absent.csv does not exist"));
}

#[test]
fn test_invalid_verbose_value_is_rejected() {
    tool("toa-homology")
        .args(["--verbose", "maybe"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("*** error: invalid value 'maybe'"))
        .stderr(predicate::str::contains("*** ERROR P001"));
}

#[test]
fn test_non_numeric_threads_is_rejected() {
    tool("toa-align")
        .args(["--threads", "abc"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("*** error:"))
        .stderr(predicate::str::contains("--threads"))
        .stderr(predicate::str::contains("*** ERROR P001"));
}

#[test]
fn test_help_exits_successfully() {
    tool("toa-merge-annotations")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--blastp-alignments"));
}

#[test]
fn test_broken_alignment_file_reports_record() {
    let dir = tempfile::tempdir().unwrap();
    let db = create_database(dir.path());
    let blastp = write_lines(
        dir.path(),
        "blastp.tsv",
        &[hit("q1", "CL001", "90", "1e-10"), "q2\tCL001\t90".to_string()],
    );

    tool("toa-merge-annotations")
        .arg("--db")
        .arg(&db)
        .arg("--blastp-alignments")
        .arg(&blastp)
        .arg("--complete-annotations")
        .arg(dir.path().join("complete.csv"))
        .arg("--best-annotations")
        .arg(dir.path().join("best.csv"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("*** ERROR F005"))
        .stderr(predicate::str::contains("record 2"));
}

#[test]
fn test_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let db = create_database(dir.path());
    let blastp = write_lines(
        dir.path(),
        "blastp.tsv",
        &[
            hit("q1", "CL001", "90.000", "1e-10"),
            hit("q1", "CL002", "95.000", "1e-10"),
        ],
    );
    let blastn = write_lines(
        dir.path(),
        "blastn.tsv",
        &[hit("q9", "lnc0001", "99.000", "1e-50")],
    );
    let complete = dir.path().join("complete.csv.gz");
    let best = dir.path().join("best.csv");

    tool("toa-merge-annotations")
        .arg("--db")
        .arg(&db)
        .arg("--blastp-alignments")
        .arg(&blastp)
        .arg("--blastn-alignments")
        .arg(&blastn)
        .arg("--complete-annotations")
        .arg(&complete)
        .arg("--best-annotations")
        .arg(&best)
        .args(["--verbose", "N", "--trace", "N"])
        .assert()
        .success();

    let best_rows = read_rows(&best);
    assert_eq!(best_rows.len(), 2);
    assert_eq!(best_rows[0][1], "CL002");
    assert_eq!(best_rows[1][1], "potential lncRNA");

    let outdir = dir.path().join("stats");
    tool("toa-annotation-stats")
        .arg("--db")
        .arg(&db)
        .arg("--annotations")
        .arg(&complete)
        .arg("--outdir")
        .arg(&outdir)
        .assert()
        .success();

    for name in [
        "stats-species.csv",
        "stats-goterms.csv",
        "stats-namespaces.csv",
        "stats-seq-per-goterm.csv",
    ] {
        assert!(outdir.join(name).is_file(), "{name} missing");
    }

    let relationships = dir.path().join("homology.csv");
    tool("toa-homology")
        .env("TOA_DB", &db)
        .arg("--annotations")
        .arg(&best)
        .arg("--relationships")
        .arg(&relationships)
        .args(["--merge-strategy", "union"])
        .assert()
        .success();

    let rows = read_rows(&relationships);
    assert_eq!(rows, vec![vec!["q1", "qsuber", "Qsub_G002", "Qsub_P002.1"]]);
}

#[test]
fn test_config_file_renames_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let db = create_database(dir.path());
    let annotations = dir.path().join("complete.csv");
    std::fs::write(
        &annotations,
        format!(
            "{}\n",
            toa_pipeline::records::ANNOTATION_COLUMNS.join(";")
        ),
    )
    .unwrap();
    let config = dir.path().join("toa.toml");
    std::fs::write(&config, "[stats]\nspecies = \"species.csv\"\n").unwrap();
    let outdir = dir.path().join("out");

    tool("toa-annotation-stats")
        .arg("--db")
        .arg(&db)
        .arg("--annotations")
        .arg(&annotations)
        .arg("--outdir")
        .arg(&outdir)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    assert!(outdir.join("species.csv").is_file());
    assert!(!outdir.join("stats-species.csv").exists());
}

#[test]
fn test_align_single_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let fasta = dir.path().join("gene.fasta");
    std::fs::write(&fasta, ">p1\nMKV\n").unwrap();
    let output = dir.path().join("gene.aln");

    tool("toa-align")
        .arg("--fasta")
        .arg(&fasta)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("single sequence copied"));

    assert_eq!(std::fs::read_to_string(&output).unwrap(), ">p1\nMKV\n");
}
