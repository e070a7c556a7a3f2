//! Shared fixtures for the integration tests
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use toa_pipeline::lookup::schema::init_schema;

/// Annotation database with three clusters, four GO terms and one gene family
pub fn create_database(dir: &Path) -> PathBuf {
    let path = dir.join("toa.db");
    let conn = Connection::open(&path).unwrap();
    init_schema(&conn).unwrap();

    for (id, description, species, rep_species, rep_protein) in [
        ("CL001", "Heat shock protein 70", "Quercus robur", "qrobur", "Qrob_P001.1"),
        ("CL002", "Dehydrin", "Quercus suber", "qsuber", "Qsub_P002.1"),
        ("CL003", "Hypothetical protein", "Fagus sp.", "qrobur", "Qrob_P999.1"),
    ] {
        conn.execute(
            "INSERT INTO clusters (cluster_id, protein_description, protein_species, \
             tair10_ortholog_seq_id, qlobata_gene_id, representative_species_id, \
             representative_protein_id) VALUES (?1, ?2, ?3, NULL, NULL, ?4, ?5)",
            params![id, description, species, rep_species, rep_protein],
        )
        .unwrap();
    }

    conn.execute(
        "INSERT INTO interproscan_annotations (cluster_id, interpro_goterms, panther_goterms, \
         metacyc_pathways) VALUES \
         ('CL001', 'GO:0005524|GO:0006457', 'GO:0006457', '-'), \
         ('CL002', 'GO:0009415', '-', '-'), \
         ('CL003', 'GO:0000000', '-', '-')",
        [],
    )
    .unwrap();

    conn.execute(
        "INSERT INTO go_ontology (go_id, go_name, namespace) VALUES \
         ('GO:0005524', 'ATP binding', 'molecular_function'), \
         ('GO:0006457', 'protein folding', 'biological_process'), \
         ('GO:0009415', 'response to water', 'biological_process')",
        [],
    )
    .unwrap();

    for (species, protein, gene) in [
        ("qrobur", "Qrob_P001.1", "Qrob_G001"),
        ("qrobur", "Qrob_P001.2", "Qrob_G001"),
        ("qsuber", "Qsub_P002.1", "Qsub_G002"),
    ] {
        conn.execute(
            "INSERT INTO species_proteins (species_id, protein_id, gene_id) VALUES (?1, ?2, ?3)",
            params![species, protein, gene],
        )
        .unwrap();
    }

    for (species, protein, target_species, target_gene, target_protein) in [
        ("qrobur", "Qrob_P001.1", "qsuber", "Qsub_G001", "Qsub_P001.1"),
        ("qrobur", "Qrob_P001.2", "qsuber", "Qsub_G001", "Qsub_P001.2"),
    ] {
        conn.execute(
            "INSERT INTO liftoff_orthologs (species_id, protein_id, target_species_id, \
             target_gene_id, target_protein_id) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![species, protein, target_species, target_gene, target_protein],
        )
        .unwrap();
    }

    path
}

/// One tabular alignment line
pub fn hit(query: &str, subject: &str, pident: &str, evalue: &str) -> String {
    format!("{query}\t{subject}\t{pident}\t120\t6\t0\t1\t120\t1\t120\t{evalue}\t210.5")
}

pub fn write_lines(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut text = lines.join("\n");
    text.push('\n');
    std::fs::write(&path, text).unwrap();
    path
}

/// Data rows of a `;`-separated file with a header row
pub fn read_rows(path: &Path) -> Vec<Vec<String>> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .skip(1)
        .map(|line| line.split(';').map(str::to_string).collect())
        .collect()
}
