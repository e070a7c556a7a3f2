//! Table layout of the annotation database
//!
//! The production database is built by the data bundle; this schema is the
//! subset the pipeline reads, used to build fixture databases.

use rusqlite::Connection;
use toa_common::{Result, ToaError};

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS clusters (
        cluster_id TEXT PRIMARY KEY,
        protein_description TEXT,
        protein_species TEXT,
        tair10_ortholog_seq_id TEXT,
        qlobata_gene_id TEXT,
        representative_species_id TEXT,
        representative_protein_id TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tair10_orthologs (
        seq_id TEXT PRIMARY KEY,
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS interproscan_annotations (
        cluster_id TEXT PRIMARY KEY,
        interpro_goterms TEXT,
        panther_goterms TEXT,
        metacyc_pathways TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS emapper_annotations (
        cluster_id TEXT PRIMARY KEY,
        ortholog_seq_id TEXT,
        ortholog_species TEXT,
        ogs TEXT,
        cog_category TEXT,
        description TEXT,
        goterms TEXT,
        ec TEXT,
        kegg_kos TEXT,
        kegg_pathways TEXT,
        kegg_modules TEXT,
        kegg_reactions TEXT,
        kegg_rclasses TEXT,
        brite TEXT,
        kegg_tc TEXT,
        cazy TEXT,
        pfams TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS go_ontology (
        go_id TEXT PRIMARY KEY,
        go_name TEXT NOT NULL,
        namespace TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS species_proteins (
        species_id TEXT NOT NULL,
        protein_id TEXT NOT NULL,
        gene_id TEXT NOT NULL,
        PRIMARY KEY (species_id, protein_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_species_proteins_gene ON species_proteins(species_id, gene_id)",
    r#"
    CREATE TABLE IF NOT EXISTS liftoff_orthologs (
        species_id TEXT NOT NULL,
        protein_id TEXT NOT NULL,
        target_species_id TEXT NOT NULL,
        target_gene_id TEXT NOT NULL,
        target_protein_id TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_liftoff_source ON liftoff_orthologs(species_id, protein_id)",
];

/// Create every table the lookups read
pub fn init_schema(conn: &Connection) -> Result<()> {
    for sql in TABLES {
        conn.execute(sql, [])
            .map_err(|e| ToaError::database_query(sql.trim(), e.to_string()))?;
    }
    Ok(())
}
