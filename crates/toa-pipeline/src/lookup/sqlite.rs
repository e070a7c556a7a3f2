//! SQLite implementation of the Lookup Provider

use super::{ClusterInfo, EmapperInfo, GoTerm, InterproInfo, LookupProvider, OrthologHit};
use crate::records::ABSENT;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;
use toa_common::{Result, ToaError};
use tracing::{debug, trace};

const CLUSTER_SQL: &str = "SELECT protein_description, protein_species, tair10_ortholog_seq_id, \
     qlobata_gene_id, representative_species_id, representative_protein_id \
     FROM clusters WHERE cluster_id = ?1";

const TAIR10_SQL: &str = "SELECT description FROM tair10_orthologs WHERE seq_id = ?1";

const INTERPRO_SQL: &str = "SELECT interpro_goterms, panther_goterms, metacyc_pathways \
     FROM interproscan_annotations WHERE cluster_id = ?1";

const EMAPPER_SQL: &str = "SELECT ortholog_seq_id, ortholog_species, ogs, cog_category, \
     description, goterms, ec, kegg_kos, kegg_pathways, kegg_modules, kegg_reactions, \
     kegg_rclasses, brite, kegg_tc, cazy, pfams \
     FROM emapper_annotations WHERE cluster_id = ?1";

const GO_TERM_SQL: &str = "SELECT go_name, namespace FROM go_ontology WHERE go_id = ?1";

const GENE_SQL: &str =
    "SELECT gene_id FROM species_proteins WHERE species_id = ?1 AND protein_id = ?2";

const ISOFORMS_SQL: &str = "SELECT protein_id FROM species_proteins \
     WHERE species_id = ?1 AND gene_id = ?2 ORDER BY protein_id";

const ORTHOLOGS_SQL: &str = "SELECT target_species_id, target_gene_id, target_protein_id \
     FROM liftoff_orthologs WHERE species_id = ?1 AND protein_id = ?2 \
     ORDER BY target_species_id, target_gene_id, target_protein_id";

/// Read-only connection with one cached statement per lookup
pub struct SqliteLookup {
    conn: Connection,
}

impl SqliteLookup {
    /// Open an existing database read-only
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| ToaError::database_connect(path, e.to_string()))?;

        debug!(db = %path.display(), "opened annotation database");
        Ok(Self { conn })
    }

    /// Wrap an already open connection
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn query_one<T>(
        &self,
        sql: &'static str,
        params: impl rusqlite::Params,
        map: impl FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Option<T>> {
        trace!(sql, "lookup");
        let mut stmt = self
            .conn
            .prepare_cached(sql)
            .map_err(|e| ToaError::database_query(sql, e.to_string()))?;
        stmt.query_row(params, map)
            .optional()
            .map_err(|e| ToaError::database_query(sql, e.to_string()))
    }

    fn query_all<T>(
        &self,
        sql: &'static str,
        params: impl rusqlite::Params,
        map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        trace!(sql, "lookup");
        let mut stmt = self
            .conn
            .prepare_cached(sql)
            .map_err(|e| ToaError::database_query(sql, e.to_string()))?;
        let rows = stmt
            .query_map(params, map)
            .map_err(|e| ToaError::database_query(sql, e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| ToaError::database_query(sql, e.to_string()))
    }
}

/// NULL, empty and `-` all mean "no value"
fn field(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(row
        .get::<_, Option<String>>(idx)?
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != ABSENT))
}

impl LookupProvider for SqliteLookup {
    fn cluster(&self, cluster_id: &str) -> Result<Option<ClusterInfo>> {
        self.query_one(CLUSTER_SQL, params![cluster_id], |row| {
            Ok(ClusterInfo {
                protein_description: field(row, 0)?,
                protein_species: field(row, 1)?,
                tair10_ortholog_seq_id: field(row, 2)?,
                qlobata_gene_id: field(row, 3)?,
                representative_species_id: field(row, 4)?,
                representative_protein_id: field(row, 5)?,
            })
        })
    }

    fn tair10_description(&self, seq_id: &str) -> Result<Option<String>> {
        Ok(self
            .query_one(TAIR10_SQL, params![seq_id], |row| field(row, 0))?
            .flatten())
    }

    fn interpro(&self, cluster_id: &str) -> Result<Option<InterproInfo>> {
        self.query_one(INTERPRO_SQL, params![cluster_id], |row| {
            Ok(InterproInfo {
                interpro_goterms: field(row, 0)?,
                panther_goterms: field(row, 1)?,
                metacyc_pathways: field(row, 2)?,
            })
        })
    }

    fn emapper(&self, cluster_id: &str) -> Result<Option<EmapperInfo>> {
        self.query_one(EMAPPER_SQL, params![cluster_id], |row| {
            Ok(EmapperInfo {
                ortholog_seq_id: field(row, 0)?,
                ortholog_species: field(row, 1)?,
                ogs: field(row, 2)?,
                cog_category: field(row, 3)?,
                description: field(row, 4)?,
                goterms: field(row, 5)?,
                ec: field(row, 6)?,
                kegg_kos: field(row, 7)?,
                kegg_pathways: field(row, 8)?,
                kegg_modules: field(row, 9)?,
                kegg_reactions: field(row, 10)?,
                kegg_rclasses: field(row, 11)?,
                brite: field(row, 12)?,
                kegg_tc: field(row, 13)?,
                cazy: field(row, 14)?,
                pfams: field(row, 15)?,
            })
        })
    }

    fn go_term(&self, go_id: &str) -> Result<Option<GoTerm>> {
        self.query_one(GO_TERM_SQL, params![go_id], |row| {
            Ok(GoTerm {
                name: row.get(0)?,
                namespace: row.get(1)?,
            })
        })
    }

    fn gene_of_protein(&self, species_id: &str, protein_id: &str) -> Result<Option<String>> {
        self.query_one(GENE_SQL, params![species_id, protein_id], |row| row.get(0))
    }

    fn gene_isoforms(&self, species_id: &str, gene_id: &str) -> Result<Vec<String>> {
        self.query_all(ISOFORMS_SQL, params![species_id, gene_id], |row| row.get(0))
    }

    fn orthologs(&self, species_id: &str, protein_id: &str) -> Result<Vec<OrthologHit>> {
        self.query_all(ORTHOLOGS_SQL, params![species_id, protein_id], |row| {
            Ok(OrthologHit {
                species_id: row.get(0)?,
                gene_id: row.get(1)?,
                protein_id: row.get(2)?,
            })
        })
    }
}
