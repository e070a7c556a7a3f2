//! Lookup Provider
//!
//! Keyed read-only access to the annotation database. The pipeline only
//! depends on [`LookupProvider`]; [`SqliteLookup`] is the production
//! implementation.

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteLookup;

use crate::records::AnnotationInfo;
use toa_common::Result;

/// Row of the `clusters` table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterInfo {
    pub protein_description: Option<String>,
    pub protein_species: Option<String>,
    pub tair10_ortholog_seq_id: Option<String>,
    pub qlobata_gene_id: Option<String>,
    pub representative_species_id: Option<String>,
    pub representative_protein_id: Option<String>,
}

/// Row of the `interproscan_annotations` table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterproInfo {
    pub interpro_goterms: Option<String>,
    pub panther_goterms: Option<String>,
    pub metacyc_pathways: Option<String>,
}

/// Row of the `emapper_annotations` table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmapperInfo {
    pub ortholog_seq_id: Option<String>,
    pub ortholog_species: Option<String>,
    pub ogs: Option<String>,
    pub cog_category: Option<String>,
    pub description: Option<String>,
    pub goterms: Option<String>,
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

/// GO ontology entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoTerm {
    pub name: String,
    pub namespace: String,
}

/// A protein of another species lifted over from a query protein
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrthologHit {
    pub species_id: String,
    pub gene_id: String,
    pub protein_id: String,
}

/// Read-only keyed lookups; an absent key is `Ok(None)` or an empty list
pub trait LookupProvider {
    fn cluster(&self, cluster_id: &str) -> Result<Option<ClusterInfo>>;

    fn tair10_description(&self, seq_id: &str) -> Result<Option<String>>;

    fn interpro(&self, cluster_id: &str) -> Result<Option<InterproInfo>>;

    fn emapper(&self, cluster_id: &str) -> Result<Option<EmapperInfo>>;

    fn go_term(&self, go_id: &str) -> Result<Option<GoTerm>>;

    fn gene_of_protein(&self, species_id: &str, protein_id: &str) -> Result<Option<String>>;

    /// Every protein of a gene, ordered by protein id
    fn gene_isoforms(&self, species_id: &str, gene_id: &str) -> Result<Vec<String>>;

    fn orthologs(&self, species_id: &str, protein_id: &str) -> Result<Vec<OrthologHit>>;

    /// Collect the 24 annotation fields of a hit subject.
    ///
    /// Returns `None` when no table knows the cluster.
    fn annotation_info(&self, cluster_id: &str) -> Result<Option<AnnotationInfo>> {
        let cluster = self.cluster(cluster_id)?;
        let interpro = self.interpro(cluster_id)?;
        let emapper = self.emapper(cluster_id)?;

        if cluster.is_none() && interpro.is_none() && emapper.is_none() {
            return Ok(None);
        }

        let cluster = cluster.unwrap_or_default();
        let tair10_description = match cluster.tair10_ortholog_seq_id {
            Some(ref seq_id) => self.tair10_description(seq_id)?,
            None => None,
        };
        let interpro = interpro.unwrap_or_default();
        let emapper = emapper.unwrap_or_default();

        Ok(Some(AnnotationInfo {
            protein_description: cluster.protein_description,
            protein_species: cluster.protein_species,
            tair10_ortholog_seq_id: cluster.tair10_ortholog_seq_id,
            tair10_description,
            qlobata_gene_id: cluster.qlobata_gene_id,
            interpro_goterms: interpro.interpro_goterms,
            panther_goterms: interpro.panther_goterms,
            metacyc_pathways: interpro.metacyc_pathways,
            eggnog_ortholog_seq_id: emapper.ortholog_seq_id,
            eggnog_ortholog_species: emapper.ortholog_species,
            eggnog_ogs: emapper.ogs,
            cog_category: emapper.cog_category,
            eggnog_description: emapper.description,
            eggnog_goterms: emapper.goterms,
            ec: emapper.ec,
            kegg_kos: emapper.kegg_kos,
            kegg_pathways: emapper.kegg_pathways,
            kegg_modules: emapper.kegg_modules,
            kegg_reactions: emapper.kegg_reactions,
            kegg_rclasses: emapper.kegg_rclasses,
            brite: emapper.brite,
            kegg_tc: emapper.kegg_tc,
            cazy: emapper.cazy,
            pfams: emapper.pfams,
        }))
    }
}
