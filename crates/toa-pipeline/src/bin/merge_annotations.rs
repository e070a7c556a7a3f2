//! toa-merge-annotations

use std::process::ExitCode;
use toa_pipeline::cli::{execute, parse_args, required, MergeAnnotationsArgs};
use toa_pipeline::dedup::{merge_annotations, AlignmentSources};
use toa_pipeline::progress::RecordCounter;
use toa_pipeline::SqliteLookup;

fn main() -> ExitCode {
    let args: MergeAnnotationsArgs = match parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };

    execute("toa-merge-annotations", &args, |args, _config| {
        let lookup = SqliteLookup::open(required(&args.db, "db")?)?;
        let sources = AlignmentSources {
            blastp: required(&args.blastp_alignments, "blastp-alignments")?.to_path_buf(),
            blastx: args.blastx_alignments.clone(),
            blastn: args.blastn_alignments.clone(),
        };
        let progress = RecordCounter::new(args.common.verbose.is_yes(), "alignments");

        merge_annotations(
            &lookup,
            &sources,
            required(&args.complete_annotations, "complete-annotations")?,
            required(&args.best_annotations, "best-annotations")?,
            &progress,
        )?;
        Ok(())
    })
}
