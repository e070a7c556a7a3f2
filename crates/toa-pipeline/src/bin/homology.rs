//! toa-homology

use std::process::ExitCode;
use toa_pipeline::cli::{execute, parse_args, required, HomologyArgs};
use toa_pipeline::homology::write_relationships;
use toa_pipeline::progress::RecordCounter;
use toa_pipeline::SqliteLookup;

fn main() -> ExitCode {
    let args: HomologyArgs = match parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };

    execute("toa-homology", &args, |args, config| {
        let lookup = SqliteLookup::open(required(&args.db, "db")?)?;
        let strategy = args
            .merge_strategy
            .unwrap_or(config.homology.merge_strategy);
        let progress = RecordCounter::new(args.common.verbose.is_yes(), "annotations");

        write_relationships(
            &lookup,
            required(&args.annotations, "annotations")?,
            required(&args.relationships, "relationships")?,
            strategy,
            &progress,
        )?;
        Ok(())
    })
}
