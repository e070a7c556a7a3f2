//! toa-annotation-stats

use std::process::ExitCode;
use toa_pipeline::cli::{execute, parse_args, required, AnnotationStatsArgs};
use toa_pipeline::progress::RecordCounter;
use toa_pipeline::stats::{aggregate, write_statistics};
use toa_pipeline::SqliteLookup;

fn main() -> ExitCode {
    let args: AnnotationStatsArgs = match parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };

    execute("toa-annotation-stats", &args, |args, config| {
        let lookup = SqliteLookup::open(required(&args.db, "db")?)?;
        let progress = RecordCounter::new(args.common.verbose.is_yes(), "annotations");

        let stats = aggregate(required(&args.annotations, "annotations")?, &progress)?;
        write_statistics(
            &stats,
            &lookup,
            required(&args.outdir, "outdir")?,
            &config.stats,
        )
    })
}
