//! toa-align

use std::process::ExitCode;
use toa_pipeline::align::align;
use toa_pipeline::cli::{execute, parse_args, required, AlignArgs};

fn main() -> ExitCode {
    let args: AlignArgs = match parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };

    execute("toa-align", &args, |args, config| {
        let mut align_config = config.align.clone();
        if let Some(threads) = args.threads {
            align_config.threads = threads;
        }

        align(
            required(&args.fasta, "fasta")?,
            required(&args.output, "output")?,
            &align_config,
        )?;
        Ok(())
    })
}
