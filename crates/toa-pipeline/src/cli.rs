//! Command-line surface of the batch tools
//!
//! Every tool is its own executable with long-form flags. Mandatory flags are
//! declared optional to clap and checked by [`ArgCheck`], which reports every
//! problem as a `*** error:` line before failing with one parameter error.

use crate::config::PipelineConfig;
use crate::homology::MergeStrategy;
use clap::{Args, Parser, ValueEnum};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use toa_common::logging::{init_logging, LogConfig, LogLevel};
use toa_common::{Result, ToaError};
use tracing::{error, info};

/// `Y` / `N` switch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum YesNo {
    #[value(name = "Y", alias = "y")]
    Yes,
    #[default]
    #[value(name = "N", alias = "n")]
    No,
}

impl YesNo {
    pub fn is_yes(self) -> bool {
        self == YesNo::Yes
    }
}

/// Flags shared by all tools
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Show a per-record progress counter
    #[arg(long, value_enum, default_value = "N", env = "TOA_VERBOSE")]
    pub verbose: YesNo,

    /// Enable trace diagnostics
    #[arg(long, value_enum, default_value = "N", env = "TOA_TRACE")]
    pub trace: YesNo,

    /// Optional TOML configuration file
    #[arg(long, env = "TOA_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Argument checks run before any processing
pub trait ArgCheck {
    /// One message per invalid or missing argument
    fn problems(&self) -> Vec<String>;

    fn common(&self) -> &CommonArgs;

    fn check(&self) -> Result<()> {
        let problems = self.problems();
        if problems.is_empty() {
            return Ok(());
        }
        for problem in &problems {
            eprintln!("*** error: {problem}");
        }
        Err(ToaError::InvalidParameters)
    }
}

/// An input file: mandatory and existing
fn check_input(problems: &mut Vec<String>, flag: &str, path: Option<&Path>) {
    match path {
        None => problems.push(format!("The parameter --{flag} has not been indicated.")),
        Some(path) if !path.is_file() => {
            problems.push(format!("The file {} does not exist.", path.display()))
        },
        Some(_) => {},
    }
}

/// An optional input file: existing when given
fn check_optional_input(problems: &mut Vec<String>, path: Option<&Path>) {
    if let Some(path) = path {
        if !path.is_file() {
            problems.push(format!("The file {} does not exist.", path.display()));
        }
    }
}

/// An output path: mandatory
fn check_output(problems: &mut Vec<String>, flag: &str, path: Option<&Path>) {
    if path.is_none() {
        problems.push(format!("The parameter --{flag} has not been indicated."));
    }
}

/// Merge blastp, blastx and blastn alignments into complete and best-hit annotations
#[derive(Debug, Clone, Parser)]
#[command(name = "toa-merge-annotations", version, about)]
pub struct MergeAnnotationsArgs {
    /// Annotation database (SQLite)
    #[arg(long, env = "TOA_DB")]
    pub db: Option<PathBuf>,

    /// blastp/DIAMOND tabular alignments
    #[arg(long)]
    pub blastp_alignments: Option<PathBuf>,

    /// blastx/DIAMOND tabular alignments
    #[arg(long)]
    pub blastx_alignments: Option<PathBuf>,

    /// blastn alignments against the lncRNA database
    #[arg(long)]
    pub blastn_alignments: Option<PathBuf>,

    /// Output: every annotated hit
    #[arg(long)]
    pub complete_annotations: Option<PathBuf>,

    /// Output: best hit per sequence
    #[arg(long)]
    pub best_annotations: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ArgCheck for MergeAnnotationsArgs {
    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        check_input(&mut problems, "db", self.db.as_deref());
        check_input(
            &mut problems,
            "blastp-alignments",
            self.blastp_alignments.as_deref(),
        );
        check_optional_input(&mut problems, self.blastx_alignments.as_deref());
        check_optional_input(&mut problems, self.blastn_alignments.as_deref());
        check_output(
            &mut problems,
            "complete-annotations",
            self.complete_annotations.as_deref(),
        );
        check_output(
            &mut problems,
            "best-annotations",
            self.best_annotations.as_deref(),
        );
        problems
    }

    fn common(&self) -> &CommonArgs {
        &self.common
    }
}

/// Compute species and GO term frequency tables of an annotation file
#[derive(Debug, Clone, Parser)]
#[command(name = "toa-annotation-stats", version, about)]
pub struct AnnotationStatsArgs {
    /// Annotation database (SQLite)
    #[arg(long, env = "TOA_DB")]
    pub db: Option<PathBuf>,

    /// Complete annotation file
    #[arg(long)]
    pub annotations: Option<PathBuf>,

    /// Directory receiving the statistics files
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ArgCheck for AnnotationStatsArgs {
    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        check_input(&mut problems, "db", self.db.as_deref());
        check_input(&mut problems, "annotations", self.annotations.as_deref());
        check_output(&mut problems, "outdir", self.outdir.as_deref());
        problems
    }

    fn common(&self) -> &CommonArgs {
        &self.common
    }
}

/// Resolve homologous genes of the best hit of every sequence
#[derive(Debug, Clone, Parser)]
#[command(name = "toa-homology", version, about)]
pub struct HomologyArgs {
    /// Annotation database (SQLite)
    #[arg(long, env = "TOA_DB")]
    pub db: Option<PathBuf>,

    /// Complete or best-hit annotation file
    #[arg(long)]
    pub annotations: Option<PathBuf>,

    /// Output relationships file
    #[arg(long)]
    pub relationships: Option<PathBuf>,

    /// How repeated (species, gene) entries are combined
    #[arg(long, value_enum, env = "TOA_MERGE_STRATEGY")]
    pub merge_strategy: Option<MergeStrategy>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ArgCheck for HomologyArgs {
    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        check_input(&mut problems, "db", self.db.as_deref());
        check_input(&mut problems, "annotations", self.annotations.as_deref());
        check_output(&mut problems, "relationships", self.relationships.as_deref());
        problems
    }

    fn common(&self) -> &CommonArgs {
        &self.common
    }
}

/// Align the sequences of a FASTA file with MAFFT
#[derive(Debug, Clone, Parser)]
#[command(name = "toa-align", version, about)]
pub struct AlignArgs {
    /// Input FASTA
    #[arg(long)]
    pub fasta: Option<PathBuf>,

    /// Output alignment
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Aligner threads
    #[arg(long, env = "TOA_THREADS")]
    pub threads: Option<usize>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ArgCheck for AlignArgs {
    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        check_input(&mut problems, "fasta", self.fasta.as_deref());
        check_output(&mut problems, "output", self.output.as_deref());
        if self.threads == Some(0) {
            problems.push("The parameter --threads must be greater than 0.".to_string());
        }
        problems
    }

    fn common(&self) -> &CommonArgs {
        &self.common
    }
}

/// Load `.env`, then parse the command line.
///
/// `--help` and `--version` print and exit as usual. Any other clap error is
/// reported like a failed argument check and yields exit code 1.
pub fn parse_args<P: Parser>() -> std::result::Result<P, ExitCode> {
    dotenvy::dotenv().ok();
    parse_args_from(std::env::args_os()).map_err(|e| {
        eprintln!("{}", e.report());
        ExitCode::FAILURE
    })
}

/// Parse `argv` into `P`, turning clap errors into `*** error:` lines
pub fn parse_args_from<P, I, T>(argv: I) -> Result<P>
where
    P: Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    P::try_parse_from(argv).map_err(|e| {
        if !e.use_stderr() {
            e.exit();
        }
        eprintln!("*** error: {}", clap_message(&e));
        ToaError::InvalidParameters
    })
}

/// First line of a clap error without its `error: ` prefix
fn clap_message(e: &clap::Error) -> String {
    let rendered = e.render().to_string();
    let line = rendered
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).trim().to_string()
}

/// Mandatory argument that [`ArgCheck`] has already validated
pub fn required<'a>(value: &'a Option<PathBuf>, flag: &str) -> Result<&'a Path> {
    value
        .as_deref()
        .ok_or_else(|| ToaError::config(format!("--{flag} is missing")))
}

/// Run a tool: logging, argument checks, configuration, then `run`.
///
/// Any error is printed as `*** ERROR <code>: ...` and the exit code is 1.
pub fn execute<A, F>(tool: &str, args: &A, run: F) -> ExitCode
where
    A: ArgCheck,
    F: FnOnce(&A, &PipelineConfig) -> Result<()>,
{
    let common = args.common();
    let level = if common.trace.is_yes() {
        LogLevel::Trace
    } else {
        LogLevel::Info
    };
    let logging = LogConfig::builder()
        .level(level)
        .log_file_prefix(tool)
        .build()
        .with_env_overrides()
        .and_then(|config| init_logging(&config));
    let _guard = match logging {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", ToaError::config(e.to_string()).report());
            return ExitCode::FAILURE;
        },
    };

    let result = args
        .check()
        .and_then(|()| PipelineConfig::load(common.config.as_deref()))
        .and_then(|config| {
            info!(tool, "started");
            run(args, &config)
        });

    match result {
        Ok(()) => {
            info!(tool, "finished");
            ExitCode::SUCCESS
        },
        Err(e) => {
            error!(code = e.code(), error = %e, "{tool} failed");
            eprintln!("{}", e.report());
            ExitCode::FAILURE
        },
    }
}
