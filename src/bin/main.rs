//! RO-Crate Evidence Graph CLI
//!
//! Command-line tool for adding evidence graphs to RO-Crate metadata.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rocrate_evidence::{
    build_evidence_graphs, load_document, registered_files, to_json_string, write_metadata,
    CrateSource, DepthPolicy, EvidenceError, EvidenceOptions, MissingIdPolicy,
    DEFAULT_ARK_PREFIX, DEFAULT_DEPTH_LIMIT,
};

#[derive(Parser)]
#[command(name = "rocrate-evidence")]
#[command(about = "Build provenance evidence graphs for RO-Crate metadata")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Add evidence graphs to a crate's metadata
    Build(BuildArgs),
    /// List files registered in a crate
    Files(FilesArgs),
}

#[derive(Args)]
struct BuildArgs {
    /// Path to RO-Crate directory, ro-crate-metadata.json file, zip, or URL
    source: String,

    /// Output file (default: stdout)
    #[arg(short, long, conflicts_with = "in_place")]
    output: Option<PathBuf>,

    /// Write the result back to the crate's metadata file
    #[arg(long)]
    in_place: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// How repeated depths for one entity are combined: last-write or max
    #[arg(long, default_value = "last-write")]
    depth_policy: DepthPolicy,

    /// ARK prefix for evidence graphs of entities without an ARK id
    #[arg(long, env = "ROCRATE_EVIDENCE_AUTHORITY", default_value = DEFAULT_ARK_PREFIX)]
    default_authority: String,

    /// Provenance depth at which references are left as stubs
    #[arg(long, default_value_t = DEFAULT_DEPTH_LIMIT)]
    depth_limit: usize,

    /// Fail on entities without '@id' or 'guid' instead of naming them
    #[arg(long)]
    reject_missing_ids: bool,

    /// Print build statistics as JSON to stderr
    #[arg(long)]
    stats: bool,
}

#[derive(Args)]
struct FilesArgs {
    /// Path to RO-Crate directory, ro-crate-metadata.json file, zip, or URL
    source: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

fn init_tracing(cli: &Cli) {
    let filter = match cli.verbose {
        0 => "rocrate_evidence=info",
        1 => "rocrate_evidence=debug",
        _ => "rocrate_evidence=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Write output to file or stdout
fn write_output(content: &str, output: Option<&PathBuf>) -> Result<(), EvidenceError> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            info!(path = %path.display(), "wrote crate metadata");
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

fn run_build(args: BuildArgs) -> Result<(), EvidenceError> {
    let source = CrateSource::parse(&args.source);
    let mut document = load_document(&source)?;

    let options = EvidenceOptions {
        depth_policy: args.depth_policy,
        default_prefix: args.default_authority,
        missing_ids: if args.reject_missing_ids {
            MissingIdPolicy::Reject
        } else {
            MissingIdPolicy::Placeholder
        },
        depth_limit: args.depth_limit,
    };

    let stats = build_evidence_graphs(&mut document, &options)?;

    info!(
        entities = stats.entities,
        inferred = stats.inferred_links,
        stubs = stats.stub_references,
        deepest = stats.deepest_id.as_deref().unwrap_or("-"),
        "built evidence graphs"
    );
    if args.stats {
        eprintln!("{}", serde_json::to_string_pretty(&stats)?);
    }

    if args.in_place {
        let path = source.writable_path()?;
        return write_metadata(&path, &document, args.pretty);
    }

    let output = to_json_string(&document, args.pretty)?;
    write_output(&output, args.output.as_ref())
}

fn run_files(args: FilesArgs) -> Result<(), EvidenceError> {
    let document = load_document(&CrateSource::parse(&args.source))?;
    let files = registered_files(&document);
    info!(count = files.len(), "listed registered files");

    let output = if args.pretty {
        serde_json::to_string_pretty(&files)?
    } else {
        serde_json::to_string(&files)?
    };
    write_output(&output, None)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let result = match cli.command {
        Commands::Build(args) => run_build(args),
        Commands::Files(args) => run_files(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
