use anyhow::{Context as AnyhowContext, Result};
use buildwise_optimizer::{Orchestrator, TuningProfile};
use buildwise_protocol::{serialize_json, ErrorResponse, RecommendRequest};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

const PROFILE_ENV: &str = "BUILDWISE_PROFILE";

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        serialize_json(value)
    }
}

/// Print the error envelope and terminate with status 1.
fn fail(err: &anyhow::Error, pretty: bool) -> Result<()> {
    log::error!("{err:#}");
    let response = ErrorResponse::new(format!("{err:#}"));
    print_stdout(&render(&response, pretty)?)?;
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "buildwise")]
#[command(about = "Budget-constrained PC build recommendations", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Tuning profile overlay (JSON or TOML); falls back to BUILDWISE_PROFILE
    #[arg(long, global = true)]
    profile: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute value / performance / future-proof builds for a request
    Recommend(RecommendArgs),

    /// Print the effective tuning profile
    Profile(OutputArgs),

    /// Print the JSON schema of the request document
    Schema(OutputArgs),
}

#[derive(Args)]
struct RecommendArgs {
    /// Inline JSON request (mutually exclusive with --file)
    #[arg(long, conflicts_with = "file")]
    json: Option<String>,

    /// Path to file containing the JSON request
    #[arg(long)]
    file: Option<PathBuf>,

    /// Pretty-print JSON response
    #[arg(long)]
    pretty: bool,

    /// Run strategies one after another instead of on blocking tasks
    #[arg(long)]
    sequential: bool,
}

#[derive(Args)]
struct OutputArgs {
    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let profile_path = cli
        .profile
        .clone()
        .or_else(|| env::var_os(PROFILE_ENV).map(PathBuf::from));

    match cli.command {
        Commands::Recommend(args) => run_recommend(args, profile_path.as_deref()).await?,
        Commands::Profile(args) => run_profile(&args, profile_path.as_deref())?,
        Commands::Schema(args) => run_schema(&args)?,
    }

    Ok(())
}

async fn run_recommend(args: RecommendArgs, profile_path: Option<&Path>) -> Result<()> {
    match recommend(&args, profile_path).await {
        Ok(output) => print_stdout(&output),
        Err(err) => fail(&err, args.pretty),
    }
}

async fn recommend(args: &RecommendArgs, profile_path: Option<&Path>) -> Result<String> {
    let orchestrator = Orchestrator::from_profile_path(profile_path)?;
    log::debug!("Using tuning profile '{}'", orchestrator.profile().name());

    let raw = read_payload(args)?;
    let request: RecommendRequest =
        serde_json::from_str(&raw).context("Invalid JSON passed to --json/--file")?;
    log::info!(
        "Recommending builds for budget {} ({}) over {} catalog records",
        request.request.budget,
        request.request.use_case,
        request.database.as_array().map_or(0, Vec::len)
    );

    let recommendation = if args.sequential {
        orchestrator.recommend(&request)?
    } else {
        orchestrator.recommend_concurrent(&request).await?
    };
    render(&recommendation, args.pretty)
}

fn run_profile(args: &OutputArgs, profile_path: Option<&Path>) -> Result<()> {
    match TuningProfile::load(profile_path) {
        Ok(profile) => print_stdout(&render(&profile.describe(), args.pretty)?),
        Err(err) => fail(&err, args.pretty),
    }
}

fn run_schema(args: &OutputArgs) -> Result<()> {
    let schema = schemars::schema_for!(RecommendRequest);
    print_stdout(&render(&schema, args.pretty)?)
}

fn read_payload(args: &RecommendArgs) -> Result<String> {
    if let Some(raw) = &args.json {
        return Ok(raw.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read JSON from {}", path.display()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read JSON from stdin")?;

    if buffer.trim().is_empty() {
        anyhow::bail!("Recommendation request is empty. Provide --json, --file, or pipe JSON via stdin.");
    }

    Ok(buffer)
}
