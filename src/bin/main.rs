use cast_core::config::EngineConfig;
use cast_core::coverage::{alignment_coverage, assignment_coverage};
use cast_core::fuzzy::align::PolicyKind;
use cast_core::loader::{self, Corpus};
use cast_core::persistence;
use cast_core::report::CoverageReport;
use cast_core::ResolveMode;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DATA_PATH: &str = "data/movies";

/// Screenplay-to-IMDb cast coverage statistics.
#[derive(Parser, Debug)]
#[command(name = "cast_stats")]
#[command(about = "Align screenplay characters with IMDb casts and report coverage")]
struct Args {
    /// Directory of per-movie .txt files
    #[arg(long, short = 'd', default_value = DATA_PATH)]
    data: PathBuf,

    /// Corpus snapshot; read if present, written after a fresh load
    #[arg(long)]
    cache: Option<PathBuf>,

    /// JSON config file (threshold, max_search_steps, skip_malformed_cast)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Override the similarity threshold from the config
    #[arg(long)]
    threshold: Option<f64>,

    /// Alignment policies to run (repeatable; default all)
    #[arg(long = "policy", short = 'p', value_enum)]
    policies: Vec<PolicyKind>,

    /// Resolver modes to run (repeatable; default soft and hard)
    #[arg(long = "mode", short = 'm', value_enum)]
    modes: Vec<ResolveMode>,

    /// Print one JSON object per run instead of text
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("[ERROR] {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
        config.validate()?;
    }

    let corpus = open_corpus(&args.data, args.cache.as_deref(), &config)?;

    let policies = if args.policies.is_empty() { PolicyKind::ALL.to_vec() } else { args.policies };
    let modes = if args.modes.is_empty() { ResolveMode::ALL.to_vec() } else { args.modes };

    let mut reports = Vec::new();
    for &kind in &policies {
        let policy = config.policy(kind);
        let totals = alignment_coverage(&corpus, policy.as_ref());
        reports.push(CoverageReport::alignment(policy.name(), totals));
    }
    for &mode in &modes {
        let resolver = config.resolver(mode);
        for &kind in &policies {
            let policy = config.policy(kind);
            let totals = assignment_coverage(&corpus, policy.as_ref(), &resolver);
            reports.push(CoverageReport::assignment(policy.name(), &mode.to_string(), totals));
        }
    }

    for report in &reports {
        if args.json {
            println!("{}", report.to_json()?);
        } else {
            println!("{}", report.render());
        }
    }
    Ok(())
}

fn open_corpus(
    data: &Path,
    cache: Option<&Path>,
    config: &EngineConfig,
) -> Result<Corpus, Box<dyn std::error::Error>> {
    if let Some(cache) = cache.filter(|path| path.exists()) {
        match persistence::load_corpus(cache) {
            Ok(corpus) => {
                info!(path = %cache.display(), movies = corpus.len(), "restored corpus snapshot");
                return Ok(corpus);
            }
            Err(e) => warn!(path = %cache.display(), error = %e, "ignoring unreadable snapshot"),
        }
    }

    let corpus = loader::load_corpus(data, &config.loader())?;
    if let Some(cache) = cache {
        if let Err(e) = persistence::save_corpus(&corpus, cache) {
            warn!(path = %cache.display(), error = %e, "could not write corpus snapshot");
        }
    }
    Ok(corpus)
}
