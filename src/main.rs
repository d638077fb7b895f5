use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use evalreport::{execute, Config, MetricSchema, OutputSource, SchemaKind};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "evalreport")]
#[command(about = "Aggregate and cross-check evaluator output into report files", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// trec_eval output: recall, recall@10, P@1, MRR, MAP
    TrecEval(EvalArgs),
    /// gdeval output: NDCG@20, ERR@20
    Gdeval(EvalArgs),
}

#[derive(Args, Debug)]
struct EvalArgs {
    /// Evaluator binary or script (overrides [tools] in evalreport.toml)
    #[arg(long, conflicts_with = "raw")]
    tool: Option<PathBuf>,

    /// Read previously captured evaluator output instead of running the evaluator
    #[arg(long)]
    raw: Option<PathBuf>,

    /// Relevance judgments (qrel file)
    qrel: PathBuf,

    /// Run to evaluate (trec-format ranked output)
    run: PathBuf,

    /// Prefix of the report files
    prefix: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    // Summary goes to stdout, everything else to stderr
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.log_level())
    ).init();

    let (kind, args) = match cli.command {
        Command::TrecEval(args) => (SchemaKind::TrecEval, args),
        Command::Gdeval(args) => (SchemaKind::GdEval, args),
    };

    let source = match (args.raw, args.tool) {
        (Some(path), _) => OutputSource::Captured { path },
        (None, Some(program)) => OutputSource::Invoke { program },
        (None, None) => {
            let program = config.tool_path(kind).with_context(|| {
                format!(
                    "No {} evaluator configured. Pass --tool or set it under [tools] in evalreport.toml.",
                    kind
                )
            })?;
            OutputSource::Invoke { program: program.to_path_buf() }
        }
    };

    log::info!("Starting evalreport v{} ({})", env!("CARGO_PKG_VERSION"), kind);

    let mut stdout = std::io::stdout().lock();
    let written = execute(
        MetricSchema::for_kind(kind),
        &source,
        &args.qrel,
        &args.run,
        &args.prefix,
        &mut stdout,
    )
    .with_context(|| format!("{} evaluation of {} failed", kind, args.run.display()))?;

    for path in &written {
        log::debug!("✓ {}", path.display());
    }

    Ok(())
}
