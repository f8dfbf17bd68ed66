use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use emoji_core_wasm::{
    evaluate, lexicon_pipeline, parse_records, synthesize_conversations, Conversation,
    EmojiPipeline, EmojiPools, EmojiSuggester, LexiconScorer, SentimentConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "emoji_suggester", about = "Sentiment-driven emoji suggestions for two-party chats")]
struct Cli {
    /// Sentiment config JSON (thresholds, weights, analysis windows)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score a single message
    Analyze { text: String },
    /// Suggest emojis for a short/long-term sentiment pair
    Suggest {
        #[arg(long, allow_negative_numbers = true)]
        short: f64,
        #[arg(long, allow_negative_numbers = true)]
        long: f64,
        #[arg(long)]
        count: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        categories: Option<PathBuf>,
    },
    /// Replay conversations and write one record per analysed message
    Replay {
        #[arg(long, conflicts_with = "synthetic")]
        conversations: Option<PathBuf>,
        #[arg(long)]
        synthetic: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Score recorded suggestions against their sentiment categories
    Evaluate {
        #[arg(long)]
        results: PathBuf,
        #[arg(long)]
        categories: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
        /// Include per-record detail and crosstabs, not just the summary
        #[arg(long)]
        detailed: bool,
    },
    /// Read `User: message` lines from stdin and suggest replies
    Chat {
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SentimentConfig> {
    match path {
        Some(path) => SentimentConfig::load(path)
            .with_context(|| format!("loading sentiment config from {}", path.display())),
        None => Ok(SentimentConfig::default()),
    }
}

fn load_pools(path: Option<&Path>) -> Result<EmojiPools> {
    match path {
        Some(path) => EmojiPools::load(path)
            .with_context(|| format!("loading emoji categories from {}", path.display())),
        None => Ok(EmojiPools::default()),
    }
}

fn write_output(out: Option<&Path>, json: &str) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "wrote output");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Analyze { text } => {
            let pipeline = lexicon_pipeline(config, None);
            let score = pipeline.short_term(&text);
            let output = serde_json::json!({
                "message": text,
                "short_term_sentiment": score,
                "sentiment_category": pipeline.categorize(score),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Suggest {
            short,
            long,
            count,
            seed,
            categories,
        } => {
            let mut config = config;
            if let Some(count) = count {
                config.suggestion_count = count;
                config.validate()?;
            }
            let pools = load_pools(categories.as_deref())?;
            let suggester = match seed {
                Some(seed) => EmojiSuggester::with_seed(seed),
                None => EmojiSuggester::new(),
            }
            .with_pools(pools);
            let mut pipeline = EmojiPipeline::new(LexiconScorer::new(), config, suggester);
            let emojis = pipeline.suggest_scores(short, long)?;
            println!("{}", emojis.join(" "));
        }
        Command::Replay {
            conversations,
            synthetic,
            seed,
            out,
        } => {
            let conversations: Vec<Conversation> = match (conversations, synthetic) {
                (Some(path), _) => {
                    let raw = fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    serde_json::from_str(&raw)
                        .with_context(|| format!("parsing conversations in {}", path.display()))?
                }
                (None, Some(n)) => synthesize_conversations(n, seed),
                (None, None) => bail!("pass --conversations <file> or --synthetic <count>"),
            };
            info!(conversations = conversations.len(), "replaying");

            let mut pipeline = lexicon_pipeline(config, seed);
            let records = pipeline.replay(&conversations)?;
            info!(records = records.len(), "replay complete");
            write_output(out.as_deref(), &serde_json::to_string_pretty(&records)?)?;
        }
        Command::Evaluate {
            results,
            categories,
            out,
            detailed,
        } => {
            let raw = fs::read_to_string(&results)
                .with_context(|| format!("reading {}", results.display()))?;
            let records = parse_records(&raw)
                .with_context(|| format!("parsing test results in {}", results.display()))?;
            let pools = load_pools(categories.as_deref())?;
            let evaluation = evaluate(&records, &pools);
            let json = if detailed {
                serde_json::to_string_pretty(&evaluation)?
            } else {
                serde_json::to_string_pretty(&evaluation.summary)?
            };
            write_output(out.as_deref(), &json)?;
        }
        Command::Chat { seed } => run_chat(config, seed)?,
    }

    Ok(())
}

fn run_chat(config: SentimentConfig, seed: Option<u64>) -> Result<()> {
    let mut pipeline = lexicon_pipeline(config, seed);
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for (user, text) in pipeline.conversation() {
        writeln!(stdout, "{user}: {text}")?;
    }

    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/reset" {
            pipeline.reset();
            writeln!(stdout, "-- conversation reset --")?;
            continue;
        }
        let Some((user, text)) = line.split_once(':') else {
            writeln!(stdout, "expected `User: message`")?;
            continue;
        };
        let (user, text) = (user.trim(), text.trim());
        if text.is_empty() {
            continue;
        }
        pipeline.add_message(user, text);

        // Suggest for whoever has to answer next.
        let other = pipeline
            .store()
            .users()
            .into_iter()
            .find(|u| *u != user)
            .map(str::to_string);
        let Some(other) = other else {
            continue;
        };
        let suggestion = pipeline.suggest_for(user)?;
        writeln!(
            stdout,
            "[{other} could reply] {}  ({} short={:.3} long={:.3})",
            suggestion.emojis.join(" "),
            suggestion.category,
            suggestion.short_term,
            suggestion.long_term
        )?;
    }
    Ok(())
}
