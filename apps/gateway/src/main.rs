// AURORA Gateway command-line front end
// Judges prompts against the law file and prints JSON results.

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::future;
use futures::stream::{self, TryStreamExt};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use aurora_gateway::logging::init_tracing;
use aurora_gateway::{DecisionOrchestrator, GatewayConfig, LawBook, LawWatcher};

/// Prompts judged concurrently in batch mode. Output order is preserved.
const BATCH_CONCURRENCY: usize = 8;

#[derive(Parser)]
#[command(name = "aurora-gateway", version, about = "Judge prompts against a set of laws")]
struct Cli {
    /// Law file (overrides AURORA_LAWS_PATH)
    #[arg(short, long, global = true)]
    laws: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Judge a single prompt
    Judge {
        prompt: String,
        /// Caller context as a JSON object
        #[arg(short, long)]
        context: Option<String>,
    },
    /// Judge one prompt per stdin line
    Batch,
    /// List laws in evaluation order
    Laws,
    /// Validate the law file and exit
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = GatewayConfig::load()?;
    if let Some(path) = cli.laws {
        config.laws_path = path;
    }

    init_tracing(config.log_format)?;

    match cli.command {
        Commands::Check => {
            let book = LawBook::load(&config.laws_path)?;
            println!("{}: {} laws OK", config.laws_path.display(), book.len());
        }
        Commands::Laws => {
            let judge = DecisionOrchestrator::from_config(&config)?;
            println!("{}", serde_json::to_string_pretty(&judge.list_laws())?);
        }
        Commands::Judge { prompt, context } => {
            let context = context
                .map(|raw| serde_json::from_str::<Value>(&raw))
                .transpose()
                .context("--context must be valid JSON")?;
            let judge = DecisionOrchestrator::from_config(&config)?;
            let result = judge.judge(&prompt, context.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Batch => {
            let judge = Arc::new(DecisionOrchestrator::from_config(&config)?);
            let watcher = config
                .reload_interval()
                .map(|every| LawWatcher::spawn(Arc::clone(judge.engine()), config.laws_path.clone(), every));

            run_batch(
                Arc::clone(&judge),
                BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
            )
            .await?;

            if let Some(watcher) = watcher {
                watcher.stop();
            }
            eprintln!("{}", serde_json::to_string_pretty(&judge.stats_report())?);
        }
    }

    Ok(())
}

/// Judge one prompt per input line and write one JSON line per prompt.
///
/// Lines are judged as they arrive, so results stream out before the input
/// ends. A failed evaluation is written as `{"error": ...}` and the batch
/// goes on. Returns the number of prompts judged.
async fn run_batch<R, W>(judge: Arc<DecisionOrchestrator>, input: R, mut output: W) -> anyhow::Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let lines = stream::unfold(input.lines(), |mut lines| async move {
        lines.next_line().await.transpose().map(|line| (line, lines))
    });

    let results = lines
        .map_err(anyhow::Error::from)
        .try_filter(|line| future::ready(!line.trim().is_empty()))
        .map_ok(|prompt| {
            let judge = Arc::clone(&judge);
            async move {
                let outcome = tokio::task::spawn_blocking(move || judge.judge(&prompt, None)).await?;
                Ok::<_, anyhow::Error>(outcome)
            }
        })
        .try_buffered(BATCH_CONCURRENCY);
    futures::pin_mut!(results);

    let mut judged = 0;
    while let Some(outcome) = results.try_next().await? {
        let line = match outcome {
            Ok(result) => serde_json::to_string(&result)?,
            Err(e) => {
                warn!("Evaluation failed: {}", e);
                serde_json::json!({ "error": e.to_string() }).to_string()
            }
        };
        output.write_all(line.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
        judged += 1;
    }

    info!("Judged {} prompts", judged);
    Ok(judged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurora_gateway::LawEngine;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_batch_streams_results_before_input_ends() {
        let judge = Arc::new(DecisionOrchestrator::new(Arc::new(LawEngine::default())));
        let (mut input, input_end) = duplex(1024);
        let (output_end, output) = duplex(64 * 1024);
        let batch = tokio::spawn(run_batch(
            Arc::clone(&judge),
            BufReader::new(input_end),
            output_end,
        ));
        let mut results = BufReader::new(output).lines();

        // Input stays open: the first result must arrive anyway
        input.write_all(b"hello\n\n").await.unwrap();
        let first = results.next_line().await.unwrap().expect("Expected a first result");
        let first: Value = serde_json::from_str(&first).unwrap();
        assert_eq!(first["final_decision"], "ALLOW");
        assert_eq!(first["prompt_preview"], "hello");

        input.write_all(b"rm -rf /\n").await.unwrap();
        drop(input);

        let second = results.next_line().await.unwrap().expect("Expected a second result");
        let second: Value = serde_json::from_str(&second).unwrap();
        assert_eq!(second["prompt_preview"], "rm -rf /");

        assert_eq!(batch.await.unwrap().unwrap(), 2);
        assert!(results.next_line().await.unwrap().is_none());
        assert_eq!(judge.get_stats().total_evaluations, 2);
    }
}
