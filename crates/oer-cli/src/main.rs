//! OER CLI - Command-line interface
//!
//! Every input file holds one annotated sentence (JSON) per line.
//!
//! Usage:
//!   oer extract <input.jsonl> [--no-generic] [--max-gap N] [--provenance]
//!   oer inspect <input.jsonl>
//!   oer evaluate <input.jsonl>

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use oer_core::{
    AnnotatedSentence, AppConfig, ExtractionResult, KnowledgeTriple, LoggingConfig, Token,
};
use oer_extractor::{evaluate_corpus, CandidateSelector, Extractor};

#[derive(Parser)]
#[command(name = "oer")]
#[command(about = "Knowledge triple extraction from annotated Chinese sentences")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract triples, one result per input line
    Extract {
        /// JSONL file of annotated sentences
        input: PathBuf,

        #[command(flatten)]
        options: ExtractOptions,
    },
    /// Show the entity-merged tokens and candidate entities
    Inspect {
        /// JSONL file of annotated sentences
        input: PathBuf,
    },
    /// Score extraction against gold triples
    Evaluate {
        /// JSONL file of annotated sentences with a `gold` triple list
        input: PathBuf,

        #[command(flatten)]
        options: ExtractOptions,
    },
}

#[derive(Args, Debug)]
struct ExtractOptions {
    /// Only pair proper-noun entities
    #[arg(long)]
    no_generic: bool,

    /// Maximum number of entities between the two members of a pair
    #[arg(long)]
    max_gap: Option<usize>,

    /// Keep the producing pattern on every triple
    #[arg(long)]
    provenance: bool,

    /// Concurrent sentence workers
    #[arg(long)]
    workers: Option<usize>,
}

impl ExtractOptions {
    fn apply(&self, config: &mut AppConfig) {
        if self.no_generic {
            config.extractor.include_generic_nouns = false;
        }
        if let Some(max_gap) = self.max_gap {
            config.extractor.max_entity_gap = max_gap;
        }
        if self.provenance {
            config.extractor.include_provenance = true;
        }
        if let Some(workers) = self.workers {
            config.runtime.workers = workers;
        }
    }
}

/// Evaluation input line
#[derive(Debug, Deserialize)]
struct GoldSentence {
    #[serde(flatten)]
    sentence: AnnotatedSentence,
    #[serde(default)]
    gold: Vec<KnowledgeTriple>,
}

/// Inspection output line
#[derive(Debug, Serialize)]
struct Inspection {
    sentence: String,
    tokens: Vec<Token>,
    entities: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    match &cli.command {
        Commands::Extract { options, .. } | Commands::Evaluate { options, .. } => {
            options.apply(&mut config)
        }
        Commands::Inspect { .. } => {}
    }
    if matches!(cli.command, Commands::Evaluate { .. }) {
        // per-pattern counts need provenance
        config.extractor.include_provenance = true;
    }

    init_tracing(&config.logging);
    tracing::debug!(?config, "Configuration loaded");

    let workers = config.runtime.workers;
    let include_generic = config.extractor.include_generic_nouns;
    let extractor = Arc::new(Extractor::new(config.extractor));

    match cli.command {
        Commands::Extract { input, .. } => {
            let lines = read_lines(&input).await?;
            let results = process(lines, workers, extractor, |extractor, line| {
                let sentence: AnnotatedSentence = serde_json::from_str(line)?;
                Ok(extractor.extract_annotated(&sentence)?)
            })
            .await;

            for result in results {
                println!("{}", serde_json::to_string(&result)?);
            }
        }
        Commands::Inspect { input } => {
            let lines = read_lines(&input).await?;
            let results = process(lines, workers, extractor, move |extractor, line| {
                let annotated: AnnotatedSentence = serde_json::from_str(line)?;
                let merged = extractor.combine(&annotated)?;
                let entities = CandidateSelector::new(include_generic)
                    .select(&merged)
                    .into_iter()
                    .map(|t| t.lemma.clone())
                    .collect();
                Ok(Inspection {
                    sentence: annotated.text,
                    tokens: merged.tokens().to_vec(),
                    entities,
                })
            })
            .await;

            for inspection in results {
                println!("{}", serde_json::to_string(&inspection)?);
            }
        }
        Commands::Evaluate { input, .. } => {
            let lines = read_lines(&input).await?;
            let scored: Vec<(ExtractionResult, Vec<KnowledgeTriple>)> =
                process(lines, workers, extractor, |extractor, line| {
                    let labeled: GoldSentence = serde_json::from_str(line)?;
                    let result = extractor.extract_annotated(&labeled.sentence)?;
                    Ok((result, labeled.gold))
                })
                .await;

            let report = evaluate_corpus(
                scored
                    .iter()
                    .map(|(result, gold)| (result, gold.as_slice())),
            );
            eprint!("{}", report.report());
            println!(
                "{}",
                serde_json::json!({
                    "sentences": report.sentences,
                    "precision": report.overall.precision(),
                    "recall": report.overall.recall(),
                    "f1": report.overall.f1_score(),
                    "counts": report.overall,
                    "by_pattern": report.by_pattern,
                })
            );
        }
    }

    Ok(())
}

/// Install the global subscriber; logs go to stderr, results to stdout
fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Non-blank lines with their 1-based line numbers
async fn read_lines(path: &Path) -> anyhow::Result<Vec<(usize, String)>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(numbered_lines(&content))
}

fn numbered_lines(content: &str) -> Vec<(usize, String)> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| (index + 1, line.to_string()))
        .collect()
}

/// Run `job` on every line on the blocking pool, at most `workers` at a time.
///
/// Output keeps input order. Failed lines are logged and left out.
async fn process<R, F>(
    lines: Vec<(usize, String)>,
    workers: usize,
    extractor: Arc<Extractor>,
    job: F,
) -> Vec<R>
where
    R: Send + 'static,
    F: Fn(&Extractor, &str) -> anyhow::Result<R> + Send + Sync + 'static,
{
    let total = lines.len();
    let job = Arc::new(job);

    let outcomes: Vec<(usize, anyhow::Result<R>)> = stream::iter(lines)
        .map(|(number, line)| {
            let extractor = Arc::clone(&extractor);
            let job = Arc::clone(&job);
            async move {
                let outcome = tokio::task::spawn_blocking(move || job(&extractor, &line))
                    .await
                    .map_err(|e| anyhow::anyhow!("Worker join error: {}", e))
                    .and_then(|result| result);
                (number, outcome)
            }
        })
        .buffered(workers.max(1))
        .collect()
        .await;

    let mut results = Vec::with_capacity(total);
    for (number, outcome) in outcomes {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => tracing::warn!(line = number, error = %e, "Skipping input line"),
        }
    }

    tracing::info!(
        lines = total,
        processed = results.len(),
        skipped = total - results.len(),
        "Input processed"
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_lines_skip_blanks() {
        let lines = numbered_lines("{\"a\":1}\n\n  \n{\"b\":2}\n");
        assert_eq!(
            lines,
            vec![(1, "{\"a\":1}".to_string()), (4, "{\"b\":2}".to_string())]
        );
    }

    #[test]
    fn test_options_override_config() {
        let mut config = AppConfig::default();
        let options = ExtractOptions {
            no_generic: true,
            max_gap: Some(2),
            provenance: true,
            workers: None,
        };

        options.apply(&mut config);

        assert!(!config.extractor.include_generic_nouns);
        assert_eq!(config.extractor.max_entity_gap, 2);
        assert!(config.extractor.include_provenance);
        assert_eq!(config.runtime.workers, 4);
    }

    #[test]
    fn test_gold_sentence_line() {
        let line = r#"{"text":"高克访问中国","tokens":[
            {"lemma":"高克","postag":"nh","netag":"S-Nh","head":2,"dependency":"SBV"},
            {"lemma":"访问","postag":"v","head":0,"dependency":"HED"},
            {"lemma":"中国","postag":"ns","netag":"S-Ns","head":2,"dependency":"VOB"}],
            "gold":[{"subject":"高克","predicate":"访问","object":"中国"}]}"#;

        let labeled: GoldSentence = serde_json::from_str(line).unwrap();
        let result = Extractor::default()
            .extract_annotated(&labeled.sentence)
            .unwrap();

        assert_eq!(labeled.gold.len(), 1);
        assert_eq!(result.knowledge[0].key(), labeled.gold[0].key());
    }

    #[tokio::test]
    async fn test_process_keeps_order_and_skips_failures() {
        let lines = vec![
            (1, "3".to_string()),
            (2, "oops".to_string()),
            (3, "1".to_string()),
        ];

        let results = process(lines, 2, Arc::new(Extractor::default()), |_, line| {
            Ok(line.parse::<u32>()?)
        })
        .await;

        assert_eq!(results, vec![3, 1]);
    }
}
