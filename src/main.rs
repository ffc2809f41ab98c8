use anyhow::Result;
use clap::Parser;
use photorank::oracle::{ollama, openai};
use photorank::{Evaluator, EvaluatorConfig, OllamaOracle, OpenAiOracle, Oracle, report};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "photorank",
    version,
    about = "AI-powered photo evaluator with duplicate detection for social media"
)]
struct Cli {
    /// Folder containing photos to evaluate
    #[arg(value_name = "DIR")]
    folder: PathBuf,

    /// Output JSON file for results
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output file for just the captions of top photos
    #[arg(short, long, value_name = "FILE")]
    captions: Option<PathBuf>,

    /// Number of top photos to display
    #[arg(short = 'n', long, default_value_t = 10)]
    top: usize,

    /// Skip duplicate detection (faster but may include similar shots)
    #[arg(long)]
    no_duplicates: bool,

    /// OpenAI API key (otherwise uses a local Ollama server)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Hosted model used when an API key is given
    #[arg(long, default_value = openai::DEFAULT_MODEL)]
    openai_model: String,

    /// Base URL of the Ollama server
    #[arg(long, default_value = ollama::DEFAULT_URL)]
    ollama_url: String,

    /// Ollama vision model
    #[arg(long, default_value = ollama::DEFAULT_MODEL)]
    ollama_model: String,

    /// Log debug diagnostics
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = EvaluatorConfig {
        detect_duplicates: !cli.no_duplicates,
        ..EvaluatorConfig::default()
    };
    if config.detect_duplicates {
        println!("🔍 Duplicate detection enabled - will group similar shots and pick the best from each group");
    } else {
        println!("⚡ Duplicate detection disabled - processing all photos independently");
    }

    match cli.openai_api_key.as_deref() {
        Some(key) => {
            let oracle = OpenAiOracle::new(key, cli.openai_model.as_str())?;
            run(Evaluator::new(oracle, config), &cli)
        }
        None => {
            println!(
                "Using Ollama - make sure 'ollama serve' is running and '{}' is installed",
                cli.ollama_model
            );
            let oracle = OllamaOracle::new(cli.ollama_url.as_str(), cli.ollama_model.as_str())?;
            run(Evaluator::new(oracle, config), &cli)
        }
    }
}

fn run<O: Oracle>(evaluator: Evaluator<O>, cli: &Cli) -> Result<()> {
    let results = benchmark("evaluation", || evaluator.evaluate_folder(&cli.folder))?;

    if let Some(output) = &cli.output {
        report::write_json(output, &results)?;
        println!("\nResults saved to {}", output.display());
    }

    report::print_top_results(&results, cli.top);

    if let Some(captions) = &cli.captions {
        if !results.is_empty() {
            let written = report::write_captions(captions, &results, cli.top)?;
            println!("\n📱 {} caption(s) saved to {}", written, captions.display());
        }
    }

    Ok(())
}

/// Run `f()`, log how long it took (with `label`), and return its result.
fn benchmark<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    let start = Instant::now();
    let result = f();
    tracing::info!("⏱ {} took {:.2?}", label, start.elapsed());
    result
}
