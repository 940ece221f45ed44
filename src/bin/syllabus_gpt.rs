//! SyllabusGPT CLI
//!
//! Command-line interface for notes generation, syllabus inspection and
//! knowledge base health checks. Results go to stdout as JSON (or markdown
//! for notes); logs go to stderr.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use syllabus_gpt::{
    count_tokens, default_config_path, extract_subtopics, get_collection_status, load_config, save_config,
    split_units, unique_slugs, AppConfig, ChatClient, ChromaClient, ChromaRetriever, GenerationOptions,
    NotesPipeline, UnitOutcome, DEFAULT_RAG_TOP_K,
};

#[derive(Parser)]
#[command(name = "syllabus-gpt")]
#[command(about = "SyllabusGPT CLI - Retrieval-augmented study notes from syllabus text", long_about = None)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate notes for every unit of a syllabus
    Generate {
        /// Syllabus file, or - for stdin
        #[arg(default_value = "-")]
        input: String,
        #[arg(long)]
        subject: Option<String>,
        /// Include previous exam questions
        #[arg(long)]
        pyq: bool,
        /// Passages to retrieve per unit
        #[arg(long)]
        top_k: Option<u32>,
        /// Write markdown here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Units generated at the same time
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Split a syllabus into units
    Units {
        #[arg(default_value = "-")]
        input: String,
    },
    /// Extract subtopics for each unit
    Subtopics {
        #[arg(default_value = "-")]
        input: String,
    },
    /// Ask the model for the syllabus topic list
    Topics {
        #[arg(default_value = "-")]
        input: String,
    },
    /// Generate one notes document around the syllabus topic list
    TopicNotes {
        #[arg(default_value = "-")]
        input: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        pyq: bool,
        #[arg(long, default_value_t = DEFAULT_RAG_TOP_K)]
        top_k: u32,
    },
    /// Generate a hypothetical textbook passage for a topic
    Hyde {
        topic: String,
    },
    /// Generate notes for a single topic
    Rag {
        #[arg(default_value = "-")]
        input: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        pyq: bool,
        #[arg(long, default_value_t = DEFAULT_RAG_TOP_K)]
        top_k: u32,
    },
    /// Count tokens in text
    Tokens {
        #[arg(default_value = "-")]
        input: String,
    },
    /// Check the Chroma server and knowledge base collections
    Health,
    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

// ============ Output Types ============

#[derive(Serialize)]
struct UnitOutput {
    title: String,
    slug: String,
    body: String,
}

#[derive(Serialize)]
struct SubtopicsOutput {
    title: String,
    subtopics: BTreeSet<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnitSummary {
    title: String,
    slug: String,
    outcome: UnitOutcome,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateSummary {
    run_id: String,
    output: Option<String>,
    degraded: usize,
    units: Vec<UnitSummary>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthOutput {
    chroma_url: String,
    heartbeat: i64,
    collections: Vec<syllabus_gpt::CollectionStatus>,
}

#[derive(Serialize)]
struct TokenCountOutput {
    tokens: u32,
}

#[derive(Serialize)]
struct StatusOutput {
    status: String,
    path: String,
}

#[derive(Serialize)]
struct ErrorOutput {
    error: String,
}

// ============ Main ============

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("syllabus_gpt=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(out) => println!("{}", out),
        Err(e) => {
            let error = ErrorOutput { error: format!("{:#}", e) };
            println!("{}", serde_json::to_string(&error).unwrap_or_else(|_| e.to_string()));
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<String> {
    let config_path = cli.config;
    match cli.command {
        Commands::Config { action } => handle_config(action, config_path.as_deref()),

        Commands::Units { input } => {
            let units = split_units(&read_input(&input)?);
            let slugs = unique_slugs(units.iter().map(|u| u.title.as_str()));
            let units: Vec<UnitOutput> = units
                .into_iter()
                .zip(slugs)
                .map(|(u, slug)| UnitOutput {
                    slug,
                    title: u.title,
                    body: u.body,
                })
                .collect();
            Ok(serde_json::to_string(&units)?)
        }

        Commands::Subtopics { input } => {
            let items: Vec<SubtopicsOutput> = split_units(&read_input(&input)?)
                .into_iter()
                .map(|u| SubtopicsOutput {
                    subtopics: extract_subtopics(&u.body),
                    title: u.title,
                })
                .collect();
            Ok(serde_json::to_string(&items)?)
        }

        Commands::Tokens { input } => {
            let output = TokenCountOutput {
                tokens: count_tokens(&read_input(&input)?),
            };
            Ok(serde_json::to_string(&output)?)
        }

        Commands::Health => {
            let config = load_config(config_path.as_deref())?;
            let client = ChromaClient::new(&config.chroma)?;
            let heartbeat = client.heartbeat().await.context("Chroma heartbeat failed")?;
            let collections = get_collection_status(&client, &config.chroma).await?;
            let output = HealthOutput {
                chroma_url: client.base_url().to_string(),
                heartbeat,
                collections,
            };
            Ok(serde_json::to_string(&output)?)
        }

        Commands::Hyde { topic } => {
            let config = load_config(config_path.as_deref())?;
            let pipeline = build_pipeline(&config)?;
            Ok(pipeline.generate_hyde(&topic).await?)
        }

        Commands::Topics { input } => {
            let text = read_input(&input)?;
            let config = load_config(config_path.as_deref())?;
            let pipeline = build_pipeline(&config)?;
            let topics = pipeline.parse_topics(&text).await?;
            Ok(serde_json::to_string(&topics)?)
        }

        Commands::TopicNotes {
            input,
            subject,
            pyq,
            top_k,
        } => {
            let text = read_input(&input)?;
            let config = load_config(config_path.as_deref())?;
            let pipeline = build_pipeline(&config)?;
            let options = GenerationOptions::new(subject.as_deref())
                .with_past_exam(pyq)
                .with_top_k(top_k);
            Ok(pipeline.generate_topic_notes(&text, &options).await?)
        }

        Commands::Rag {
            input,
            subject,
            pyq,
            top_k,
        } => {
            let topic = read_input(&input)?;
            let config = load_config(config_path.as_deref())?;
            let pipeline = build_pipeline(&config)?;
            let options = GenerationOptions::new(subject.as_deref())
                .with_past_exam(pyq)
                .with_top_k(top_k);
            Ok(pipeline.generate_notes_with_rag(topic.trim(), &options).await?)
        }

        Commands::Generate {
            input,
            subject,
            pyq,
            top_k,
            output,
            concurrency,
        } => {
            let text = read_input(&input)?;
            let mut config = load_config(config_path.as_deref())?;
            if let Some(n) = concurrency {
                config.max_concurrent_units = n;
            }
            let pipeline = build_pipeline(&config)?;
            let options = GenerationOptions::new(subject.as_deref())
                .with_past_exam(pyq)
                .with_top_k(top_k.unwrap_or(config.default_top_k));

            let document = pipeline.generate_final_notes(&text, &options).await?;
            let summary = GenerateSummary {
                run_id: document.run_id.clone(),
                output: output.as_ref().map(|p| p.display().to_string()),
                degraded: document.degraded_units(),
                units: document
                    .units
                    .iter()
                    .map(|u| UnitSummary {
                        title: u.title.clone(),
                        slug: u.slug.clone(),
                        outcome: u.outcome.clone(),
                    })
                    .collect(),
            };
            let summary_json = serde_json::to_string(&summary)?;

            match output {
                Some(path) => {
                    fs::write(&path, &document.markdown)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    Ok(summary_json)
                }
                None => {
                    info!(summary = %summary_json, "Generation finished");
                    Ok(document.markdown)
                }
            }
        }
    }
}

// ============ Handlers ============

fn build_pipeline(config: &AppConfig) -> anyhow::Result<NotesPipeline<ChatClient, ChromaRetriever>> {
    let client = ChatClient::new(&config.llm)?;
    let retriever = ChromaRetriever::from_config(&config.chroma)?;
    Ok(NotesPipeline::new(client, retriever, config.pipeline_settings()))
}

fn handle_config(action: ConfigAction, path: Option<&Path>) -> anyhow::Result<String> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    match action {
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!("Config already exists at {} (use --force to overwrite)", path.display());
            }
            save_config(&path, &AppConfig::default())?;
            let output = StatusOutput {
                status: "written".to_string(),
                path: path.display().to_string(),
            };
            Ok(serde_json::to_string(&output)?)
        }
        ConfigAction::Show => {
            let config = load_config(Some(&path))?;
            Ok(serde_json::to_string_pretty(&config)?)
        }
    }
}

/// Read a file, or stdin for `-`
fn read_input(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("Failed to read stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))
    }
}
