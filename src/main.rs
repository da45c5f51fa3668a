//! CLI entry point for the local discovery assistant.
//!
//! Provides commands for building embedding indexes, querying them with
//! structured filters or semantic search, and chatting with the assistant.

use anyhow::Context;
use clap::{
    Parser, Subcommand, ValueEnum,
    builder::styling::{AnsiColor, Effects, Styles},
};
use nearby::assistant::{
    Assistant, Conversation, KeywordIntentExtractor, Retriever, TemplateAnswerGenerator, Turn,
};
use nearby::display::{
    THEME, create_index_table, create_results_table, create_scored_table, with_spinner,
};
use nearby::io::{ExitCode, JsonResponse, OutputFormat, ResponseMeta, no_search_results_message};
use nearby::{
    Category, EmbeddingGenerator, FastEmbedGenerator, IndexBuilder, IndexReport, Intent,
    RetrievalMode,
    SemanticSearchEngine, Settings, filter_and_rank_with_limit,
};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Local discovery assistant
#[derive(Parser)]
#[command(
    name = "nearby",
    version = env!("CARGO_PKG_VERSION"),
    about = "Find restaurants, dentists and events from local datasets",
    long_about = "Answer local discovery questions with structured filtering or semantic search over small local datasets.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logs
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Retrieval strategy override
#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Semantic,
    Filter,
}

impl From<ModeArg> for RetrievalMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Semantic => RetrievalMode::Semantic,
            ModeArg::Filter => RetrievalMode::Filter,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Initialize project
    #[command(about = "Set up .nearby directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings from .nearby/settings.toml")]
    Config,

    /// Build embedding indexes from corpus files
    #[command(
        about = "Build embedding indexes from corpus files",
        after_help = "Examples:\n  nearby index --all\n  nearby index dentist"
    )]
    Index {
        /// Category to index (restaurant, dentist, event)
        #[arg(required_unless_present = "all")]
        category: Option<Category>,

        /// Index every category
        #[arg(long, conflicts_with = "category")]
        all: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Exact filters over a corpus
    #[command(
        about = "Filter a corpus by location and date, ranked by rating",
        after_help = "Examples:\n  nearby find --category dentist --location \"mg road\"\n  nearby find --category event --date 2025-07-12 --json"
    )]
    Find {
        /// Category label; unknown labels match nothing
        #[arg(long)]
        category: Option<String>,

        /// Case-insensitive substring of address or location
        #[arg(long)]
        location: Option<String>,

        /// Event date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Maximum number of results (overrides config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Semantic search over an embedding index
    #[command(
        about = "Search an embedding index by meaning",
        after_help = "Examples:\n  nearby search \"cozy place for biryani\"\n  nearby search \"jazz\" --category event --scores"
    )]
    Search {
        /// Free-text query
        query: String,

        /// Category label; unclassified queries use the restaurant index
        #[arg(long)]
        category: Option<String>,

        /// Number of results (overrides config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Include similarity scores and index positions
        #[arg(long)]
        scores: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Ask one question
    #[command(
        about = "Ask the assistant a single question",
        after_help = "Examples:\n  nearby ask find a dentist near MG Road\n  nearby ask events this weekend --mode filter --json"
    )]
    Ask {
        /// Question text
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Retrieval strategy (overrides config)
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Interactive chat
    #[command(about = "Chat with the assistant on stdin (type 'exit' to leave)")]
    Chat {
        /// Retrieval strategy (overrides config)
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
}

fn init_logging(cli: &Cli, settings: &Settings) {
    let filter = if cli.verbose {
        EnvFilter::new("nearby=debug,info")
    } else if cli.quiet {
        EnvFilter::new("error")
    } else {
        let fallback = if settings.debug {
            "debug"
        } else {
            settings.logging.level.as_str()
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();

    // Load configuration
    let settings = if let Some(config_path) = &cli.config {
        Settings::load_from(config_path).unwrap_or_else(|e| {
            eprintln!(
                "Configuration error loading from {}: {e}",
                config_path.display()
            );
            std::process::exit(ExitCode::ConfigError.into());
        })
    } else {
        Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            Settings::default()
        })
    };

    init_logging(&cli, &settings);

    match run(&cli, &settings) {
        Ok(code) => std::process::exit(code.into()),
        Err(e) => {
            eprintln!("{}", THEME.error_with_icon(&format!("{e:#}")));
            std::process::exit(ExitCode::GeneralError.into());
        }
    }
}

fn run(cli: &Cli, settings: &Settings) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Commands::Init { force } => {
            let path = Settings::init_config_file(*force).map_err(|e| anyhow::anyhow!("{e}"))?;
            println!(
                "{}",
                THEME.success_with_icon(&format!("Created configuration file at: {}", path.display()))
            );
            println!("Put restaurants.json, dentists.json and events.json under the data directory,");
            println!("then run 'nearby index --all' to build the embedding indexes.");
            Ok(ExitCode::Success)
        }

        Commands::Config => {
            println!("Current Configuration:");
            println!("{}", "=".repeat(50));
            println!("{}", toml::to_string_pretty(settings)?);
            Ok(ExitCode::Success)
        }

        Commands::Index {
            category,
            all: _,
            json,
        } => run_index(settings, *category, OutputFormat::from_json_flag(*json), cli.quiet),

        Commands::Find {
            category,
            location,
            date,
            limit,
            json,
        } => {
            let intent = Intent {
                category: category.as_deref().and_then(Category::parse),
                location: location.clone(),
                date: date.clone(),
            };
            let limit = limit.unwrap_or(settings.filter.limit);
            let start = Instant::now();
            let results = filter_and_rank_with_limit(&intent, &settings.layout(), limit);
            let code = ExitCode::from_results(&results);

            if *json {
                let response = if results.is_empty() {
                    JsonResponse::no_results(results, "No records matched the filters")
                } else {
                    JsonResponse::success(results)
                };
                print_json(&response.with_meta(ResponseMeta::new(start.elapsed())))?;
            } else if results.is_empty() {
                println!("No records matched the filters.");
            } else {
                println!("{}", create_results_table(intent.category, &results));
            }
            Ok(code)
        }

        Commands::Search {
            query,
            category,
            limit,
            scores,
            json,
        } => {
            let category =
                Category::or_default_for_semantic(category.as_deref().and_then(Category::parse));
            let top_k = limit.unwrap_or(settings.semantic_search.top_k);
            let engine = SemanticSearchEngine::new(load_generator(settings, cli.quiet || *json)?);
            let start = Instant::now();

            let hits = match engine.search_scored(
                query,
                category,
                top_k,
                &settings.layout().index_path(category),
            ) {
                Ok(hits) => hits,
                Err(e) => {
                    if *json {
                        print_json(&JsonResponse::from_search_error(&e))?;
                    } else {
                        eprintln!("{}", THEME.error_with_icon(&e.to_string()));
                        for suggestion in e.recovery_suggestions() {
                            eprintln!("  {}", THEME.apply(&THEME.dim, suggestion));
                        }
                    }
                    return Ok(ExitCode::from_search_error(&e));
                }
            };
            let code = ExitCode::from_results(&hits);

            if *json {
                let meta = ResponseMeta::new(start.elapsed());
                if *scores {
                    print_json(&JsonResponse::from_search_results(hits, category, top_k).with_meta(meta))?;
                } else {
                    let records: Vec<_> = hits.into_iter().map(|h| h.record).collect();
                    print_json(
                        &JsonResponse::from_search_results(records, category, top_k).with_meta(meta),
                    )?;
                }
            } else if hits.is_empty() {
                println!("{}.", no_search_results_message(category, top_k));
            } else if *scores {
                println!("{}", create_scored_table(category, &hits));
            } else {
                let records: Vec<_> = hits.into_iter().map(|h| h.record).collect();
                println!("{}", create_results_table(Some(category), &records));
            }
            Ok(code)
        }

        Commands::Ask { query, mode, json } => {
            let mode = mode.map(RetrievalMode::from).unwrap_or(settings.assistant.mode);
            let assistant = build_assistant(settings, mode, cli.quiet || *json)?;
            let mut conversation = Conversation::new(settings.assistant.greeting.clone());
            let question = query.join(" ");

            match assistant.respond(&mut conversation, &question) {
                Ok(turn) => {
                    let code = turn_exit_code(&turn);
                    if *json {
                        print_json(&JsonResponse::success(&turn))?;
                    } else {
                        print_turn(&turn);
                    }
                    Ok(code)
                }
                Err(e) => {
                    if *json {
                        print_json(&JsonResponse::from_assistant_error(&e))?;
                    } else {
                        eprintln!("{}", THEME.error_with_icon(&e.to_string()));
                        for suggestion in e.recovery_suggestions() {
                            eprintln!("  {}", THEME.apply(&THEME.dim, suggestion));
                        }
                    }
                    Ok(ExitCode::from_assistant_error(&e))
                }
            }
        }

        Commands::Chat { mode } => {
            let mode = mode.map(RetrievalMode::from).unwrap_or(settings.assistant.mode);
            let assistant = build_assistant(settings, mode, cli.quiet)?;
            run_chat(&assistant, settings)
        }
    }
}

fn run_index(
    settings: &Settings,
    category: Option<Category>,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<ExitCode> {
    let layout = settings.layout();
    let generator = load_generator(settings, quiet || format.is_json())?;
    let builder = IndexBuilder::new(generator).with_progress(!quiet && !format.is_json());
    let start = Instant::now();

    let outcomes = match category {
        Some(category) => vec![(
            category,
            builder.build(
                category,
                &layout.corpus_path(category),
                &layout.index_path(category),
            ),
        )],
        None => builder.build_all(&layout),
    };
    let (report, errors) = IndexReport::collect(outcomes);
    let exit = errors
        .first()
        .map_or(ExitCode::Success, ExitCode::from_indexing_error);

    if format.is_json() {
        let response = JsonResponse::from_index_report(report, &errors)
            .with_meta(ResponseMeta::new(start.elapsed()));
        print_json(&response)?;
        return Ok(exit);
    }

    for error in &errors {
        eprintln!("{}", THEME.error_with_icon(&error.to_string()));
        for suggestion in error.recovery_suggestions() {
            eprintln!("  {}", THEME.apply(&THEME.dim, suggestion));
        }
    }
    if !report.built.is_empty() {
        println!("{}", create_index_table(&report.built));
        for summary in &report.built {
            println!(
                "{}",
                THEME.success_with_icon(&format!(
                    "{} -> {}",
                    summary.category.plural(),
                    THEME.apply(&THEME.path, summary.path.display())
                ))
            );
        }
    }
    Ok(exit)
}

fn run_chat(assistant: &Assistant, settings: &Settings) -> anyhow::Result<ExitCode> {
    let mut conversation = Conversation::new(settings.assistant.greeting.clone());
    println!("{}", THEME.apply(&THEME.assistant, &settings.assistant.greeting));

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut line = String::new();

    loop {
        print!("{} ", THEME.apply(&THEME.header, ">"));
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query, "exit" | "quit") {
            break;
        }

        match assistant.respond(&mut conversation, query) {
            Ok(turn) => print_turn(&turn),
            Err(e) => {
                eprintln!("{}", THEME.error_with_icon(&e.to_string()));
                for suggestion in e.recovery_suggestions() {
                    eprintln!("  {}", THEME.apply(&THEME.dim, suggestion));
                }
            }
        }
    }

    tracing::debug!("Chat ended after {} messages", conversation.len());
    Ok(ExitCode::Success)
}

fn build_assistant(
    settings: &Settings,
    mode: RetrievalMode,
    quiet: bool,
) -> anyhow::Result<Assistant> {
    let retriever = match mode {
        RetrievalMode::Semantic => Retriever::Semantic {
            engine: SemanticSearchEngine::new(load_generator(settings, quiet)?),
            top_k: settings.semantic_search.top_k,
        },
        RetrievalMode::Filter => Retriever::Filter {
            limit: settings.filter.limit,
        },
    };

    Ok(Assistant::new(
        Box::new(KeywordIntentExtractor::new(
            settings.assistant.known_locations.clone(),
        )),
        Box::new(TemplateAnswerGenerator),
        retriever,
        settings.layout(),
    ))
}

fn load_generator(settings: &Settings, quiet: bool) -> anyhow::Result<Arc<dyn EmbeddingGenerator>> {
    let model = &settings.semantic_search.model;
    let cache_dir = settings.models_dir();
    let show_progress = settings.semantic_search.show_download_progress && !quiet;

    let load = || FastEmbedGenerator::new(model, cache_dir.clone(), show_progress);
    let generator = if quiet {
        load()
    } else {
        with_spinner(&format!("Loading embedding model {model}..."), load)
    }
    .with_context(|| format!("Could not load embedding model '{model}'"))?;

    Ok(Arc::new(generator))
}

fn turn_exit_code(turn: &Turn) -> ExitCode {
    if turn.warning.is_some() {
        ExitCode::ConfigError
    } else {
        ExitCode::from_results(&turn.results)
    }
}

fn print_turn(turn: &Turn) {
    if let Some(warning) = &turn.warning {
        eprintln!("{}", THEME.warning_with_icon(warning));
    }
    println!("{}", THEME.apply(&THEME.assistant, turn.answer.trim_end()));
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
