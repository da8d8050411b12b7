//! CLI entrypoint for sci-storm
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use storm_application::config::ToolServerSettings;
use storm_application::{
    AutoApproveReviewer, CheckpointOrchestrator, CheckpointReviewer, CompletionOptions,
    DecisionLog, EvidenceSources, GatherEvidenceUseCase, NoProgress, PipelineConfig,
    PipelineError, PipelineSeed, ProgressNotifier, ReferenceIndexPort, ResilientBackend,
    RunPipelineUseCase, ServerLauncher, StageProducers, ToolServerClient,
};
use storm_domain::{DocumentBrief, Stage};
use storm_infrastructure::{
    CommandLauncher, ConfigLoader, HttpCompletionTransport, HttpToolServerTransport, JsonlDecisionLog,
    LocalReferenceIndex, TavilySearchClient, load_roster, write_document,
};
use storm_presentation::{
    Cli, Command, ConsoleFormatter, ExperimentArgs, GenerateArgs, InteractiveCheckpointReviewer,
    ProgressReporter, SimpleProgress,
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Exit code for a run stopped by the reviewer or Ctrl-C
const EXIT_ABORTED: i32 = 130;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let guard = init_logging(cli.verbose, cli.log_file.as_deref());

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => report(&e),
    };

    // Flush the file writer; a reader blocked on stdin would keep the
    // runtime alive, so exit explicitly.
    drop(guard);
    std::process::exit(code);
}

/// Print a failure and pick the exit code.
fn report(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<PipelineError>() {
        Some(pipeline) => {
            eprintln!("{}", ConsoleFormatter::format_error(pipeline));
            match pipeline {
                PipelineError::Aborted => EXIT_ABORTED,
                _ => 1,
            }
        }
        None => {
            eprintln!("Error: {:#}", error);
            1
        }
    }
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Option<WorkerGuard> {
    // Initialize logging based on verbosity level; RUST_LOG wins when set
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let directory = path.parent().filter(|p| !p.as_os_str().is_empty());
            let file_name = path.file_name().map(|n| n.to_os_string());
            match file_name {
                Some(name) => {
                    let appender =
                        tracing_appender::rolling::never(directory.unwrap_or(Path::new(".")), name);
                    let (writer, guard) = tracing_appender::non_blocking(appender);
                    let layer = tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer);
                    (Some(layer), Some(guard))
                }
                None => (None, None),
            }
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::ShowConfig => show_config(),
        Command::Generate(args) => generate(args, cli.quiet).await,
        Command::Experiment(args) => experiment(args).await,
    }
}

fn show_config() -> Result<()> {
    println!("Configuration sources (highest priority first):");
    println!("  env:     SCI_STORM_* (nested keys with __)");
    println!("  project: {}", describe(ConfigLoader::project_config_path().as_deref()));
    println!("  global:  {}", describe(ConfigLoader::global_config_path().as_deref()));

    let config = ConfigLoader::load_pipeline(None)?;
    println!();
    println!(
        "backend:     {} {} at {}",
        config.backend.provider.as_str(),
        config.backend.model,
        config.backend.base_url
    );
    if config.tool_server.enabled {
        println!("tool server: {}", config.tool_server.url);
        if let Some(command) = &config.tool_server.startup_command {
            println!("  start with: {}", command);
        }
    } else {
        println!("tool server: disabled");
    }
    let search_key = config.search.api_key.is_some() || std::env::var("TAVILY_API_KEY").is_ok();
    println!(
        "search:      {}",
        if search_key { "tavily" } else { "disabled (no API key)" }
    );
    println!("corpus:      {}", describe(config.corpus.directory.as_deref()));
    println!("rounds:      {}", config.debate.rounds);
    println!("output:      {}", config.output_path.display());
    println!("decisions:   {}", config.decision_log_path.display());
    Ok(())
}

fn describe(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none)".to_string())
}

async fn generate(args: GenerateArgs, quiet: bool) -> Result<()> {
    let mut config = ConfigLoader::load_pipeline(args.config.as_deref())?;
    if let Some(output) = &args.output {
        config = config.with_output_path(output);
    }
    if let Some(rounds) = args.rounds {
        config = config.with_rounds(rounds);
    }
    info!("Starting sci-storm with {}", config.backend.model);

    let brief = build_brief(&args)?;
    let mut seed = PipelineSeed::new(brief, config.debate.rounds);
    if let Some(path) = &args.experts {
        match load_roster(path)? {
            Some(roster) => seed = seed.with_roster(roster),
            None => warn!("Roster file {} is empty, using the default panel", path.display()),
        }
    }

    // === Dependency Injection ===
    let reviewer: Arc<dyn CheckpointReviewer> = if args.yes {
        Arc::new(AutoApproveReviewer)
    } else if args.no_interject {
        Arc::new(InteractiveCheckpointReviewer::new().without_interjections())
    } else {
        Arc::new(InteractiveCheckpointReviewer::new())
    };
    let progress: Arc<dyn ProgressNotifier> = if quiet {
        Arc::new(NoProgress)
    } else if args.yes {
        Arc::new(SimpleProgress)
    } else {
        Arc::new(ProgressReporter::new())
    };

    let producers = build_producers(&config).await?;
    let log: Arc<dyn DecisionLog> = if args.fresh {
        Arc::new(JsonlDecisionLog::fresh(&config.decision_log_path)?)
    } else {
        Arc::new(JsonlDecisionLog::open(&config.decision_log_path)?)
    };

    let mut orchestrator =
        CheckpointOrchestrator::new(producers, Arc::clone(&reviewer), log, seed)?
            .with_progress(progress);
    if orchestrator.stage() != Stage::StyleGoal && !quiet {
        println!(
            "Resuming at {} from {}",
            orchestrator.stage().display_name(),
            config.decision_log_path.display()
        );
    }

    let cancel = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, aborting the pipeline");
            cancel.cancel();
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(EXIT_ABORTED);
        }
    });

    let document = RunPipelineUseCase::new(&mut orchestrator, reviewer.as_ref())
        .execute()
        .await?;

    write_document(&config.output_path, &document)
        .with_context(|| format!("Failed to write {}", config.output_path.display()))?;
    println!("{}", ConsoleFormatter::format_written(&document, &config.output_path));
    Ok(())
}

fn build_brief(args: &GenerateArgs) -> Result<DocumentBrief> {
    let goal = match &args.goal {
        Some(goal) => goal.clone(),
        None if args.yes => bail!("--goal is required with --yes"),
        None => prompt_goal()?,
    };

    let mut brief = DocumentBrief::new(goal)?;
    if let Some(style) = args.style {
        brief = brief.with_style(style);
    }
    if let Some(structure) = &args.structure {
        brief = brief.with_structure(structure);
    }
    if let Some(language) = &args.language {
        brief = brief.with_language(language);
    }
    Ok(brief)
}

fn prompt_goal() -> Result<String> {
    print!("Research goal: ");
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
        bail!("No research goal given");
    }
    Ok(input.trim().to_string())
}

/// Connect to the tool server, starting it with `mcp.startup_command` when
/// it does not answer.
async fn connect_tool_server(settings: &ToolServerSettings) -> Result<ToolServerClient> {
    let transport = HttpToolServerTransport::new(settings)
        .context("Failed to build the tool server client")?;
    let launcher = settings
        .startup_command
        .as_deref()
        .map(|command| Arc::new(CommandLauncher::new(command)) as Arc<dyn ServerLauncher>);
    Ok(ToolServerClient::connect_or_launch(Arc::new(transport), settings.retry, launcher).await?)
}

async fn experiment(args: ExperimentArgs) -> Result<()> {
    let config = ConfigLoader::load_pipeline(args.config.as_deref())?;
    if !config.tool_server.enabled {
        bail!("The tool server is disabled (mcp.enabled: false)");
    }
    let code = std::fs::read_to_string(&args.code)
        .with_context(|| format!("Failed to read {}", args.code.display()))?;

    let client = connect_tool_server(&config.tool_server)
        .await
        .context("Tool server is not reachable")?;
    let result = client.run_experiment(&args.hypothesis, &code).await?;
    println!("{}", ToolServerClient::interpret_result(&result));
    Ok(())
}

async fn build_producers(config: &PipelineConfig) -> Result<StageProducers> {
    let transport = HttpCompletionTransport::new(&config.backend)
        .context("Failed to build the completion backend client")?;
    let backend = Arc::new(ResilientBackend::new(
        Arc::new(transport),
        config.backend.retry,
    ));

    let tool_server = if config.tool_server.enabled {
        let client = connect_tool_server(&config.tool_server)
            .await
            .context("Tool server is not reachable (set mcp.enabled: false to run without it)")?;
        Some(Arc::new(client))
    } else {
        info!("Tool server disabled");
        None
    };

    let search = TavilySearchClient::new(&config.search)
        .context("Failed to build the search client")?;

    let reference: Arc<dyn ReferenceIndexPort> = match &config.corpus.directory {
        Some(directory) => {
            let index = LocalReferenceIndex::ingest(directory)
                .with_context(|| format!("Failed to read corpus {}", directory.display()))?;
            info!("Indexed {} chunks from {}", index.chunks().len(), directory.display());
            Arc::new(index)
        }
        None => Arc::new(LocalReferenceIndex::empty()),
    };

    let evidence = GatherEvidenceUseCase::new(
        EvidenceSources {
            search: Arc::new(search),
            reference,
            tool_server,
        },
        config.debate.evidence_per_source,
        config.debate.source_timeout,
    );

    let options = CompletionOptions::default()
        .with_temperature(config.backend.temperature)
        .with_max_tokens(config.backend.max_tokens);

    Ok(StageProducers::new(backend, evidence, options))
}
