//! CLI entrypoint for huddle
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use huddle_application::{NotificationSink, Orchestrator, TurnExecutor};
use huddle_domain::{Group, Severity, has_errors};
use huddle_infrastructure::{
    ConfigLoader, FileConfig, InMemoryMessageLog, JsonlConversationLogger,
    TranscriptContextAssembler, WorkerRegistry, WorkerRuntime, WorkspaceMemory,
};
use huddle_presentation::{
    ChatRepl, Cli, ConsoleFormatter, ProgressReporter, SimpleProgress, compose_message,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_tracing(&cli);

    info!("Starting huddle");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            Severity::Error => eprintln!("error: {}", issue.message),
            Severity::Warning => eprintln!("warning: {}", issue.message),
        }
    }
    if has_errors(&issues) {
        bail!("Configuration is invalid, fix the errors above and retry.");
    }

    let group = select_group(&config, cli.group.as_deref())?;
    info!(
        "Group '{}' with {} worker(s)",
        group.id(),
        group.worker_ids().len()
    );

    // === Dependency Injection ===
    let registry = Arc::new(WorkerRegistry::new(config.workers.clone()));
    let runtime = Arc::new(WorkerRuntime::new(registry.clone()));
    for (worker_id, available) in runtime.health_check().await {
        if !available {
            warn!("Executor for worker '{}' is not available", worker_id);
        }
    }

    let log = Arc::new(InMemoryMessageLog::new());
    let context = Arc::new(TranscriptContextAssembler::new(
        log.clone(),
        registry.clone(),
    ));

    // In chat mode the user already sees what they typed
    let notifier: Arc<dyn NotificationSink> = if cli.quiet {
        Arc::new(SimpleProgress::new(!cli.chat))
    } else {
        Arc::new(ProgressReporter::new().with_echo_human(!cli.chat))
    };

    let mut executor = TurnExecutor::new(runtime, context, log).with_notifier(notifier);
    if let Some(path) = &config.logging.conversation_log
        && let Some(logger) = JsonlConversationLogger::new(path)
    {
        info!("Conversation log: {}", logger.path().display());
        executor = executor.with_conversation_logger(Arc::new(logger));
    }
    if config.memory.enabled {
        let mut memory = WorkspaceMemory::new(registry);
        if let Some(dir) = &config.memory.notes_dir {
            info!("Group notes: {}", dir.display());
            memory = memory.with_notes_dir(dir);
        }
        executor = executor.with_memory(Arc::new(memory));
    }

    let orchestrator = Arc::new(Orchestrator::new(executor));

    // Chat mode
    if cli.chat {
        let repl = ChatRepl::new(orchestrator, group, cli.author).with_summary(!cli.quiet);
        repl.run().await?;
        return Ok(());
    }

    // Single message mode - message is required
    let text = match cli.message {
        Some(text) => text,
        None => bail!("Message is required. Use --chat for interactive mode."),
    };

    let message = compose_message(&group, &cli.author, &text);
    let report = orchestrator.on_new_message(message, &group).await;

    if !cli.quiet {
        println!("{}", ConsoleFormatter::format_chain_summary(&report));
    }

    Ok(())
}

fn init_tracing(cli: &Cli) -> Option<WorkerGuard> {
    // RUST_LOG wins over -v
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));

    let (file_layer, guard) = match &cli.log_file {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "huddle.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

fn select_group(config: &FileConfig, requested: Option<&str>) -> Result<Group> {
    let mut groups = config.build_groups()?;
    if groups.is_empty() {
        bail!("No groups configured. Add a [[groups]] section to huddle.toml.");
    }

    match requested {
        Some(id) => match groups.iter().position(|g| g.id().as_str() == id) {
            Some(index) => Ok(groups.swap_remove(index)),
            None => bail!(
                "Unknown group '{}'. Configured groups: {}",
                id,
                groups
                    .iter()
                    .map(|g| g.id().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        },
        None => Ok(groups.swap_remove(0)),
    }
}
