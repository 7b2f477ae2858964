//! Run command - the watch service in the foreground.

use crate::cli::RunArgs;
use crate::config::Settings;
use crate::mode::ModeConfig;
use crate::service::{FileWatchService, ServiceOptions};

/// Merge CLI overrides into the options built from settings.
pub fn resolve_options(args: RunArgs, config: &Settings) -> ServiceOptions {
    let mut options = ServiceOptions::from_settings(config);

    if let Some(source) = args.source {
        options.source_dir = source;
    }
    if let Some(target) = args.target {
        options.target_dir = target;
    }
    if !args.modes.is_empty() {
        options.modes = args.modes.into_iter().collect::<ModeConfig>();
    }
    if let Some(limit) = args.max_concurrent {
        options.max_concurrent_tasks = Some(limit);
    }
    if let Some(grace_ms) = args.grace_ms {
        options.grace_period = std::time::Duration::from_millis(grace_ms);
    }

    options
}

/// Run the service until Ctrl-C.
pub async fn run(args: RunArgs, config: Settings) -> anyhow::Result<()> {
    let options = resolve_options(args, &config);
    let mut service = FileWatchService::new(options);

    eprintln!(
        "Watching {} -> {}",
        service.options().source_dir.display(),
        service.options().target_dir.display()
    );
    eprintln!("Press Ctrl+C to stop");

    service.run_until(shutdown_signal()).await?;

    eprintln!("Watcher shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("[service] cannot listen for ctrl+c: {e}");
        std::future::pending::<()>().await;
    }
    eprintln!("Received shutdown signal");
}
