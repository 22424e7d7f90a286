// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tally serve` command implementation.
//!
//! Wires the configured task store, the in-memory session store, the
//! conversation controller, and the Telegram channel together, then long
//! polls until a shutdown signal arrives.

use std::sync::Arc;

use tracing::info;

use tally_bot::{Controller, Dispatcher, InMemorySessionStore, TextResources};
use tally_config::TallyConfig;
use tally_core::{PluginAdapter, TallyError, TaskStore};
use tally_storage::{MemoryTaskStore, SqliteTaskStore};
use tally_telegram::TelegramChannel;

use crate::shutdown;

/// Runs the `tally serve` command.
pub async fn run_serve(config: TallyConfig) -> Result<(), TallyError> {
    init_tracing(&config.agent.log_level);

    info!(name = %config.agent.name, "starting tally serve");

    let tasks = build_task_store(&config).await?;
    info!(store = tasks.name(), "task store ready");

    let texts = Arc::new(TextResources::english());
    let sessions = Arc::new(InMemorySessionStore::new());
    let controller = Controller::new(
        tasks.clone(),
        sessions,
        texts.clone(),
        config.tasks.clone(),
    );
    let dispatcher = Arc::new(Dispatcher::new(controller, texts.clone()));

    let channel = Arc::new(TelegramChannel::new(config.telegram.clone(), texts)?);

    let cancel = shutdown::install_signal_handler();

    tokio::select! {
        _ = channel.clone().run(dispatcher) => {
            info!("Telegram polling stopped");
        }
        _ = cancel.cancelled() => {
            info!("shutdown signal received");
        }
    }

    // Checkpoint and close storage before exiting.
    tasks.shutdown().await?;
    channel.shutdown().await?;

    info!("tally serve shutdown complete");
    Ok(())
}

/// Builds the task store the configuration selects: durable SQLite by
/// default, the in-memory store when `storage.in_memory` is set.
async fn build_task_store(config: &TallyConfig) -> Result<Arc<dyn TaskStore>, TallyError> {
    if config.storage.in_memory {
        return Ok(Arc::new(MemoryTaskStore::new(config.tasks.clone())));
    }

    let store = SqliteTaskStore::new(config.storage.clone(), config.tasks.clone());
    store.initialize().await?;
    Ok(Arc::new(store))
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tally={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
