//! Backend worker: owns the tokio runtime and the HTTP client, executes
//! controller commands, and reports outcomes to the UI thread.

use std::{sync::Arc, thread};

use client_core::{execute, ClientSettings, DirectoryArtifactSink, HttpMacroApi, Outcome};
use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    settings: ClientSettings,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let api = match HttpMacroApi::with_timeout(
            &settings.server_url,
            settings.request_timeout(),
        ) {
            Ok(api) => Arc::new(api),
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    err.to_string(),
                )));
                tracing::error!("failed to initialize backend client: {err}");
                return;
            }
        };
        let sink = Arc::new(DirectoryArtifactSink::new(settings.download_dir.clone()));
        tracing::info!(
            server_url = %api.base_url(),
            download_dir = %sink.dir().display(),
            "backend worker ready"
        );
        let _ = ui_tx.try_send(UiEvent::Info(format!(
            "Connected to {}; downloads go to {}",
            settings.server_url,
            settings.download_dir.display()
        )));

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                let command = match cmd {
                    BackendCommand::Execute(command) => command,
                    BackendCommand::Shutdown => break,
                };

                // Each command runs on its own task: requests from different
                // controls may overlap.
                let api = Arc::clone(&api);
                let sink = Arc::clone(&sink);
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let outcome = execute(command, api.as_ref(), sink.as_ref()).await;
                    deliver_outcome(&ui_tx, outcome);
                });
            }
            tracing::info!("backend worker stopping");
        });
    })
}

/// Hands an outcome to the UI without blocking a runtime worker.
fn deliver_outcome(ui_tx: &Sender<UiEvent>, outcome: Outcome) -> bool {
    match ui_tx.try_send(UiEvent::Outcome(outcome)) {
        Ok(()) => true,
        Err(TrySendError::Full(UiEvent::Outcome(outcome))) => {
            tracing::warn!(?outcome, "ui event queue full; dropping backend outcome");
            false
        }
        Err(TrySendError::Full(_)) => false,
        Err(TrySendError::Disconnected(_)) => {
            tracing::debug!("ui closed before outcome was delivered");
            false
        }
    }
}
