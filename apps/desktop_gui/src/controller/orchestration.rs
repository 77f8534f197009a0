//! Command orchestration from controller output to the backend command queue.

use client_core::Command;
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues `cmd` for the backend worker. Hands the command back when it could
/// not be queued so the caller can fail it locally.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: Command,
    status: &mut String,
) -> Result<(), Command> {
    let cmd_name = cmd.name();

    match cmd_tx.try_send(BackendCommand::Execute(cmd.clone())) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
            Err(cmd)
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend worker disconnected (possible startup/runtime failure); restart the application"
                    .to_string();
            Err(cmd)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn queues_commands_while_worker_is_listening() {
        let (cmd_tx, cmd_rx) = bounded(4);
        let mut status = String::new();

        let queued = dispatch_backend_command(
            &cmd_tx,
            Command::LoadMacros { public_only: false },
            &mut status,
        );

        assert!(queued.is_ok());
        assert!(status.is_empty());
        assert!(matches!(
            cmd_rx.try_recv(),
            Ok(BackendCommand::Execute(Command::LoadMacros { public_only: false }))
        ));
    }

    #[test]
    fn returns_command_when_queue_is_full() {
        let (cmd_tx, _cmd_rx) = bounded(1);
        let mut status = String::new();
        dispatch_backend_command(&cmd_tx, Command::LoadMacros { public_only: false }, &mut status)
            .expect("first fits");

        let rejected = dispatch_backend_command(
            &cmd_tx,
            Command::LoadMacros { public_only: true },
            &mut status,
        );

        assert_eq!(rejected, Err(Command::LoadMacros { public_only: true }));
        assert!(status.contains("full"));
    }

    #[test]
    fn reports_disconnected_worker() {
        let (cmd_tx, cmd_rx) = bounded(1);
        drop(cmd_rx);
        let mut status = String::new();

        let rejected = dispatch_backend_command(
            &cmd_tx,
            Command::LoadMacros { public_only: false },
            &mut status,
        );

        assert!(rejected.is_err());
        assert!(status.contains("disconnected"));
    }
}
