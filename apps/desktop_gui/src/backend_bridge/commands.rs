//! Backend commands queued from UI to backend worker.

use client_core::Command;

pub enum BackendCommand {
    Execute(Command),
    Shutdown,
}
