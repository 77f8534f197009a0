//! Client side of the macro studio: backend access, artifact downloads, and
//! the controller that front ends drive.

pub mod api;
pub mod config;
pub mod controller;
pub mod downloads;
pub mod error;
pub mod session;

pub use api::{HttpMacroApi, MacroApi};
pub use config::{load_settings, ClientSettings, ConfigError};
pub use controller::{
    Alert, AlertKind, Command, Control, ControlInput, GenerateOrigin, HandlerRegistry, Intent,
    MacroController, Outcome,
};
pub use downloads::{ArtifactSink, DirectoryArtifactSink};
pub use error::ClientError;
pub use session::{execute, MacroSession};

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
