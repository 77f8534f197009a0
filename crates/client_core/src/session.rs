//! Runs controller commands against a backend and feeds the outcomes back.

use std::collections::VecDeque;

use tracing::debug;

use crate::{
    api::MacroApi,
    controller::{Command, Intent, MacroController, Outcome},
    downloads::ArtifactSink,
};

/// Executes a single command. Never fails: errors travel inside the outcome.
pub async fn execute(command: Command, api: &dyn MacroApi, sink: &dyn ArtifactSink) -> Outcome {
    debug!(command = command.name(), "executing command");
    match command {
        Command::LoadMacros { public_only } => {
            Outcome::MacrosLoaded(api.list_macros(public_only).await)
        }
        Command::LoadVersions { macro_id } => Outcome::VersionsLoaded {
            macro_id,
            result: api.list_versions(macro_id).await,
        },
        Command::Generate {
            origin,
            request,
            artifact_name,
        } => {
            let result = match api.generate(&request).await {
                Ok(bytes) => sink.save(artifact_name, &bytes).await,
                Err(err) => Err(err),
            };
            Outcome::Generated { origin, result }
        }
        Command::SetShare {
            macro_id,
            is_public,
        } => Outcome::ShareUpdated {
            macro_id,
            is_public,
            result: api.set_share(macro_id, is_public).await,
        },
    }
}

/// Sequential driver used by the CLI and tests: each intent runs to
/// completion, including any follow-up refresh.
pub struct MacroSession<A, S> {
    controller: MacroController,
    api: A,
    sink: S,
}

impl<A: MacroApi, S: ArtifactSink> MacroSession<A, S> {
    pub fn new(controller: MacroController, api: A, sink: S) -> Self {
        Self {
            controller,
            api,
            sink,
        }
    }

    pub fn controller(&self) -> &MacroController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut MacroController {
        &mut self.controller
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub async fn dispatch(&mut self, intent: Intent) {
        let commands = self.controller.handle(intent);
        self.run(commands).await;
    }

    pub async fn run(&mut self, commands: Vec<Command>) {
        let mut queue = VecDeque::from(commands);
        while let Some(command) = queue.pop_front() {
            let outcome = execute(command, &self.api, &self.sink).await;
            queue.extend(self.controller.apply(outcome));
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
