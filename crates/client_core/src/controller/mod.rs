//! Client controller: turns user intents into backend commands and backend
//! outcomes into view state.
//!
//! The controller never performs I/O itself. `handle` and `apply` return the
//! commands an executor must run next; every mutating success path ends in a
//! `Command::LoadMacros` so the rendered list always mirrors the server.

use std::{collections::VecDeque, path::PathBuf};

use shared::{
    domain::{MacroId, MacroRecord, MacroVersion},
    protocol::GenerateMacroRequest,
};
use tracing::{debug, info, warn};

use crate::{
    downloads::{DOWNLOAD_ARTIFACT_NAME, GENERATED_ARTIFACT_NAME},
    error::ClientError,
};

pub mod intent;
pub mod render;
pub mod state;

pub use intent::{Control, ControlInput, ControlKind, HandlerRegistry, Intent};
pub use render::{BadgeStyle, CategoryOption, MacroListItem, NavTab, VersionEntry};
pub use state::{
    Alert, AlertKind, CategoryFilter, FormState, GenerationMode, TemplateOption, ViewState,
};

pub const GENERATION_FAILED: &str = "Macro generation failed.";
pub const DOWNLOAD_FAILED: &str = "Macro download failed.";
pub const SHARE_FAILED: &str = "Failed to update sharing settings.";

/// Which control a generate request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOrigin {
    Form,
    Download(MacroId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadMacros {
        public_only: bool,
    },
    LoadVersions {
        macro_id: MacroId,
    },
    Generate {
        origin: GenerateOrigin,
        request: GenerateMacroRequest,
        artifact_name: &'static str,
    },
    SetShare {
        macro_id: MacroId,
        is_public: bool,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadMacros { .. } => "load_macros",
            Self::LoadVersions { .. } => "load_versions",
            Self::Generate {
                origin: GenerateOrigin::Form,
                ..
            } => "generate",
            Self::Generate { .. } => "download",
            Self::SetShare { .. } => "set_share",
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    MacrosLoaded(Result<Vec<MacroRecord>, ClientError>),
    VersionsLoaded {
        macro_id: MacroId,
        result: Result<Vec<MacroVersion>, ClientError>,
    },
    Generated {
        origin: GenerateOrigin,
        result: Result<PathBuf, ClientError>,
    },
    ShareUpdated {
        macro_id: MacroId,
        is_public: bool,
        result: Result<(), ClientError>,
    },
}

impl Outcome {
    /// Outcome for a command that never reached the backend.
    pub fn failed(command: Command, err: ClientError) -> Self {
        match command {
            Command::LoadMacros { .. } => Self::MacrosLoaded(Err(err)),
            Command::LoadVersions { macro_id } => Self::VersionsLoaded {
                macro_id,
                result: Err(err),
            },
            Command::Generate { origin, .. } => Self::Generated {
                origin,
                result: Err(err),
            },
            Command::SetShare {
                macro_id,
                is_public,
            } => Self::ShareUpdated {
                macro_id,
                is_public,
                result: Err(err),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VersionPanel {
    #[default]
    Hidden,
    Shown {
        macro_id: MacroId,
        entries: Vec<VersionEntry>,
    },
}

#[derive(Debug, Default)]
pub struct MacroController {
    view: ViewState,
    form: FormState,
    catalog: Vec<MacroRecord>,
    templates: Vec<TemplateOption>,
    versions: VersionPanel,
    alerts: VecDeque<Alert>,
    last_download: Option<PathBuf>,
}

impl MacroController {
    pub fn new(public_only: bool) -> Self {
        Self {
            view: ViewState {
                category_filter: CategoryFilter::All,
                public_only,
            },
            ..Self::default()
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn catalog(&self) -> &[MacroRecord] {
        &self.catalog
    }

    pub fn templates(&self) -> &[TemplateOption] {
        &self.templates
    }

    pub fn version_panel(&self) -> &VersionPanel {
        &self.versions
    }

    pub fn last_download(&self) -> Option<&PathBuf> {
        self.last_download.as_ref()
    }

    pub fn macro_by_id(&self, id: MacroId) -> Option<&MacroRecord> {
        self.catalog.iter().find(|record| record.id == id)
    }

    pub fn rendered_list(&self) -> Vec<MacroListItem> {
        render::render_list(&self.catalog, &self.view)
    }

    pub fn nav_tabs(&self) -> Vec<NavTab> {
        render::nav_tabs(&self.view)
    }

    pub fn category_options(&self) -> Vec<CategoryOption> {
        render::category_options()
    }

    pub fn pending_alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn take_alerts(&mut self) -> Vec<Alert> {
        self.alerts.drain(..).collect()
    }

    /// Resolves a control event through `registry` and handles the intent.
    pub fn dispatch(
        &mut self,
        registry: &HandlerRegistry,
        control: Control,
        input: ControlInput,
    ) -> Vec<Command> {
        match registry.resolve(control, input, self) {
            Some(intent) => self.handle(intent),
            None => {
                debug!(?control, "control event produced no intent");
                Vec::new()
            }
        }
    }

    pub fn handle(&mut self, intent: Intent) -> Vec<Command> {
        match intent {
            Intent::Initialize => {
                info!(public_only = self.view.public_only, "initializing macro controller");
                vec![self.load_command()]
            }
            Intent::LoadMacros => vec![self.load_command()],
            Intent::Generate => self.begin_generate(),
            Intent::Download(macro_id) => vec![Command::Generate {
                origin: GenerateOrigin::Download(macro_id),
                request: GenerateMacroRequest::from_template(macro_id),
                artifact_name: DOWNLOAD_ARTIFACT_NAME,
            }],
            Intent::SelectEntry(macro_id) => {
                self.select_entry(macro_id);
                Vec::new()
            }
            Intent::SelectCategoryTab(filter) => {
                self.view.category_filter = filter;
                vec![self.load_command()]
            }
            Intent::SetPublicOnly(public_only) => {
                self.view.public_only = public_only;
                vec![self.load_command()]
            }
            Intent::SetMode(mode) => {
                self.form.set_mode(mode);
                Vec::new()
            }
            Intent::EditDescription(text) => {
                if self.form.description_enabled {
                    self.form.description = text;
                }
                Vec::new()
            }
            Intent::SelectTemplate(template_id) => {
                self.select_template(template_id);
                Vec::new()
            }
            Intent::SelectCategory(category) => {
                if self.form.category_enabled {
                    self.form.category = category;
                }
                Vec::new()
            }
            Intent::ToggleShare {
                macro_id,
                is_public,
            } => vec![Command::SetShare {
                macro_id,
                is_public,
            }],
            Intent::ShowVersionHistory(macro_id) => vec![Command::LoadVersions { macro_id }],
            Intent::CloseVersionHistory => {
                self.versions = VersionPanel::Hidden;
                Vec::new()
            }
        }
    }

    pub fn apply(&mut self, outcome: Outcome) -> Vec<Command> {
        match outcome {
            Outcome::MacrosLoaded(Ok(macros)) => {
                info!(count = macros.len(), "macro list loaded");
                self.replace_catalog(macros);
                Vec::new()
            }
            Outcome::MacrosLoaded(Err(err)) => {
                warn!("failed to load macros: {err}");
                Vec::new()
            }
            Outcome::VersionsLoaded {
                macro_id,
                result: Ok(versions),
            } => {
                self.versions = VersionPanel::Shown {
                    macro_id,
                    entries: render::render_versions(&versions),
                };
                Vec::new()
            }
            Outcome::VersionsLoaded {
                macro_id,
                result: Err(err),
            } => {
                warn!(%macro_id, "failed to load version history: {err}");
                Vec::new()
            }
            Outcome::Generated {
                origin: GenerateOrigin::Form,
                result,
            } => {
                self.form.generate_enabled = true;
                match result {
                    Ok(path) => {
                        info!(path = %path.display(), "generated macro downloaded");
                        self.last_download = Some(path);
                        vec![self.load_command()]
                    }
                    Err(err) => {
                        warn!("macro generation failed: {err}");
                        self.alerts.push_back(Alert::request(GENERATION_FAILED));
                        Vec::new()
                    }
                }
            }
            Outcome::Generated {
                origin: GenerateOrigin::Download(macro_id),
                result,
            } => {
                match result {
                    Ok(path) => {
                        info!(%macro_id, path = %path.display(), "macro downloaded");
                        self.last_download = Some(path);
                    }
                    Err(err) => {
                        warn!(%macro_id, "macro download failed: {err}");
                        self.alerts.push_back(Alert::request(DOWNLOAD_FAILED));
                    }
                }
                Vec::new()
            }
            Outcome::ShareUpdated {
                macro_id,
                is_public,
                result,
            } => match result {
                Ok(()) => {
                    info!(%macro_id, is_public, "sharing updated");
                    vec![self.load_command()]
                }
                Err(err) => {
                    warn!(%macro_id, is_public, "sharing update failed: {err}");
                    self.alerts.push_back(Alert::request(SHARE_FAILED));
                    Vec::new()
                }
            },
        }
    }

    fn load_command(&self) -> Command {
        Command::LoadMacros {
            public_only: self.view.public_only,
        }
    }

    fn begin_generate(&mut self) -> Vec<Command> {
        if !self.form.generate_enabled {
            debug!("generate ignored while a request is in flight");
            return Vec::new();
        }

        match self.form.build_request() {
            Ok(request) => {
                self.form.generate_enabled = false;
                vec![Command::Generate {
                    origin: GenerateOrigin::Form,
                    request,
                    artifact_name: GENERATED_ARTIFACT_NAME,
                }]
            }
            Err(message) => {
                self.alerts.push_back(Alert::validation(message));
                Vec::new()
            }
        }
    }

    fn select_entry(&mut self, macro_id: MacroId) {
        let Some(record) = self.macro_by_id(macro_id).cloned() else {
            warn!(%macro_id, "selected macro is not in the current list");
            return;
        };

        if record.is_template() {
            self.form.set_mode(GenerationMode::Template);
            self.form.template_id = Some(record.id);
        } else {
            self.form.set_mode(GenerationMode::Ai);
        }
        self.form.description = record.description;
        self.form.category = record.category.known();
    }

    fn select_template(&mut self, template_id: Option<MacroId>) {
        match template_id {
            Some(id) if !self.templates.iter().any(|option| option.id == id) => {
                warn!(template_id = %id, "ignoring unknown template selection");
            }
            _ => self.form.template_id = template_id,
        }
    }

    fn replace_catalog(&mut self, macros: Vec<MacroRecord>) {
        self.templates = macros
            .iter()
            .filter(|record| record.is_template())
            .map(|record| TemplateOption {
                id: record.id,
                title: render::display_title(record.title.as_deref()),
            })
            .collect();

        if let Some(selected) = self.form.template_id {
            if !self.templates.iter().any(|option| option.id == selected) {
                self.form.template_id = None;
            }
        }
        self.catalog = macros;
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
