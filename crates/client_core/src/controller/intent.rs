//! User intents and the registry that maps front-end controls onto them.

use std::collections::HashMap;

use shared::domain::{MacroCategory, MacroId};

use super::{
    state::{CategoryFilter, GenerationMode},
    MacroController,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Initialize,
    LoadMacros,
    Generate,
    Download(MacroId),
    SelectEntry(MacroId),
    SelectCategoryTab(CategoryFilter),
    SetPublicOnly(bool),
    SetMode(GenerationMode),
    EditDescription(String),
    SelectTemplate(Option<MacroId>),
    SelectCategory(Option<MacroCategory>),
    ToggleShare { macro_id: MacroId, is_public: bool },
    ShowVersionHistory(MacroId),
    CloseVersionHistory,
}

/// Identity of an interactive element in a front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Page,
    RefreshButton,
    GenerateButton,
    CategoryTab(CategoryFilter),
    PublicOnlyCheckbox,
    ModeRadio(GenerationMode),
    DescriptionField,
    TemplateSelect,
    CategorySelect,
    MacroEntry(MacroId),
    DownloadButton(MacroId),
    HistoryButton(MacroId),
    ShareButton(MacroId),
    VersionPanelClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Page,
    RefreshButton,
    GenerateButton,
    CategoryTab,
    PublicOnlyCheckbox,
    ModeRadio,
    DescriptionField,
    TemplateSelect,
    CategorySelect,
    MacroEntry,
    DownloadButton,
    HistoryButton,
    ShareButton,
    VersionPanelClose,
}

impl Control {
    pub fn kind(&self) -> ControlKind {
        match self {
            Self::Page => ControlKind::Page,
            Self::RefreshButton => ControlKind::RefreshButton,
            Self::GenerateButton => ControlKind::GenerateButton,
            Self::CategoryTab(_) => ControlKind::CategoryTab,
            Self::PublicOnlyCheckbox => ControlKind::PublicOnlyCheckbox,
            Self::ModeRadio(_) => ControlKind::ModeRadio,
            Self::DescriptionField => ControlKind::DescriptionField,
            Self::TemplateSelect => ControlKind::TemplateSelect,
            Self::CategorySelect => ControlKind::CategorySelect,
            Self::MacroEntry(_) => ControlKind::MacroEntry,
            Self::DownloadButton(_) => ControlKind::DownloadButton,
            Self::HistoryButton(_) => ControlKind::HistoryButton,
            Self::ShareButton(_) => ControlKind::ShareButton,
            Self::VersionPanelClose => ControlKind::VersionPanelClose,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlInput {
    Activate,
    Checked(bool),
    Text(String),
    Template(Option<MacroId>),
    Category(Option<MacroCategory>),
}

pub type Handler = fn(Control, ControlInput, &MacroController) -> Option<Intent>;

pub struct HandlerRegistry {
    handlers: HashMap<ControlKind, Handler>,
}

impl HandlerRegistry {
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry wiring every control to its default intent.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(ControlKind::Page, |_, _, _| Some(Intent::Initialize));
        registry.register(ControlKind::RefreshButton, |_, _, _| Some(Intent::LoadMacros));
        registry.register(ControlKind::GenerateButton, |_, _, controller| {
            controller
                .form()
                .generate_enabled
                .then_some(Intent::Generate)
        });
        registry.register(ControlKind::CategoryTab, |control, _, _| match control {
            Control::CategoryTab(filter) => Some(Intent::SelectCategoryTab(filter)),
            _ => None,
        });
        registry.register(ControlKind::PublicOnlyCheckbox, |_, input, _| match input {
            ControlInput::Checked(checked) => Some(Intent::SetPublicOnly(checked)),
            _ => None,
        });
        registry.register(ControlKind::ModeRadio, |control, _, _| match control {
            Control::ModeRadio(mode) => Some(Intent::SetMode(mode)),
            _ => None,
        });
        registry.register(ControlKind::DescriptionField, |_, input, controller| {
            match input {
                ControlInput::Text(text) if controller.form().description_enabled => {
                    Some(Intent::EditDescription(text))
                }
                _ => None,
            }
        });
        registry.register(ControlKind::TemplateSelect, |_, input, _| match input {
            ControlInput::Template(template_id) => Some(Intent::SelectTemplate(template_id)),
            _ => None,
        });
        registry.register(ControlKind::CategorySelect, |_, input, controller| {
            match input {
                ControlInput::Category(category) if controller.form().category_enabled => {
                    Some(Intent::SelectCategory(category))
                }
                _ => None,
            }
        });
        registry.register(ControlKind::MacroEntry, |control, _, _| match control {
            Control::MacroEntry(id) => Some(Intent::SelectEntry(id)),
            _ => None,
        });
        registry.register(ControlKind::DownloadButton, |control, _, _| match control {
            Control::DownloadButton(id) => Some(Intent::Download(id)),
            _ => None,
        });
        registry.register(ControlKind::HistoryButton, |control, _, _| match control {
            Control::HistoryButton(id) => Some(Intent::ShowVersionHistory(id)),
            _ => None,
        });
        registry.register(ControlKind::ShareButton, |control, _, controller| {
            let Control::ShareButton(id) = control else {
                return None;
            };
            controller
                .macro_by_id(id)
                .map(|record| Intent::ToggleShare {
                    macro_id: id,
                    is_public: !record.is_public,
                })
        });
        registry.register(ControlKind::VersionPanelClose, |_, _, _| {
            Some(Intent::CloseVersionHistory)
        });
        registry
    }

    pub fn register(&mut self, kind: ControlKind, handler: Handler) {
        self.handlers.insert(kind, handler);
    }

    pub fn resolve(
        &self,
        control: Control,
        input: ControlInput,
        controller: &MacroController,
    ) -> Option<Intent> {
        let handler = self.handlers.get(&control.kind())?;
        handler(control, input, controller)
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
