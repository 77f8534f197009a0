//! View and form state owned by the controller.

use shared::{
    domain::{CategoryTag, MacroCategory, MacroId},
    protocol::GenerateMacroRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(MacroCategory),
}

impl CategoryFilter {
    /// Unlisted tags only show under `All`.
    pub fn matches(self, category: &CategoryTag) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => *category == selected,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(category) => category.label(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    pub category_filter: CategoryFilter,
    pub public_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GenerationMode {
    #[default]
    Ai,
    Template,
}

impl GenerationMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Ai => "Generate with AI",
            Self::Template => "Use a template",
        }
    }
}

pub const MISSING_DESCRIPTION: &str = "Please describe the macro you want to generate.";
pub const MISSING_TEMPLATE: &str = "Please select a template.";
pub const MISSING_CATEGORY: &str = "Please select a category.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub mode: GenerationMode,
    pub description: String,
    pub description_enabled: bool,
    pub template_id: Option<MacroId>,
    pub template_picker_visible: bool,
    pub category: Option<MacroCategory>,
    pub category_enabled: bool,
    /// False while a generate request is in flight.
    pub generate_enabled: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            mode: GenerationMode::Ai,
            description: String::new(),
            description_enabled: true,
            template_id: None,
            template_picker_visible: false,
            category: None,
            category_enabled: true,
            generate_enabled: true,
        }
    }
}

impl FormState {
    pub fn set_mode(&mut self, mode: GenerationMode) {
        self.mode = mode;
        match mode {
            GenerationMode::Template => {
                self.template_picker_visible = true;
                self.description_enabled = false;
                self.category = Some(MacroCategory::Template);
                self.category_enabled = false;
            }
            GenerationMode::Ai => {
                self.template_picker_visible = false;
                self.description_enabled = true;
                self.category_enabled = true;
            }
        }
    }

    /// Builds the generate request, or the message explaining what is missing.
    pub fn build_request(&self) -> Result<GenerateMacroRequest, &'static str> {
        let use_ai = self.mode == GenerationMode::Ai;
        if use_ai && self.description.trim().is_empty() {
            return Err(MISSING_DESCRIPTION);
        }
        if !use_ai && self.template_id.is_none() {
            return Err(MISSING_TEMPLATE);
        }
        let Some(category) = self.category else {
            return Err(MISSING_CATEGORY);
        };

        Ok(GenerateMacroRequest {
            description: (!self.description.is_empty()).then(|| self.description.clone()),
            use_ai,
            template_id: if use_ai { None } else { self.template_id },
            category: Some(category),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateOption {
    pub id: MacroId,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Validation,
    Request,
}

/// A blocking message the front end must show to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Validation,
            message: message.into(),
        }
    }

    pub fn request(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Request,
            message: message.into(),
        }
    }
}
