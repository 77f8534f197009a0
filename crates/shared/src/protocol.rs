use serde::{Deserialize, Serialize};

use crate::domain::{MacroCategory, MacroId};

/// Body of `POST /generate-macro`. Which fields are present depends on the mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateMacroRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub use_ai: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<MacroId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<MacroCategory>,
}

impl GenerateMacroRequest {
    pub fn from_template(template_id: MacroId) -> Self {
        Self {
            description: None,
            use_ai: false,
            template_id: Some(template_id),
            category: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareMacroRequest {
    pub is_public: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_request_omits_template_id() {
        let request = GenerateMacroRequest {
            description: Some("format the header row".into()),
            use_ai: true,
            template_id: None,
            category: Some(MacroCategory::Formatting),
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "description": "format the header row",
                "use_ai": true,
                "category": "FORMATTING"
            })
        );
    }

    #[test]
    fn template_download_request_carries_only_template_fields() {
        let value =
            serde_json::to_value(GenerateMacroRequest::from_template(MacroId(3))).expect("json");
        assert_eq!(value, serde_json::json!({ "use_ai": false, "template_id": 3 }));
    }
}
