use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(MacroId);
id_newtype!(VersionId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MacroCategory {
    Template,
    AiGenerated,
    DataProcessing,
    Formatting,
    Calculation,
    Automation,
    Reporting,
    Custom,
}

impl MacroCategory {
    /// Display order used for select options and navigation tabs.
    pub const ALL: [MacroCategory; 8] = [
        MacroCategory::Template,
        MacroCategory::AiGenerated,
        MacroCategory::DataProcessing,
        MacroCategory::Formatting,
        MacroCategory::Calculation,
        MacroCategory::Automation,
        MacroCategory::Reporting,
        MacroCategory::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Template => "TEMPLATE",
            Self::AiGenerated => "AI_GENERATED",
            Self::DataProcessing => "DATA_PROCESSING",
            Self::Formatting => "FORMATTING",
            Self::Calculation => "CALCULATION",
            Self::Automation => "AUTOMATION",
            Self::Reporting => "REPORTING",
            Self::Custom => "CUSTOM",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Template => "Template",
            Self::AiGenerated => "AI Generated",
            Self::DataProcessing => "Data Processing",
            Self::Formatting => "Formatting",
            Self::Calculation => "Calculation",
            Self::Automation => "Automation",
            Self::Reporting => "Reporting",
            Self::Custom => "Custom",
        }
    }
}

impl fmt::Display for MacroCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown macro category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for MacroCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Category as stored on a record. The backend keeps categories as free text,
/// so tags outside the known table are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryTag {
    Known(MacroCategory),
    Other(String),
}

impl CategoryTag {
    pub fn known(&self) -> Option<MacroCategory> {
        match self {
            Self::Known(category) => Some(*category),
            Self::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(category) => category.as_str(),
            Self::Other(raw) => raw,
        }
    }

    /// Table label for known tags, the raw tag otherwise.
    pub fn label(&self) -> &str {
        match self {
            Self::Known(category) => category.label(),
            Self::Other(raw) => raw,
        }
    }
}

impl From<MacroCategory> for CategoryTag {
    fn from(category: MacroCategory) -> Self {
        Self::Known(category)
    }
}

impl PartialEq<MacroCategory> for CategoryTag {
    fn eq(&self, other: &MacroCategory) -> bool {
        self.known() == Some(*other)
    }
}

impl fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroRecord {
    pub id: MacroId,
    #[serde(default)]
    pub title: Option<String>,
    pub description: String,
    pub category: CategoryTag,
    pub is_public: bool,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl MacroRecord {
    pub fn is_template(&self) -> bool {
        self.category == MacroCategory::Template
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroVersion {
    pub id: VersionId,
    pub macro_id: MacroId,
    pub version_number: u32,
    pub content: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Accepts RFC 3339 as well as offset-less ISO-8601 (treated as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_isoformat_without_offset() {
        let parsed = parse_timestamp("2024-03-05T10:20:30.123456").expect("naive timestamp");
        assert_eq!(parsed.to_rfc3339(), "2024-03-05T10:20:30.123456+00:00");
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_timestamp("2024-03-05T10:20:30+09:00").expect("offset timestamp");
        assert_eq!(parsed.to_rfc3339(), "2024-03-05T01:20:30+00:00");
    }

    #[test]
    fn deserializes_macro_record_from_backend_json() {
        let record: MacroRecord = serde_json::from_str(
            r#"{
                "id": 7,
                "title": null,
                "description": "Sum the selection\nthen show it",
                "category": "DATA_PROCESSING",
                "created_at": "2024-01-02T03:04:05",
                "is_public": false,
                "latest_version": 2,
                "content": "Sub Foo()"
            }"#,
        )
        .expect("macro record");

        assert_eq!(record.id, MacroId(7));
        assert_eq!(record.title, None);
        assert_eq!(record.category, MacroCategory::DataProcessing);
        assert!(!record.is_public);
        assert_eq!(record.latest_version, Some(2));
    }

    #[test]
    fn keeps_records_with_unlisted_category_tags() {
        let records: Vec<MacroRecord> = serde_json::from_str(
            r#"[
                {"id": 1, "title": "Old", "description": "legacy", "category": "LEGACY",
                 "created_at": "2024-01-02T03:04:05", "is_public": true},
                {"id": 2, "title": "Base", "description": "base", "category": "TEMPLATE",
                 "created_at": "2024-01-02T03:04:05", "is_public": true}
            ]"#,
        )
        .expect("macro list");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, CategoryTag::Other("LEGACY".into()));
        assert_eq!(records[0].category.label(), "LEGACY");
        assert!(!records[0].is_template());
        assert!(records[1].is_template());
        assert_eq!(
            serde_json::to_string(&records[0].category).expect("serialize"),
            "\"LEGACY\""
        );
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(
            "ai-generated".parse::<MacroCategory>(),
            Ok(MacroCategory::AiGenerated)
        );
        assert!("SPREADSHEET".parse::<MacroCategory>().is_err());
    }

    #[test]
    fn category_tags_round_trip_through_serde() {
        for category in MacroCategory::ALL {
            let json = serde_json::to_string(&category).expect("serialize");
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }
}
