//! Pure projections from controller state to what a front end draws.

use chrono::{DateTime, Local, Utc};
use shared::domain::{CategoryTag, MacroCategory, MacroId, MacroRecord, MacroVersion};

use super::state::{CategoryFilter, ViewState};

pub const UNTITLED_MACRO: &str = "Untitled macro";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeStyle {
    Primary,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroListItem {
    pub id: MacroId,
    pub category: CategoryTag,
    pub date_label: String,
    pub badge_label: String,
    pub badge_style: BadgeStyle,
    pub title: String,
    pub summary: String,
    pub is_public: bool,
    pub share_label: &'static str,
    /// Visibility the share button asks for.
    pub share_target: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    pub version_number: u32,
    pub heading: String,
    pub date_label: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    pub value: MacroCategory,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavTab {
    pub filter: CategoryFilter,
    pub label: &'static str,
    pub active: bool,
}

pub fn category_options() -> Vec<CategoryOption> {
    MacroCategory::ALL
        .into_iter()
        .map(|value| CategoryOption {
            value,
            label: value.label(),
        })
        .collect()
}

pub fn nav_tabs(view: &ViewState) -> Vec<NavTab> {
    std::iter::once(CategoryFilter::All)
        .chain(MacroCategory::ALL.into_iter().map(CategoryFilter::Only))
        .map(|filter| NavTab {
            filter,
            label: filter.label(),
            active: filter == view.category_filter,
        })
        .collect()
}

pub fn render_list(catalog: &[MacroRecord], view: &ViewState) -> Vec<MacroListItem> {
    catalog
        .iter()
        .filter(|record| view.category_filter.matches(&record.category))
        .map(render_item)
        .collect()
}

pub fn render_item(record: &MacroRecord) -> MacroListItem {
    MacroListItem {
        id: record.id,
        category: record.category.clone(),
        date_label: format_date(record.created_at),
        badge_label: record.category.label().to_string(),
        badge_style: if record.is_template() {
            BadgeStyle::Primary
        } else {
            BadgeStyle::Success
        },
        title: display_title(record.title.as_deref()),
        summary: summary_line(&record.description).to_string(),
        is_public: record.is_public,
        share_label: if record.is_public {
            "Make private"
        } else {
            "Share"
        },
        share_target: !record.is_public,
    }
}

pub fn render_versions(versions: &[MacroVersion]) -> Vec<VersionEntry> {
    versions
        .iter()
        .map(|version| VersionEntry {
            version_number: version.version_number,
            heading: format!("Version {}", version.version_number),
            date_label: format_date(version.created_at),
            content: version.content.clone(),
        })
        .collect()
}

pub fn display_title(title: Option<&str>) -> String {
    match title {
        Some(title) if !title.trim().is_empty() => title.to_string(),
        _ => UNTITLED_MACRO.to_string(),
    }
}

/// First line of the description, verbatim.
pub fn summary_line(description: &str) -> &str {
    description.lines().next().unwrap_or_default()
}

pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%Y-%m-%d").to_string()
}
