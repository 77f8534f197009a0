//! Panels drawn every frame. They read controller state and record the
//! controls the user touched; the app routes those through the registry.

use std::path::PathBuf;

use client_core::{
    controller::{BadgeStyle, GenerationMode, MacroListItem, VersionPanel},
    Alert, AlertKind, Control, ControlInput, MacroController,
};
use eframe::egui;

use crate::controller::events::UiError;
use crate::ui::app::FiredControls;

const BADGE_PRIMARY: egui::Color32 = egui::Color32::from_rgb(13, 110, 253);
const BADGE_SUCCESS: egui::Color32 = egui::Color32::from_rgb(25, 135, 84);

pub fn navigation_panel(ctx: &egui::Context, controller: &MacroController, fired: &mut FiredControls) {
    egui::SidePanel::left("category_nav")
        .resizable(false)
        .default_width(180.0)
        .show(ctx, |ui| {
            ui.heading("Categories");
            ui.add_space(4.0);
            for tab in controller.nav_tabs() {
                if ui.selectable_label(tab.active, tab.label).clicked() && !tab.active {
                    fired.push((Control::CategoryTab(tab.filter), ControlInput::Activate));
                }
            }

            ui.separator();
            let mut public_only = controller.view().public_only;
            if ui.checkbox(&mut public_only, "Public only").changed() {
                fired.push((Control::PublicOnlyCheckbox, ControlInput::Checked(public_only)));
            }
            if ui.button("Refresh").clicked() {
                fired.push((Control::RefreshButton, ControlInput::Activate));
            }
        });
}

pub fn generation_form(ui: &mut egui::Ui, controller: &MacroController, fired: &mut FiredControls) {
    let form = controller.form();
    ui.heading("Generate macro");

    ui.horizontal(|ui| {
        for mode in [GenerationMode::Ai, GenerationMode::Template] {
            if ui.radio(form.mode == mode, mode.label()).clicked() && form.mode != mode {
                fired.push((Control::ModeRadio(mode), ControlInput::Activate));
            }
        }
    });

    if form.template_picker_visible {
        let selected = form
            .template_id
            .and_then(|id| controller.templates().iter().find(|t| t.id == id))
            .map(|t| t.title.clone())
            .unwrap_or_else(|| "Select a template".to_string());
        egui::ComboBox::from_id_salt("template_select")
            .selected_text(selected)
            .width(280.0)
            .show_ui(ui, |ui| {
                for option in controller.templates() {
                    let active = form.template_id == Some(option.id);
                    if ui.selectable_label(active, &option.title).clicked() && !active {
                        fired.push((
                            Control::TemplateSelect,
                            ControlInput::Template(Some(option.id)),
                        ));
                    }
                }
            });
    }

    ui.add_enabled_ui(form.category_enabled, |ui| {
        let selected = form
            .category
            .map(|category| category.label())
            .unwrap_or("Select a category");
        egui::ComboBox::from_id_salt("category_select")
            .selected_text(selected)
            .width(280.0)
            .show_ui(ui, |ui| {
                for option in controller.category_options() {
                    let active = form.category == Some(option.value);
                    if ui.selectable_label(active, option.label).clicked() && !active {
                        fired.push((
                            Control::CategorySelect,
                            ControlInput::Category(Some(option.value)),
                        ));
                    }
                }
            });
    });

    let mut description = form.description.clone();
    let edit = ui.add_enabled(
        form.description_enabled,
        egui::TextEdit::multiline(&mut description)
            .hint_text("Describe the macro you need")
            .desired_rows(4)
            .desired_width(f32::INFINITY),
    );
    if edit.changed() {
        fired.push((Control::DescriptionField, ControlInput::Text(description)));
    }

    let label = if form.generate_enabled {
        "Generate"
    } else {
        "Generating..."
    };
    if ui
        .add_enabled(form.generate_enabled, egui::Button::new(label))
        .clicked()
    {
        fired.push((Control::GenerateButton, ControlInput::Activate));
    }
}

pub fn macro_list(ui: &mut egui::Ui, controller: &MacroController, fired: &mut FiredControls) {
    let items = controller.rendered_list();
    if items.is_empty() {
        ui.weak("No macros to show.");
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for item in &items {
                let _ = macro_row(ui, item, fired);
                ui.add_space(6.0);
            }
        });
}

/// Draws one list item. A click anywhere on the item loads it into the form;
/// the buttons sit on top and keep their own clicks.
fn macro_row(ui: &mut egui::Ui, item: &MacroListItem, fired: &mut FiredControls) -> egui::Response {
    let row = ui.scope_builder(egui::UiBuilder::new().sense(egui::Sense::click()), |ui| {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.weak(&item.date_label);
                let fill = match item.badge_style {
                    BadgeStyle::Primary => BADGE_PRIMARY,
                    BadgeStyle::Success => BADGE_SUCCESS,
                };
                ui.label(
                    egui::RichText::new(&item.badge_label)
                        .small()
                        .color(egui::Color32::WHITE)
                        .background_color(fill),
                );
            });

            ui.label(egui::RichText::new(&item.title).strong());
            if !item.summary.is_empty() {
                ui.label(&item.summary);
            }

            ui.horizontal(|ui| {
                if ui.button("Download").clicked() {
                    fired.push((Control::DownloadButton(item.id), ControlInput::Activate));
                }
                if ui.button("History").clicked() {
                    fired.push((Control::HistoryButton(item.id), ControlInput::Activate));
                }
                if ui.button(item.share_label).clicked() {
                    fired.push((Control::ShareButton(item.id), ControlInput::Activate));
                }
            });
        });
    });

    let response = row.response.on_hover_text("Load into the form");
    if response.clicked() {
        fired.push((Control::MacroEntry(item.id), ControlInput::Activate));
    }
    response
}

pub fn version_window(ctx: &egui::Context, controller: &MacroController, fired: &mut FiredControls) {
    let VersionPanel::Shown { macro_id, entries } = controller.version_panel() else {
        return;
    };

    let mut open = true;
    egui::Window::new(format!("Version history #{}", macro_id.0))
        .id(egui::Id::new("version_history"))
        .open(&mut open)
        .default_width(520.0)
        .default_height(420.0)
        .show(ctx, |ui| {
            if entries.is_empty() {
                ui.weak("No versions recorded.");
                return;
            }
            egui::ScrollArea::vertical().show(ui, |ui| {
                for entry in entries {
                    ui.horizontal(|ui| {
                        ui.strong(&entry.heading);
                        ui.weak(&entry.date_label);
                    });
                    ui.label(egui::RichText::new(&entry.content).monospace());
                    ui.separator();
                }
            });
        });

    if !open {
        fired.push((Control::VersionPanelClose, ControlInput::Activate));
    }
}

/// Draws the front alert. Returns true once the user dismissed it.
pub fn alert_modal(ctx: &egui::Context, alert: &Alert) -> bool {
    let title = match alert.kind {
        AlertKind::Validation => "Check the form",
        AlertKind::Request => "Request failed",
    };
    let mut dismissed = false;
    let response = egui::Modal::new(egui::Id::new("alert_modal")).show(ctx, |ui| {
        ui.set_width(320.0);
        ui.heading(title);
        ui.label(&alert.message);
        ui.add_space(8.0);
        if ui.button("OK").clicked() {
            dismissed = true;
        }
    });
    dismissed || response.should_close()
}

pub fn status_bar(
    ctx: &egui::Context,
    server_url: &str,
    status: &str,
    startup_error: Option<&UiError>,
    last_download: Option<&PathBuf>,
) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.weak(server_url);
            ui.separator();
            match startup_error {
                Some(err) => {
                    ui.colored_label(ui.visuals().error_fg_color, err.status_line());
                }
                None => {
                    ui.label(status);
                }
            }
            if let Some(path) = last_download {
                ui.separator();
                ui.label(format!("Saved {}", path.display()));
            }
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use client_core::controller::render::render_item;
    use shared::domain::{MacroCategory, MacroId, MacroRecord};

    fn list_item() -> MacroListItem {
        render_item(&MacroRecord {
            id: MacroId(4),
            title: Some("Monthly report".into()),
            description: "Builds the monthly summary sheet".into(),
            category: MacroCategory::Reporting.into(),
            is_public: false,
            created_at: Utc::now(),
            latest_version: None,
            content: None,
        })
    }

    fn pointer_button(pos: egui::Pos2, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        }
    }

    fn draw_row(
        ctx: &egui::Context,
        events: Vec<egui::Event>,
        item: &MacroListItem,
        fired: &mut FiredControls,
    ) -> egui::Rect {
        let mut rect = egui::Rect::NOTHING;
        let input = egui::RawInput {
            events,
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                rect = macro_row(ui, item, fired).rect;
            });
        });
        rect
    }

    #[test]
    fn clicking_anywhere_on_a_row_loads_the_entry() {
        let ctx = egui::Context::default();
        let item = list_item();
        let mut fired = Vec::new();

        let rect = draw_row(&ctx, Vec::new(), &item, &mut fired);
        let pos = rect.left_top() + egui::vec2(2.0, 2.0);
        draw_row(
            &ctx,
            vec![egui::Event::PointerMoved(pos), pointer_button(pos, true)],
            &item,
            &mut fired,
        );
        draw_row(&ctx, vec![pointer_button(pos, false)], &item, &mut fired);

        assert_eq!(
            fired,
            vec![(Control::MacroEntry(MacroId(4)), ControlInput::Activate)]
        );
    }
}
