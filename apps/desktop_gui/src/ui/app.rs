use std::{collections::VecDeque, mem, time::Duration};

use client_core::{
    Alert, ClientError, ClientSettings, Command, Control, ControlInput, HandlerRegistry,
    MacroController, Outcome,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::panels;

/// Control events collected while drawing a frame.
pub type FiredControls = Vec<(Control, ControlInput)>;

pub struct MacroStudioApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    controller: MacroController,
    registry: HandlerRegistry,
    fired: FiredControls,

    server_url: String,
    status: String,
    alerts: VecDeque<Alert>,
    startup_error: Option<UiError>,
}

impl MacroStudioApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: &ClientSettings,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            controller: MacroController::new(settings.public_only),
            registry: HandlerRegistry::standard(),
            fired: Vec::new(),
            server_url: settings.server_url.clone(),
            status: "Starting".to_string(),
            alerts: VecDeque::new(),
            startup_error: None,
        };
        app.fire(Control::Page, ControlInput::Activate);
        app.flush_controls();
        app
    }

    pub fn controller(&self) -> &MacroController {
        &self.controller
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn active_alert(&self) -> Option<&Alert> {
        self.alerts.front()
    }

    pub fn fire(&mut self, control: Control, input: ControlInput) {
        self.fired.push((control, input));
    }

    /// Routes every control event collected this frame through the controller.
    pub fn flush_controls(&mut self) {
        for (control, input) in mem::take(&mut self.fired) {
            // An open alert blocks everything except its own dismissal.
            if self.alerts.front().is_some() {
                tracing::debug!(?control, "control ignored while an alert is open");
                continue;
            }
            let commands = self.controller.dispatch(&self.registry, control, input);
            self.queue_commands(commands);
        }
        self.collect_alerts();
    }

    pub fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Outcome(outcome) => {
                    let commands = self.controller.apply(outcome);
                    self.queue_commands(commands);
                }
                UiEvent::Error(err) => {
                    tracing::warn!(context = ?err.context(), "{}", err.message());
                    self.status = err.status_line();
                    self.startup_error = Some(err);
                }
            }
        }
        self.collect_alerts();
    }

    pub fn dismiss_alert(&mut self) {
        self.alerts.pop_front();
    }

    fn queue_commands(&mut self, commands: Vec<Command>) {
        let mut pending = VecDeque::from(commands);
        while let Some(command) = pending.pop_front() {
            if let Err(rejected) = dispatch_backend_command(&self.cmd_tx, command, &mut self.status)
            {
                let outcome = Outcome::failed(rejected, ClientError::Unavailable(self.status.clone()));
                pending.extend(self.controller.apply(outcome));
            }
        }
    }

    fn collect_alerts(&mut self) {
        self.alerts.extend(self.controller.take_alerts());
    }
}

impl eframe::App for MacroStudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        panels::status_bar(
            ctx,
            &self.server_url,
            &self.status,
            self.startup_error.as_ref(),
            self.controller.last_download(),
        );
        panels::navigation_panel(ctx, &self.controller, &mut self.fired);
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::generation_form(ui, &self.controller, &mut self.fired);
            ui.separator();
            panels::macro_list(ui, &self.controller, &mut self.fired);
        });
        panels::version_window(ctx, &self.controller, &mut self.fired);

        if let Some(alert) = self.alerts.front() {
            if panels::alert_modal(ctx, alert) {
                self.dismiss_alert();
            }
        }

        self.flush_controls();
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

impl Drop for MacroStudioApp {
    fn drop(&mut self) {
        let _ = self.cmd_tx.try_send(BackendCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use client_core::{controller::GenerationMode, Intent};
    use crossbeam_channel::bounded;
    use shared::domain::{MacroCategory, MacroId, MacroRecord};

    fn settings() -> ClientSettings {
        ClientSettings {
            server_url: "http://127.0.0.1:3000".into(),
            download_dir: ".".into(),
            public_only: false,
            request_timeout_secs: None,
        }
    }

    fn template(id: i64) -> MacroRecord {
        MacroRecord {
            id: MacroId(id),
            title: Some(format!("Template {id}")),
            description: "Sub Template()\nEnd Sub".into(),
            category: MacroCategory::Template.into(),
            is_public: true,
            created_at: Utc::now(),
            latest_version: Some(1),
            content: None,
        }
    }

    #[test]
    fn startup_queues_initial_list_load() {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (_ui_tx, ui_rx) = bounded(8);
        let _app = MacroStudioApp::new(cmd_tx, ui_rx, &settings());

        assert!(matches!(
            cmd_rx.try_recv(),
            Ok(BackendCommand::Execute(Command::LoadMacros { public_only: false }))
        ));
    }

    #[test]
    fn backend_outcomes_update_rendered_state() {
        let (cmd_tx, _cmd_rx) = bounded(8);
        let (ui_tx, ui_rx) = bounded(8);
        let mut app = MacroStudioApp::new(cmd_tx, ui_rx, &settings());

        ui_tx
            .send(UiEvent::Outcome(Outcome::MacrosLoaded(Ok(vec![template(5)]))))
            .expect("send outcome");
        app.process_ui_events();

        assert_eq!(app.controller().templates().len(), 1);
        assert_eq!(app.controller().rendered_list()[0].title, "Template 5");
    }

    #[test]
    fn validation_alert_blocks_until_dismissed() {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (_ui_tx, ui_rx) = bounded(8);
        let mut app = MacroStudioApp::new(cmd_tx, ui_rx, &settings());
        let _ = cmd_rx.try_recv();

        app.fire(Control::GenerateButton, ControlInput::Activate);
        app.flush_controls();
        assert!(app.active_alert().is_some());
        assert!(cmd_rx.try_recv().is_err());

        app.fire(Control::RefreshButton, ControlInput::Activate);
        app.flush_controls();
        assert!(cmd_rx.try_recv().is_err());

        app.dismiss_alert();
        app.fire(Control::RefreshButton, ControlInput::Activate);
        app.flush_controls();
        assert!(cmd_rx.try_recv().is_ok());
    }

    #[test]
    fn dead_worker_fails_generate_and_reenables_button() {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (_ui_tx, ui_rx) = bounded(8);
        let mut app = MacroStudioApp::new(cmd_tx, ui_rx, &settings());
        drop(cmd_rx);

        app.controller.handle(Intent::SetMode(GenerationMode::Ai));
        app.controller
            .handle(Intent::EditDescription("merge duplicate rows".into()));
        app.controller
            .handle(Intent::SelectCategory(Some(MacroCategory::DataProcessing)));
        app.fire(Control::GenerateButton, ControlInput::Activate);
        app.flush_controls();

        assert!(app.controller().form().generate_enabled);
        assert!(app.active_alert().is_some());
        assert!(app.status().contains("disconnected"));
    }
}
