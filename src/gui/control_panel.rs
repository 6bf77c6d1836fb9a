//! Control Panel Widget
//! Left side panel with the dataset summary, view state and actions.

use crate::charts::{ChartView, HoverTarget};
use egui::{Color32, RichText};

/// Left side control panel.
pub struct ControlPanel {
    pub status: String,
    /// Open exported files with the system viewer.
    pub open_after_export: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            status: "Ready".to_string(),
            open_after_export: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, view: Option<&ChartView>) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Timebar")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Time-series explorer")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Dataset Section =====
        ui.label(RichText::new("📁 Dataset").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| match view {
                Some(view) => {
                    let data = view.data();
                    ui.label(format!("Points: {}", data.len()));
                    if let (Some(oldest), Some(newest)) = (data.get(0), data.most_recent()) {
                        ui.label(format!("From: {}", oldest.datetime));
                        ui.label(format!("To:   {}", newest.datetime));
                    }
                }
                None => {
                    ui.label(RichText::new("No chart mounted").color(Color32::GRAY));
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== View Section =====
        ui.label(RichText::new("🔍 View").size(14.0).strong());
        ui.add_space(5.0);

        if let Some(view) = view {
            let t = view.transform();
            egui::Grid::new("view_state")
                .num_columns(2)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    ui.label("Zoom:");
                    ui.label(format!("{:.0}x", t.k));
                    ui.end_row();

                    ui.label("Offset:");
                    ui.label(format!("{:.1}px", t.x));
                    ui.end_row();

                    if let Some((first, last)) = view.visible_window() {
                        ui.label("Showing:");
                        ui.label(format!("{} → {}", first.time_of_day(), last.time_of_day()));
                        ui.end_row();
                    }

                    ui.label("Hover:");
                    let hover = match view.state().hovered {
                        Some(HoverTarget::Bar(i)) => view
                            .data()
                            .get(i)
                            .map(|p| p.datetime.clone())
                            .unwrap_or_default(),
                        Some(HoverTarget::Overview) => "overview".to_string(),
                        None => "-".to_string(),
                    };
                    ui.label(hover);
                    ui.end_row();
                });
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            let regenerate = egui::Button::new(RichText::new("🔄 Regenerate").size(16.0))
                .min_size(egui::vec2(200.0, 35.0));
            if ui.add(regenerate).clicked() {
                action = ControlPanelAction::Regenerate;
            }

            ui.add_space(8.0);

            ui.add_enabled_ui(view.is_some(), |ui| {
                let reset = egui::Button::new(RichText::new("⟲ Reset view").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(reset).clicked() {
                    action = ControlPanelAction::ResetView;
                }

                ui.add_space(8.0);

                let export = egui::Button::new(RichText::new("💾 Export SVG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(export).clicked() {
                    action = ControlPanelAction::ExportSvg;
                }
            });

            ui.checkbox(&mut self.open_after_export, "Open after export");
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        ui.label(RichText::new("📋 Status").size(14.0).strong());
        ui.add_space(5.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    Regenerate,
    ResetView,
    ExportSvg,
}
