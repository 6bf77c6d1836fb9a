//! Timebar Main Application
//! Main window with control panel and chart canvas. Owns the mounted chart
//! and drives its mount/unmount lifecycle.

use crate::charts::ChartView;
use crate::config::ChartConfig;
use crate::gui::{ChartCanvas, ControlPanel, ControlPanelAction};
use crate::scene::export_svg;
use egui::SidePanel;
use tracing::{error, info, warn};

/// Main application window.
pub struct TimebarApp {
    config: ChartConfig,
    view: Option<ChartView>,
    control_panel: ControlPanel,
    canvas: ChartCanvas,
}

impl TimebarApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: ChartConfig) -> Self {
        let mut app = Self {
            config,
            view: None,
            control_panel: ControlPanel::new(),
            canvas: ChartCanvas::new(),
        };
        app.mount();
        app
    }

    /// Unmount the current chart, if any, and mount a fresh one.
    fn mount(&mut self) {
        if let Some(view) = self.view.take() {
            view.unmount();
        }
        self.canvas.reset();

        let now = chrono::Local::now().naive_local();
        match ChartView::mount(self.config.clone(), now, &mut rand::thread_rng()) {
            Ok(view) => {
                self.control_panel
                    .set_status(format!("Generated {} points", view.data().len()));
                self.view = Some(view);
            }
            Err(e) => {
                error!(error = %e, "failed to mount chart");
                self.control_panel.set_status(format!("Error: {e}"));
            }
        }
    }

    fn handle_reset_view(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.reset_view();
            self.control_panel.set_status("View reset");
        }
    }

    /// Handle SVG export - render the current scene and write it out
    fn handle_export_svg(&mut self) {
        let Some(view) = self.view.as_ref() else {
            self.control_panel.set_status("Nothing to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("SVG Image", &["svg"])
            .set_file_name("timebar.svg")
            .save_file()
        else {
            return; // User cancelled
        };

        let background = view.config().color(&view.config().palette.background);
        match export_svg(view.scene(), background, &path) {
            Ok(()) => {
                self.control_panel
                    .set_status(format!("Exported {}", path.display()));
                if self.control_panel.open_after_export {
                    if let Err(e) = open::that(&path) {
                        warn!(error = %e, path = %path.display(), "could not open exported file");
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "SVG export failed");
                self.control_panel.set_status(format!("Error: {e}"));
            }
        }
    }
}

impl eframe::App for TimebarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui, self.view.as_ref()) {
                        ControlPanelAction::Regenerate => {
                            info!("regenerating dataset");
                            self.mount();
                        }
                        ControlPanelAction::ResetView => self.handle_reset_view(),
                        ControlPanelAction::ExportSvg => self.handle_export_svg(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Canvas
        egui::CentralPanel::default().show(ctx, |ui| match self.view.as_mut() {
            Some(view) => self.canvas.show(ui, view),
            None => {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new("No Chart").size(20.0));
                });
            }
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(view) = self.view.take() {
            view.unmount();
        }
    }
}
