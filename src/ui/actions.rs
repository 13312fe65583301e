//! Bottom bar: status line and the edit / save / share actions

use eframe::egui::{self, RichText};

use crate::app::{PortfolioApp, StatusKind};

pub struct ActionBar;

impl ActionBar {
    pub fn show(ui: &mut egui::Ui, app: &mut PortfolioApp) {
        let ctx = ui.ctx().clone();

        ui.horizontal(|ui| {
            Self::show_status(ui, app);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let busy = app.busy_label();
                if let Some(label) = busy {
                    ui.spinner();
                    ui.label(label);
                    return;
                }

                if app.session.is_read_only() {
                    if ui.button("Back to my portfolio").clicked() {
                        app.return_home();
                    }
                    if ui.button("Open shared…").clicked() {
                        app.snapshot_dialog.open(app.config.ui.last_snapshot.as_deref());
                    }
                    return;
                }

                if app.session.is_editing() {
                    let save_label = if app.session.is_modified() {
                        "✔ Save*"
                    } else {
                        "✔ Save"
                    };
                    if ui
                        .button(RichText::new(save_label).strong())
                        .on_hover_text("Save and push to the repository (Ctrl+S)")
                        .clicked()
                    {
                        app.save(&ctx);
                    }
                    if ui.button("✕ Cancel").on_hover_text("Discard changes (Esc)").clicked() {
                        app.cancel_edit();
                    }
                    return;
                }

                if ui.button("✏ Edit").on_hover_text("Edit portfolio (Ctrl+E)").clicked() {
                    app.begin_edit();
                }
                if ui.button("🔗 Share").on_hover_text("Save and copy a share link").clicked() {
                    app.share(&ctx);
                }
                if ui.button("Open shared…").clicked() {
                    app.snapshot_dialog.open(app.config.ui.last_snapshot.as_deref());
                }
                if let Some(reference) = app.last_share.clone() {
                    let open_link = ui
                        .small_button("Open link")
                        .on_hover_text(reference.url.as_str());
                    if open_link.clicked() {
                        if let Err(e) = open::that(&reference.url) {
                            tracing::error!("Failed to open {}: {}", reference.url, e);
                        }
                    }
                }
            });
        });
    }

    fn show_status(ui: &mut egui::Ui, app: &PortfolioApp) {
        let Some(status) = &app.status else {
            return;
        };
        let color = match status.kind {
            StatusKind::Info => ui.visuals().text_color(),
            StatusKind::Success => egui::Color32::from_rgb(80, 180, 100),
            StatusKind::Error => ui.visuals().error_fg_color,
        };
        ui.label(RichText::new(&status.text).color(color));
    }
}
