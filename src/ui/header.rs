//! Header bar with the portfolio logo

use eframe::egui::{self, RichText};

use super::editable::{write, EditableField, EditableImage};
use super::ACCENT;
use crate::app::PortfolioApp;
use crate::core::session::SessionSource;

/// Top bar: logo on the left, share information on the right
pub struct HeaderPanel;

impl HeaderPanel {
    pub fn show(ui: &mut egui::Ui, app: &mut PortfolioApp) {
        let PortfolioApp {
            session, images, ..
        } = app;

        ui.horizontal(|ui| {
            let logo_type = session.document().str_or("logo.type", "text");
            if logo_type == "image" {
                EditableImage::new("logo.image")
                    .size(egui::vec2(40.0, 40.0))
                    .show(ui, session, images);
            } else {
                let first_name = session.document().first_name();
                EditableField::new("logo.text", &first_name)
                    .size(22.0)
                    .strong()
                    .color(ACCENT)
                    .show(ui, session);
            }

            if session.accepts_edits() {
                egui::ComboBox::from_id_salt("logo_type")
                    .selected_text(if logo_type == "image" { "Image logo" } else { "Text logo" })
                    .show_ui(ui, |ui| {
                        if ui.selectable_label(logo_type == "text", "Text logo").clicked() {
                            write(session, "logo.type", "text");
                        }
                        if ui.selectable_label(logo_type == "image", "Image logo").clicked() {
                            write(session, "logo.type", "image");
                        }
                    });
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let shared_on = session
                    .document()
                    .share_date()
                    .map(|date| date.format("%B %-d, %Y").to_string());

                if session.is_editing() {
                    ui.label(RichText::new("Editing").color(ACCENT).strong());
                } else if let (true, Some(date)) = (session.document().is_shared(), shared_on) {
                    ui.label(RichText::new(format!("Shared on: {date}")).small());
                } else if let SessionSource::Shared { snapshot_id } = session.source() {
                    ui.label(RichText::new(format!("Shared portfolio: {snapshot_id}")).small());
                }
            });
        });
    }
}
