//! Dialog for opening a shared portfolio by snapshot id

use eframe::egui;

use crate::sync::is_valid_snapshot_id;

/// Dialog asking for the id (or link) of a shared snapshot
#[derive(Default)]
pub struct SnapshotDialog {
    pub visible: bool,
    pub input: String,
}

impl SnapshotDialog {
    pub fn open(&mut self, last_snapshot: Option<&str>) {
        self.visible = true;
        if self.input.is_empty() {
            self.input = last_snapshot.unwrap_or_default().to_string();
        }
    }

    /// Show the dialog; returns the snapshot id the user asked to open
    pub fn show(&mut self, ctx: &egui::Context) -> Option<String> {
        let mut result = None;

        if self.visible {
            egui::Window::new("Open Shared Portfolio")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Snapshot id or share link:");
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.input)
                            .hint_text("portfolio")
                            .desired_width(320.0),
                    );
                    let submitted =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                    let id = snapshot_id_from_input(&self.input);
                    if !self.input.trim().is_empty() && id.is_none() {
                        ui.colored_label(ui.visuals().error_fg_color, "Not a valid snapshot id");
                    }

                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            self.visible = false;
                        }
                        let open = ui.add_enabled(id.is_some(), egui::Button::new("Open"));
                        if open.clicked() || (submitted && id.is_some()) {
                            result = id.clone();
                            self.visible = false;
                        }
                    });
                });
        }

        result
    }
}

/// Accept either a bare id or a share link ending in `/view/<id>`
pub fn snapshot_id_from_input(input: &str) -> Option<String> {
    let trimmed = input.trim().trim_end_matches('/');
    let candidate = match trimmed.rsplit_once("/view/") {
        Some((_, id)) => id,
        None => trimmed,
    };
    is_valid_snapshot_id(candidate).then(|| candidate.to_string())
}
