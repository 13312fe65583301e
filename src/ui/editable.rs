//! Widgets that show a document field and, in edit mode, write it back by path

use eframe::egui::{self, Color32, RichText};
use serde_json::Value;

use super::images::{image_data_url, pick_image, ImageCache};
use crate::core::session::Session;

/// Write through the session, logging paths that cannot be written
pub fn write(session: &mut Session, path: &str, value: impl Into<Value>) {
    if let Err(e) = session.set(path, value) {
        tracing::warn!("Ignoring edit of {}: {}", path, e);
    }
}

/// A text field bound to a document path
pub struct EditableField<'a> {
    path: &'a str,
    default: &'a str,
    hint: &'a str,
    multiline: bool,
    size: Option<f32>,
    strong: bool,
    weak: bool,
    color: Option<Color32>,
}

impl<'a> EditableField<'a> {
    pub fn new(path: &'a str, default: &'a str) -> Self {
        Self {
            path,
            default,
            hint: "Edit this field",
            multiline: false,
            size: None,
            strong: false,
            weak: false,
            color: None,
        }
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    pub fn hint(mut self, hint: &'a str) -> Self {
        self.hint = hint;
        self
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn strong(mut self) -> Self {
        self.strong = true;
        self
    }

    pub fn weak(mut self) -> Self {
        self.weak = true;
        self
    }

    pub fn color(mut self, color: Color32) -> Self {
        self.color = Some(color);
        self
    }

    fn rich(&self, text: String) -> RichText {
        let mut rich = RichText::new(text);
        if let Some(size) = self.size {
            rich = rich.size(size);
        }
        if self.strong {
            rich = rich.strong();
        }
        if self.weak {
            rich = rich.weak();
        }
        if let Some(color) = self.color {
            rich = rich.color(color);
        }
        rich
    }

    pub fn show(self, ui: &mut egui::Ui, session: &mut Session) -> egui::Response {
        let mut text = session.document().str_or(self.path, self.default);
        if !session.accepts_edits() {
            return ui.label(self.rich(text));
        }

        let edit = if self.multiline {
            egui::TextEdit::multiline(&mut text)
                .desired_rows(3)
                .desired_width(f32::INFINITY)
        } else {
            egui::TextEdit::singleline(&mut text)
        };
        let mut edit = edit.hint_text(self.hint);
        if let Some(size) = self.size {
            edit = edit.font(egui::FontId::proportional(size));
        }

        let response = ui.add(edit);
        if response.changed() {
            write(session, self.path, text);
        }
        response
    }
}

/// Text box whose content is committed only when it loses focus
///
/// Used for values that are parsed on commit (comma separated lists), where
/// re-rendering the parsed value on every keystroke would eat separators.
pub fn draft_text_edit(
    ui: &mut egui::Ui,
    id: egui::Id,
    current: String,
    hint: &str,
) -> Option<String> {
    let mut draft = ui.data_mut(|d| d.get_temp::<String>(id)).unwrap_or(current);
    let response = ui.add(egui::TextEdit::singleline(&mut draft).id(id).hint_text(hint));

    if response.lost_focus() {
        ui.data_mut(|d| d.remove::<String>(id));
        return Some(draft);
    }
    if response.has_focus() {
        ui.data_mut(|d| d.insert_temp(id, draft));
    }
    None
}

/// An image bound to a document path
pub struct EditableImage<'a> {
    path: &'a str,
    size: egui::Vec2,
}

impl<'a> EditableImage<'a> {
    pub fn new(path: &'a str) -> Self {
        Self {
            path,
            size: egui::vec2(160.0, 160.0),
        }
    }

    pub fn size(mut self, size: egui::Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn show(self, ui: &mut egui::Ui, session: &mut Session, images: &mut ImageCache) {
        let value = session.document().str_or(self.path, "");
        ui.vertical(|ui| {
            images.show(ui, &value, self.size);
            if !session.accepts_edits() {
                return;
            }
            ui.horizontal(|ui| {
                if ui.small_button("Change image…").clicked() {
                    if let Some(file) = pick_image() {
                        match image_data_url(&file) {
                            Ok(url) => write(session, self.path, url),
                            Err(e) => tracing::error!("Failed to load image: {:#}", e),
                        }
                    }
                }
                if !value.is_empty() && ui.small_button("Remove").clicked() {
                    write(session, self.path, "");
                }
            });
        });
    }
}

/// One skill entry: name and a 0..=100 level
pub struct EditableSkill;

impl EditableSkill {
    /// Show `skills[index]`; returns true when removal was requested
    pub fn show(ui: &mut egui::Ui, session: &mut Session, index: usize) -> bool {
        let name_path = format!("skills[{index}].name");
        let level_path = format!("skills[{index}].level");
        let name = session.document().str_or(&name_path, "Skill");
        let level = session.document().int_or(&level_path, 0).clamp(0, 100);

        if !session.accepts_edits() {
            ui.horizontal(|ui| {
                ui.label(RichText::new(&name).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(RichText::new(format!("{level}%")).color(super::ACCENT));
                });
            });
            ui.add(egui::ProgressBar::new(level as f32 / 100.0).desired_height(6.0));
            return false;
        }

        let mut removed = false;
        ui.horizontal(|ui| {
            let mut name_text = name;
            if ui
                .add(egui::TextEdit::singleline(&mut name_text).hint_text("Skill name"))
                .changed()
            {
                write(session, &name_path, name_text);
            }

            let mut level_value = level;
            if ui
                .add(egui::Slider::new(&mut level_value, 0..=100).suffix("%"))
                .changed()
            {
                write(session, &level_path, level_value);
            }

            if ui.small_button("✕").on_hover_text("Remove skill").clicked() {
                removed = true;
            }
        });
        removed
    }
}
