//! Portfolio page: hero, about, education, skills, projects and footer

use chrono::Datelike;
use eframe::egui::{self, RichText};
use egui_commonmark::{CommonMarkCache, CommonMarkViewer};
use serde_json::{json, Value};

use super::editable::{draft_text_edit, write, EditableField, EditableImage, EditableSkill};
use super::images::ImageCache;
use super::ACCENT;
use crate::app::PortfolioApp;
use crate::core::session::Session;

/// Social networks a link can point to, as (stored type, label)
const SOCIAL_KINDS: &[(&str, &str)] = &[
    ("github", "GitHub"),
    ("linkedin", "LinkedIn"),
    ("twitter", "Twitter"),
    ("instagram", "Instagram"),
    ("facebook", "Facebook"),
    ("youtube", "YouTube"),
    ("dribbble", "Dribbble"),
    ("figma", "Figma"),
    ("website", "Website"),
];

fn social_label(kind: &str) -> &'static str {
    SOCIAL_KINDS
        .iter()
        .find(|(value, _)| *value == kind)
        .map(|(_, label)| *label)
        .unwrap_or("Website")
}

fn section_heading(ui: &mut egui::Ui, title: &str) {
    ui.add_space(24.0);
    ui.label(RichText::new(title).size(26.0).strong());
    ui.add_space(8.0);
}

/// Remove the entry a section flagged for removal during its loop
fn remove_flagged(session: &mut Session, key: &str, flagged: Option<usize>) {
    if let Some(index) = flagged {
        if let Some(document) = session.edit_document() {
            document.remove_entry(key, index);
        }
    }
}

/// The whole portfolio page
pub struct PortfolioPanel;

impl PortfolioPanel {
    /// Show the portfolio page
    pub fn show(ui: &mut egui::Ui, app: &mut PortfolioApp) {
        let PortfolioApp {
            session,
            images,
            commonmark_cache,
            ..
        } = app;

        egui::ScrollArea::vertical()
            .id_salt("portfolio_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::show_hero(ui, session, images);
                ui.separator();
                Self::show_about(ui, session, commonmark_cache);
                ui.separator();
                Self::show_education(ui, session);
                ui.separator();
                Self::show_skills(ui, session);
                ui.separator();
                Self::show_projects(ui, session, images);
                ui.separator();
                Self::show_footer(ui, session);
            });
    }

    fn show_hero(ui: &mut egui::Ui, session: &mut Session, images: &mut ImageCache) {
        ui.add_space(24.0);
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Hi, I'm").size(32.0).strong());
                    EditableField::new("name", "Your Name")
                        .size(32.0)
                        .strong()
                        .color(ACCENT)
                        .show(ui, session);
                });
                EditableField::new("title", "Frontend Developer & UI/UX Designer")
                    .size(20.0)
                    .weak()
                    .show(ui, session);
                ui.add_space(12.0);
                Self::show_social_links(ui, session);
            });
            ui.add_space(32.0);
            EditableImage::new("profileImage")
                .size(egui::vec2(220.0, 220.0))
                .show(ui, session, images);
        });
    }

    fn show_social_links(ui: &mut egui::Ui, session: &mut Session) {
        let count = session.document().entries("socialLinks").len();

        if !session.accepts_edits() {
            ui.horizontal_wrapped(|ui| {
                for index in 0..count {
                    let kind = session
                        .document()
                        .str_or(&format!("socialLinks[{index}].type"), "website");
                    let url = session
                        .document()
                        .str_or(&format!("socialLinks[{index}].url"), "");
                    if !url.is_empty() {
                        ui.hyperlink_to(social_label(&kind), url);
                    }
                }
            });
            return;
        }

        let mut flagged = None;
        for index in 0..count {
            let type_path = format!("socialLinks[{index}].type");
            let url_path = format!("socialLinks[{index}].url");
            let kind = session.document().str_or(&type_path, "website");

            ui.push_id(("social", index), |ui| {
                ui.horizontal(|ui| {
                    egui::ComboBox::from_id_salt("kind")
                        .selected_text(social_label(&kind))
                        .show_ui(ui, |ui| {
                            for (value, label) in SOCIAL_KINDS {
                                if ui.selectable_label(kind == *value, *label).clicked() {
                                    write(session, &type_path, *value);
                                }
                            }
                        });
                    EditableField::new(&url_path, "")
                        .hint("https://")
                        .show(ui, session);
                    if ui.small_button("✕").on_hover_text("Remove link").clicked() {
                        flagged = Some(index);
                    }
                });
            });
        }
        if ui.button("+ Link").clicked() {
            if let Some(document) = session.edit_document() {
                document.push_entry("socialLinks", json!({ "type": "website", "url": "" }));
            }
        }
        remove_flagged(session, "socialLinks", flagged);
    }

    fn show_about(ui: &mut egui::Ui, session: &mut Session, markdown: &mut CommonMarkCache) {
        section_heading(ui, "About Me");

        let paragraphs: Vec<String> = session
            .document()
            .entries("about")
            .iter()
            .filter_map(|p| p.as_str().map(str::to_string))
            .collect();

        if session.accepts_edits() {
            let mut edited = paragraphs;
            let mut changed = false;
            let mut flagged = None;
            for (index, paragraph) in edited.iter_mut().enumerate() {
                ui.push_id(("about", index), |ui| {
                    ui.horizontal(|ui| {
                        let width = ui.available_width() - 32.0;
                        changed |= ui
                            .add(
                                egui::TextEdit::multiline(paragraph)
                                    .desired_rows(3)
                                    .desired_width(width),
                            )
                            .changed();
                        if ui.small_button("✕").on_hover_text("Remove paragraph").clicked() {
                            flagged = Some(index);
                        }
                    });
                });
            }
            if ui.button("+ Paragraph").clicked() {
                edited.push(String::new());
                changed = true;
            }
            if let Some(index) = flagged {
                edited.remove(index);
                changed = true;
            }
            if changed {
                write(
                    session,
                    "about",
                    Value::Array(edited.into_iter().map(Value::String).collect()),
                );
            }
        } else {
            for (index, paragraph) in paragraphs.iter().enumerate() {
                ui.push_id(("about", index), |ui| {
                    CommonMarkViewer::new().show(ui, markdown, paragraph);
                });
                ui.add_space(6.0);
            }
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new("Location:").strong());
            EditableField::new("location", "New York, USA").show(ui, session);
        });
        ui.horizontal(|ui| {
            ui.label(RichText::new("Email:").strong());
            EditableField::new("email", "hello@yourname.com").show(ui, session);
        });
    }

    fn show_education(ui: &mut egui::Ui, session: &mut Session) {
        section_heading(ui, "Education & Certifications");

        let count = session.document().entries("education").len();
        let mut flagged = None;

        for (kind, title) in [("education", "Education"), ("certification", "Certifications")] {
            ui.label(RichText::new(title).size(18.0).strong().color(ACCENT));
            for index in 0..count {
                let base = format!("education[{index}]");
                if session.document().str_or(&format!("{base}.type"), "education") != kind {
                    continue;
                }

                ui.push_id(("education", index), |ui| {
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        EditableField::new(&format!("{base}.institution"), "Institution")
                            .size(16.0)
                            .strong()
                            .show(ui, session);
                        EditableField::new(&format!("{base}.dates"), "Dates")
                            .weak()
                            .show(ui, session);
                        EditableField::new(&format!("{base}.qualification"), "Qualification")
                            .show(ui, session);

                        let link_path = format!("{base}.link");
                        if session.accepts_edits() {
                            EditableField::new(&link_path, "")
                                .hint("Certificate link (optional)")
                                .show(ui, session);
                            ui.horizontal(|ui| {
                                let other = if kind == "education" {
                                    "certification"
                                } else {
                                    "education"
                                };
                                if ui.small_button(format!("Move to {other}")).clicked() {
                                    write(session, &format!("{base}.type"), other);
                                }
                                if ui.small_button("Remove").clicked() {
                                    flagged = Some(index);
                                }
                            });
                        } else {
                            let link = session.document().str_or(&link_path, "");
                            if !link.is_empty() {
                                ui.hyperlink_to("View certificate", link);
                            }
                        }
                    });
                });
                ui.add_space(4.0);
            }

            if session.accepts_edits() && ui.button(format!("+ Add {kind}")).clicked() {
                if let Some(document) = session.edit_document() {
                    document.push_entry(
                        "education",
                        json!({
                            "institution": "",
                            "dates": "",
                            "qualification": "",
                            "link": "",
                            "type": kind,
                        }),
                    );
                }
            }
            ui.add_space(12.0);
        }

        remove_flagged(session, "education", flagged);
    }

    fn show_skills(ui: &mut egui::Ui, session: &mut Session) {
        section_heading(ui, "Skills");

        let count = session.document().entries("skills").len();
        let mut flagged = None;
        for index in 0..count {
            ui.push_id(("skill", index), |ui| {
                if EditableSkill::show(ui, session, index) {
                    flagged = Some(index);
                }
            });
            ui.add_space(6.0);
        }

        if session.accepts_edits() && ui.button("+ Skill").clicked() {
            if let Some(document) = session.edit_document() {
                document.push_entry("skills", json!({ "name": "New skill", "level": 50 }));
            }
        }
        remove_flagged(session, "skills", flagged);
    }

    fn show_projects(ui: &mut egui::Ui, session: &mut Session, images: &mut ImageCache) {
        section_heading(ui, "Projects");

        let count = session.document().entries("projects").len();
        let mut flagged = None;
        for index in 0..count {
            let base = format!("projects[{index}]");
            ui.push_id(("project", index), |ui| {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        EditableImage::new(&format!("{base}.image"))
                            .size(egui::vec2(180.0, 120.0))
                            .show(ui, session, images);
                        ui.vertical(|ui| {
                            EditableField::new(&format!("{base}.title"), "Project title")
                                .size(18.0)
                                .strong()
                                .show(ui, session);
                            EditableField::new(&format!("{base}.description"), "")
                                .multiline()
                                .hint("What did you build?")
                                .show(ui, session);
                            Self::show_tags(ui, session, &format!("{base}.tags"));

                            let link_path = format!("{base}.link");
                            if session.accepts_edits() {
                                EditableField::new(&link_path, "")
                                    .hint("Project link")
                                    .show(ui, session);
                                if ui.small_button("Remove project").clicked() {
                                    flagged = Some(index);
                                }
                            } else {
                                let link = session.document().str_or(&link_path, "");
                                if !link.is_empty() {
                                    ui.hyperlink_to("View project", link);
                                }
                            }
                        });
                    });
                });
            });
            ui.add_space(8.0);
        }

        if session.accepts_edits() && ui.button("+ Project").clicked() {
            if let Some(document) = session.edit_document() {
                document.push_entry(
                    "projects",
                    json!({ "title": "", "description": "", "image": "", "tags": [], "link": "" }),
                );
            }
        }
        remove_flagged(session, "projects", flagged);
    }

    fn show_tags(ui: &mut egui::Ui, session: &mut Session, path: &str) {
        let tags: Vec<String> = match session.document().get(path) {
            Ok(Some(Value::Array(items))) => items
                .iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };

        if session.accepts_edits() {
            let id = ui.make_persistent_id(path);
            if let Some(text) = draft_text_edit(ui, id, tags.join(", "), "Tags, comma separated") {
                let parsed: Vec<Value> = text
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(|t| Value::String(t.to_string()))
                    .collect();
                write(session, path, Value::Array(parsed));
            }
            return;
        }

        ui.horizontal_wrapped(|ui| {
            for tag in &tags {
                egui::Frame::new()
                    .fill(ui.visuals().faint_bg_color)
                    .corner_radius(egui::CornerRadius::same(4))
                    .inner_margin(egui::Margin::symmetric(6, 2))
                    .show(ui, |ui| {
                        ui.label(RichText::new(tag).small());
                    });
            }
        });
    }

    fn show_footer(ui: &mut egui::Ui, session: &mut Session) {
        ui.add_space(16.0);
        ui.vertical_centered(|ui| {
            let year = chrono::Local::now().year();
            let name = session.document().str_or("name", "Your Name");
            ui.label(
                RichText::new(format!("© {year} {name}. All rights reserved."))
                    .small()
                    .weak(),
            );
        });
        ui.add_space(16.0);
    }
}
