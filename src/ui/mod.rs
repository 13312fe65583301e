//! UI components for Folio

pub mod actions;
pub mod editable;
pub mod header;
pub mod images;
pub mod sections;
pub mod snapshot_dialog;

use eframe::egui::Color32;

/// Accent color for names, headings and skill levels
pub const ACCENT: Color32 = Color32::from_rgb(225, 6, 0);
