//! Portfolio images: data URL encoding and egui image sources

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::path::Path;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use eframe::egui;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg"];

/// Read an image file into a `data:` URL suitable for storing in the document
pub fn image_data_url(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image: {}", path.display()))?;
    let mime = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .map(|ext| match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "svg" => "image/svg+xml",
            _ => "image/png",
        })
        .unwrap_or("image/png");
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

/// Decode the payload of a base64 `data:` URL
pub fn decode_data_url(url: &str) -> Option<Vec<u8>> {
    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    if !header.ends_with(";base64") {
        return None;
    }
    STANDARD.decode(payload.trim()).ok()
}

/// Ask the user for an image file
pub fn pick_image() -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()
}

/// Turns stored image values into egui image URIs
#[derive(Default)]
pub struct ImageCache {
    registered: HashSet<String>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// URI egui can load for `value`, or `None` for placeholders
    pub fn source(&mut self, ctx: &egui::Context, value: &str) -> Option<String> {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            return Some(value.to_string());
        }
        if value.starts_with("data:") {
            let mut hasher = DefaultHasher::new();
            value.hash(&mut hasher);
            let uri = format!("bytes://portfolio/{:016x}", hasher.finish());
            if !self.registered.contains(&uri) {
                let bytes = decode_data_url(value)?;
                ctx.include_bytes(uri.clone(), bytes);
                self.registered.insert(uri.clone());
            }
            return Some(uri);
        }
        let path = Path::new(value);
        if path.is_absolute() && path.exists() {
            return Some(format!("file://{}", path.display()));
        }
        None
    }

    /// Show the image stored in `value`, or a placeholder frame
    pub fn show(&mut self, ui: &mut egui::Ui, value: &str, size: egui::Vec2) {
        match self.source(ui.ctx(), value) {
            Some(uri) => {
                ui.add(
                    egui::Image::new(uri)
                        .fit_to_exact_size(size)
                        .corner_radius(egui::CornerRadius::same(8)),
                );
            }
            None => {
                let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
                ui.painter()
                    .rect_filled(rect, egui::CornerRadius::same(8), ui.visuals().faint_bg_color);
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "\u{1F5BC}",
                    egui::FontId::proportional(size.y.min(48.0) / 2.0),
                    ui.visuals().weak_text_color(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.JPG");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();

        let url = image_data_url(&path).unwrap();
        assert_eq!(url, "data:image/jpeg;base64,/9j/");
        assert_eq!(decode_data_url(&url).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_decode_rejects_non_base64_urls() {
        assert_eq!(decode_data_url("data:text/plain,hello"), None);
        assert_eq!(decode_data_url("https://example.com/a.png"), None);
        assert_eq!(decode_data_url("data:image/png;base64"), None);
    }
}
