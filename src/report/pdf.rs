//! PDF output for a laid-out `Document`.
//!
//! Converts the top-left millimetre coordinates of the page model into
//! PDF user space (origin bottom-left) and draws through `printpdf`.

use super::text::{is_win_ansi, text_width};
use super::types::{Align, Document, DrawOp, FontStyle, Rgb};
use crate::config::TextConfig;
use crate::error::AppError;
use image::{DynamicImage, GenericImageView};
use log::{debug, warn};
use printpdf::{
    Actions, BorderArray, BuiltinFont, Color, ColorArray, HighlightingMode, Image, ImageTransform, IndirectFontRef,
    Line, LinkAnnotation, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Point, Rect,
};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

const LAYER: &str = "Layer 1";
/// Resolution images are embedded at before scaling to their box
const IMAGE_DPI: f32 = 300.0;
const RULE_THICKNESS: f32 = 0.5;

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::Pdf(e.to_string())
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    /// Builtin Helvetica faces unless TTF files are configured
    fn load(doc: &PdfDocumentReference, text: &TextConfig) -> Result<Self, AppError> {
        let face = |style: FontStyle, builtin: BuiltinFont| -> Result<IndirectFontRef, AppError> {
            match font_path(text, style) {
                Some(path) => {
                    debug!("embedding font {:?}", path);
                    doc.add_external_font(File::open(path)?).map_err(pdf_error)
                }
                None => doc.add_builtin_font(builtin).map_err(pdf_error),
            }
        };
        Ok(Fonts {
            regular: face(FontStyle::Normal, BuiltinFont::Helvetica)?,
            bold: face(FontStyle::Bold, BuiltinFont::HelveticaBold)?,
            italic: face(FontStyle::Italic, BuiltinFont::HelveticaOblique)?,
        })
    }

    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Normal => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

/// Configured TTF file for `style`, if any
fn font_path(text: &TextConfig, style: FontStyle) -> Option<&PathBuf> {
    match style {
        FontStyle::Normal => text.font_regular.as_ref(),
        FontStyle::Bold => text.font_bold.as_ref(),
        FontStyle::Italic => text.font_italic.as_ref(),
    }
}

/// Characters the builtin fonts will drop, in order of first appearance.
/// Text drawn with an embedded TTF face is not checked.
fn unencodable_chars(doc: &Document, text: &TextConfig) -> Vec<char> {
    let mut found: Vec<char> = Vec::new();
    for page in &doc.pages {
        for op in &page.ops {
            let DrawOp::Text { text: line, style, .. } = op else { continue };
            if font_path(text, *style).is_some() {
                continue;
            }
            for c in line.chars().filter(|c| !is_win_ansi(*c)) {
                if !found.contains(&c) {
                    found.push(c);
                }
            }
        }
    }
    found
}

fn color(rgb: Rgb) -> Color {
    let (r, g, b) = rgb.unit();
    Color::Rgb(printpdf::Rgb::new(r, g, b, None))
}

fn draw_image(layer: &PdfLayerReference, img: &DynamicImage, x: f32, bottom: f32, width: f32, height: f32) {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let natural_w = rgb.width().max(1) as f32 / IMAGE_DPI * 25.4;
    let natural_h = rgb.height().max(1) as f32 / IMAGE_DPI * 25.4;

    Image::from_dynamic_image(&rgb).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(bottom)),
            scale_x: Some(width / natural_w),
            scale_y: Some(height / natural_h),
            dpi: Some(IMAGE_DPI),
            ..Default::default()
        },
    );
}

fn draw_op(layer: &PdfLayerReference, op: &DrawOp, doc: &Document, fonts: &Fonts) {
    let h = doc.height;
    match op {
        DrawOp::Text { x, y, text, size, style, color: c, align } => {
            let left = match align {
                Align::Left => *x,
                Align::Right => x - text_width(text, *size, *style),
            };
            layer.set_fill_color(color(*c));
            layer.use_text(text.as_str(), *size, Mm(left), Mm(h - y), fonts.get(*style));
        }
        DrawOp::Image { x, y, width, height, image } => {
            if let Some(img) = doc.images.get(*image) {
                draw_image(layer, img, *x, h - y - height, *width, *height);
            }
        }
        DrawOp::Link { x, y, width, height, url } => {
            let rect = Rect::new(Mm(*x), Mm(h - y - height), Mm(x + width), Mm(h - y));
            layer.add_link_annotation(LinkAnnotation::new(
                rect,
                Some(BorderArray::Solid([0.0, 0.0, 0.0])),
                Some(ColorArray::Transparent),
                Actions::uri(url.clone()),
                Some(HighlightingMode::Invert),
            ));
        }
        DrawOp::Rule { x1, x2, y, color: c } => {
            layer.set_outline_color(color(*c));
            layer.set_outline_thickness(RULE_THICKNESS);
            layer.add_line(Line {
                points: vec![(Point::new(Mm(*x1), Mm(h - y)), false), (Point::new(Mm(*x2), Mm(h - y)), false)],
                is_closed: false,
            });
        }
    }
}

/// Render `doc` into PDF bytes
pub fn render_pdf(doc: &Document, text: &TextConfig) -> Result<Vec<u8>, AppError> {
    let (pdf, first_page, first_layer) = PdfDocument::new(doc.title.as_str(), Mm(doc.width), Mm(doc.height), LAYER);
    let fonts = Fonts::load(&pdf, text)?;

    let dropped = unencodable_chars(doc, text);
    if !dropped.is_empty() {
        let sample: String = dropped.iter().take(10).collect();
        warn!(
            "{} character(s) cannot be encoded by the builtin PDF fonts and will be missing: {:?}. \
             Set text.font_regular/font_bold/font_italic to TTF files that cover them.",
            dropped.len(),
            sample
        );
    }

    for (i, page) in doc.pages.iter().enumerate() {
        let (page_index, layer_index) =
            if i == 0 { (first_page, first_layer) } else { pdf.add_page(Mm(doc.width), Mm(doc.height), LAYER) };
        let layer = pdf.get_page(page_index).get_layer(layer_index);
        for op in &page.ops {
            draw_op(&layer, op, doc, &fonts);
        }
    }

    debug!("rendered {} pages with {} images", doc.pages.len(), doc.images.len());
    pdf.save_to_bytes().map_err(pdf_error)
}

/// Render `doc` and write it to `path`
pub fn write_pdf(doc: &Document, text: &TextConfig, path: &Path) -> Result<(), AppError> {
    let bytes = render_pdf(doc, text)?;
    fs::write(path, bytes)?;
    Ok(())
}
