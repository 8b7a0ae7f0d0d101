//! Paginated report layout.
//!
//! This module handles:
//! - Projecting each data row into a `ReportRow`
//! - Placing text blocks and images top to bottom with page breaks
//! - Fetching images one at a time and writing an error line for each failure
//! - Stamping `Página X de N` footers once every page exists
//!
//! Coordinates are millimetres from the top-left of the page. Text is
//! positioned by its baseline, images by their top edge.

use super::text::wrap_text;
use super::types::{Align, Document, DrawOp, FontStyle, Page, Rgb};
use crate::columns::ColumnMap;
use crate::config::{ImageSizing, ImagesConfig, PageGeometry, ReportConfig};
use crate::dates::DateNormalizer;
use crate::error::AppError;
use crate::fetch::ImageSource;
use crate::types::{Cell, Grid, cell_at};
use crate::urls::{resolve_image_url, split_photo_urls};
use image::{DynamicImage, GenericImageView};
use log::{debug, info, warn};

pub const TITLE_SIZE: f32 = 18.0;
pub const AUTHOR_SIZE: f32 = 11.0;
pub const BODY_SIZE: f32 = 9.0;
pub const ERROR_SIZE: f32 = 8.0;
pub const FOOTER_SIZE: f32 = 8.0;

/// Gap after the description paragraph and after the images label
const PARAGRAPH_GAP: f32 = 2.0;
/// Vertical band reserved for the separator rule; the rule sits in its middle
const SEPARATOR_GAP: f32 = 10.0;

/// One data row, with placeholders already applied
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub author: String,
    pub sector: String,
    pub timestamp: String,
    pub description: String,
    pub photo_urls: Vec<String>,
}

impl ReportRow {
    pub fn from_cells(row: &[Cell], columns: &ColumnMap, config: &ReportConfig, dates: &DateNormalizer) -> Self {
        let text = &config.text;
        let optional = |col: Option<usize>, placeholder: &str| match col {
            Some(c) => cell_at(row, c).text_or(placeholder),
            None => placeholder.to_string(),
        };

        let timestamp = match columns.timestamp {
            Some(c) => dates.format_cell(cell_at(row, c)),
            None => text.description_placeholder.clone(),
        };
        let photo_urls = match columns.photos {
            Some(c) => split_photo_urls(&cell_at(row, c).display()),
            None => Vec::new(),
        };

        ReportRow {
            author: optional(columns.author, &text.placeholder),
            sector: optional(columns.sector, &text.placeholder),
            timestamp,
            description: optional(columns.description, &text.description_placeholder),
            photo_urls,
        }
    }
}

/// Vertical position on the current page
#[derive(Debug, Clone, Copy)]
pub struct LayoutCursor {
    pub y: f32,
    geometry: PageGeometry,
}

impl LayoutCursor {
    pub fn new(geometry: PageGeometry) -> Self {
        Self { y: geometry.top_offset, geometry }
    }

    /// Space left above the content bottom
    pub fn remaining(&self) -> f32 {
        self.geometry.content_bottom() - self.y
    }

    pub fn fits(&self, height: f32) -> bool {
        self.y + height <= self.geometry.content_bottom()
    }

    /// True right after a page break, before anything was placed
    pub fn at_page_top(&self) -> bool {
        self.y <= self.geometry.margin
    }

    pub fn reset(&mut self) {
        self.y = self.geometry.margin;
    }

    pub fn advance(&mut self, dy: f32) {
        self.y += dy;
    }
}

/// Display size for an image before it is fitted to the page
pub fn desired_image_size(images: &ImagesConfig, source_w: u32, source_h: u32, printable_width: f32) -> (f32, f32) {
    let (mut w, mut h) = match images.sizing {
        ImageSizing::Fixed => (images.fixed_width, images.fixed_height),
        ImageSizing::Proportional => {
            let (sw, sh) = (source_w.max(1) as f32, source_h.max(1) as f32);
            let scale = (images.max_width / sw).min(images.max_height / sh);
            (sw * scale, sh * scale)
        }
    };
    if w > printable_width {
        h *= printable_width / w;
        w = printable_width;
    }
    (w, h)
}

/// Height `h` and the width that keeps the source aspect, capped at the printable width
fn scale_to_height(h: f32, aspect: f32, printable_width: f32) -> (f32, f32) {
    let w = h * aspect;
    if w > printable_width { (printable_width, printable_width / aspect) } else { (w, h) }
}

struct LayoutEngine<'a, S: ImageSource + ?Sized> {
    config: &'a ReportConfig,
    source: &'a mut S,
    geometry: PageGeometry,
    cursor: LayoutCursor,
    pages: Vec<Page>,
    images: Vec<DynamicImage>,
    failed_images: usize,
}

impl<'a, S: ImageSource + ?Sized> LayoutEngine<'a, S> {
    fn new(config: &'a ReportConfig, source: &'a mut S) -> Self {
        Self {
            config,
            source,
            geometry: config.page,
            cursor: LayoutCursor::new(config.page),
            pages: vec![Page::default()],
            images: Vec::new(),
            failed_images: 0,
        }
    }

    fn lh(&self) -> f32 {
        self.geometry.line_height
    }

    fn page(&mut self) -> &mut Page {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor.reset();
        debug!("page break: now on page {}", self.pages.len());
    }

    /// Start a new page unless `height` fits below the cursor
    fn ensure_space(&mut self, height: f32) {
        if !self.cursor.fits(height) && !self.cursor.at_page_top() {
            self.new_page();
        }
    }

    fn text(&mut self, text: impl Into<String>, size: f32, style: FontStyle, color: Rgb) {
        let op = DrawOp::Text {
            x: self.geometry.margin,
            y: self.cursor.y,
            text: text.into(),
            size,
            style,
            color,
            align: Align::Left,
        };
        self.page().ops.push(op);
    }

    /// Emit `lines` one per line height
    fn lines(&mut self, lines: &[String], size: f32, style: FontStyle, color: Rgb) {
        for line in lines {
            self.text(line.clone(), size, style, color);
            self.cursor.advance(self.lh());
        }
    }

    fn title(&mut self) {
        let title = self.config.text.title.clone();
        self.text(title, TITLE_SIZE, FontStyle::Bold, Rgb::BLACK);
        self.cursor.advance(2.0 * self.lh());
    }

    fn entry(&mut self, row: &ReportRow) {
        let text = &self.config.text;
        let author = format!("{} {}", text.author_label, row.author);
        let sector = format!("{} {}", text.sector_label, row.sector);
        let stamp = format!("{} {}", text.timestamp_label, row.timestamp);
        let description = format!("{} {}", text.description_label, row.description);
        let lh = self.lh();

        self.ensure_space(3.0 * lh);
        self.text(author, AUTHOR_SIZE, FontStyle::Bold, Rgb::BLACK);
        self.cursor.advance(lh);
        self.lines(&[sector, stamp], BODY_SIZE, FontStyle::Bold, Rgb::BLACK);

        self.description(&description);
        self.cursor.advance(PARAGRAPH_GAP);

        if row.photo_urls.is_empty() {
            let line = self.config.text.no_images.clone();
            self.ensure_space(lh);
            self.text(line, BODY_SIZE, FontStyle::Normal, Rgb::BLACK);
            self.cursor.advance(lh);
        } else {
            let label = self.config.text.images_label.clone();
            self.ensure_space(lh);
            self.text(label, BODY_SIZE, FontStyle::Italic, Rgb::BLACK);
            self.cursor.advance(lh + PARAGRAPH_GAP);
            for url in &row.photo_urls {
                self.photo(url);
            }
        }

        self.separator();
    }

    /// Wrapped paragraph; one block when it fits a page, page-sized groups otherwise
    fn description(&mut self, description: &str) {
        let lh = self.lh();
        let lines = wrap_text(description, BODY_SIZE, FontStyle::Normal, self.geometry.printable_width());
        let per_page = ((self.geometry.content_height() / lh).floor() as usize).max(1);

        for group in lines.chunks(per_page) {
            self.ensure_space(group.len() as f32 * lh);
            self.lines(group, BODY_SIZE, FontStyle::Normal, Rgb::BLACK);
        }
    }

    fn photo(&mut self, url: &str) {
        let resolved = resolve_image_url(url, self.config.images.thumbnail_size);
        match self.source.load(&resolved) {
            Ok(img) => self.place_image(img, &resolved),
            Err(e) => {
                warn!("Error loading image from URL {}: {}", resolved, e);
                self.failed_images += 1;
                self.image_error(&resolved);
            }
        }
    }

    fn place_image(&mut self, img: DynamicImage, url: &str) {
        let config = self.config;
        let images = &config.images;
        let printable = self.geometry.printable_width();
        let (src_w, src_h) = img.dimensions();
        let aspect = src_w.max(1) as f32 / src_h.max(1) as f32;
        let (mut w, mut h) = desired_image_size(images, src_w, src_h, printable);

        if !self.cursor.fits(h) {
            let remaining = self.cursor.remaining();
            if remaining >= images.min_height || self.cursor.at_page_top() {
                (w, h) = scale_to_height(remaining, aspect, printable);
            } else {
                self.new_page();
                let full = self.geometry.content_height();
                if h > full {
                    (w, h) = scale_to_height(full, aspect, printable);
                }
            }
        }

        let x = self.geometry.margin + (printable - w) / 2.0;
        let y = self.cursor.y;
        debug!("image {}x{} px placed at ({:.1}, {:.1}) as {:.1}x{:.1} mm", src_w, src_h, x, y, w, h);

        let index = self.images.len();
        self.images.push(img);
        self.page().ops.push(DrawOp::Image { x, y, width: w, height: h, image: index });
        if images.link {
            self.page().ops.push(DrawOp::Link { x, y, width: w, height: h, url: url.to_string() });
        }
        self.cursor.advance(h + images.spacing);
    }

    fn image_error(&mut self, url: &str) {
        let message = format!("{} {}", self.config.text.image_error, url);
        let lines = wrap_text(&message, ERROR_SIZE, FontStyle::Normal, self.geometry.printable_width());
        let spacing = self.config.images.spacing;
        self.ensure_space(lines.len() as f32 * self.lh() + spacing);
        // Each op carries its own color, so the pen is back to black for whatever follows
        self.lines(&lines, ERROR_SIZE, FontStyle::Normal, Rgb::ERROR_RED);
        self.cursor.advance(spacing);
    }

    fn separator(&mut self) {
        self.ensure_space(SEPARATOR_GAP);
        let y = self.cursor.y + SEPARATOR_GAP / 2.0;
        let rule = DrawOp::Rule {
            x1: self.geometry.margin,
            x2: self.geometry.width - self.geometry.margin,
            y,
            color: Rgb::RULE_GRAY,
        };
        self.page().ops.push(rule);
        self.cursor.advance(SEPARATOR_GAP);
    }

    /// Second pass: every page gets its number once the total is known
    fn stamp_footers(&mut self) {
        let total = self.pages.len();
        let x = self.geometry.width - self.geometry.margin;
        let y = self.geometry.height - self.geometry.margin;
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.ops.push(DrawOp::Text {
                x,
                y,
                text: self.config.text.footer_for(i + 1, total),
                size: FOOTER_SIZE,
                style: FontStyle::Normal,
                color: Rgb::BLACK,
                align: Align::Right,
            });
        }
    }
}

/// Lay out every data row of `grid` into pages.
///
/// Fails before creating any page when the grid has no data rows or a
/// required column is missing. Individual image failures are written into
/// the report and counted in `Document::failed_images`.
pub fn layout_report<S: ImageSource + ?Sized>(
    grid: &Grid,
    config: &ReportConfig,
    source: &mut S,
) -> Result<Document, AppError> {
    let header = match grid.header() {
        Some(header) if grid.len() >= 2 => header,
        _ => return Err(AppError::NoReportData),
    };

    let columns = ColumnMap::resolve(header, &config.columns);
    columns.require(&config.columns)?;

    let dates = DateNormalizer::from_config(&config.dates);
    let mut engine = LayoutEngine::new(config, source);
    engine.title();

    for row in grid.data_rows() {
        let entry = ReportRow::from_cells(row, &columns, config, &dates);
        engine.entry(&entry);
    }
    engine.stamp_footers();

    info!(
        "laid out {} entries on {} pages ({} images, {} failed)",
        grid.data_len(),
        engine.pages.len(),
        engine.images.len(),
        engine.failed_images
    );

    Ok(Document {
        width: config.page.width,
        height: config.page.height,
        title: config.text.title.clone(),
        pages: engine.pages,
        images: engine.images,
        entries: grid.data_len(),
        failed_images: engine.failed_images,
    })
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;
