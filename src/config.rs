/// Configuration resolution module
///
/// This module handles:
/// - Loading report options from a TOML file
/// - Applying command-line overrides on top of the file
/// - Validating page geometry and column settings
///
/// The resulting `ReportConfig` is immutable for the rest of the run.
use crate::cli::CliArgs;
use crate::columns::ColumnRole;
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the config file
/// - Linux: ~/.config/sheet-report/config.toml
/// - macOS: ~/Library/Application Support/sheet-report/config.toml
/// - Windows: %APPDATA%/sheet-report/config.toml
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sheet-report").join("config.toml"))
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub columns: ColumnsConfig,
    pub page: PageGeometry,
    pub images: ImagesConfig,
    pub dates: DatesConfig,
    pub text: TextConfig,
}

/// Header substrings per role and which roles a report cannot do without
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnsConfig {
    pub timestamp: String,
    pub photos: String,
    pub description: String,
    pub author: String,
    pub sector: String,
    pub required: Vec<ColumnRole>,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            timestamp: ColumnRole::Timestamp.default_pattern().to_string(),
            photos: ColumnRole::Photos.default_pattern().to_string(),
            description: ColumnRole::Description.default_pattern().to_string(),
            author: ColumnRole::Author.default_pattern().to_string(),
            sector: ColumnRole::Sector.default_pattern().to_string(),
            required: vec![ColumnRole::Timestamp, ColumnRole::Photos, ColumnRole::Description],
        }
    }
}

impl ColumnsConfig {
    pub fn pattern(&self, role: ColumnRole) -> &str {
        match role {
            ColumnRole::Timestamp => &self.timestamp,
            ColumnRole::Photos => &self.photos,
            ColumnRole::Description => &self.description,
            ColumnRole::Author => &self.author,
            ColumnRole::Sector => &self.sector,
        }
    }
}

/// Page geometry in millimetres (A4 portrait by default)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub line_height: f32,
    /// Baseline of the first line on the first page
    pub top_offset: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self { width: 210.0, height: 297.0, margin: 10.0, line_height: 6.0, top_offset: 15.0 }
    }
}

impl PageGeometry {
    pub fn printable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Lowest y content may reach; the band below is kept for the footer
    pub fn content_bottom(&self) -> f32 {
        self.height - 2.0 * self.margin
    }

    /// Height available on a fresh page
    pub fn content_height(&self) -> f32 {
        self.content_bottom() - self.margin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageSizing {
    /// Every image gets the same box
    Fixed,
    /// Scale into a max box keeping the aspect ratio
    Proportional,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    pub sizing: ImageSizing,
    pub fixed_width: f32,
    pub fixed_height: f32,
    pub max_width: f32,
    pub max_height: f32,
    /// Below this much remaining space an image moves to the next page instead of shrinking
    pub min_height: f32,
    /// Gap below each image or error line
    pub spacing: f32,
    pub thumbnail_size: u32,
    pub link: bool,
    pub timeout_secs: Option<u64>,
    pub max_bytes: u64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            sizing: ImageSizing::Fixed,
            fixed_width: 150.0,
            fixed_height: 100.0,
            max_width: 190.0,
            max_height: 120.0,
            min_height: 40.0,
            spacing: 5.0,
            thumbnail_size: 1000,
            link: true,
            timeout_secs: None,
            max_bytes: 20 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DateStyle {
    /// DD/MM/YYYY HH:MM:SS
    Full,
    /// DD/MM/YYYY
    Date,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatesConfig {
    pub style: DateStyle,
    /// chrono formats tried in order for text cells
    pub formats: Vec<String>,
}

pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
];

impl Default for DatesConfig {
    fn default() -> Self {
        Self { style: DateStyle::Full, formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect() }
    }
}

/// Labels, placeholders and fonts for the PDF
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    pub title: String,
    pub author_label: String,
    pub sector_label: String,
    pub timestamp_label: String,
    pub description_label: String,
    pub images_label: String,
    pub no_images: String,
    pub image_error: String,
    pub placeholder: String,
    pub description_placeholder: String,
    /// `{page}` and `{total}` are substituted
    pub footer: String,
    pub output_file: PathBuf,
    pub font_regular: Option<PathBuf>,
    pub font_bold: Option<PathBuf>,
    pub font_italic: Option<PathBuf>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            title: "Relatório de Inspeção UMB".to_string(),
            author_label: "Autor:".to_string(),
            sector_label: "Setor:".to_string(),
            timestamp_label: "Data/Hora:".to_string(),
            description_label: "Descrição:".to_string(),
            images_label: "Imagens:".to_string(),
            no_images: "Imagens: Nenhuma imagem fornecida.".to_string(),
            image_error: "[ERRO] Não foi possível carregar imagem:".to_string(),
            placeholder: "Não Informado".to_string(),
            description_placeholder: "N/A".to_string(),
            footer: "Página {page} de {total}".to_string(),
            output_file: PathBuf::from("dados_personalizados.pdf"),
            font_regular: None,
            font_bold: None,
            font_italic: None,
        }
    }
}

impl TextConfig {
    pub fn footer_for(&self, page: usize, total: usize) -> String {
        self.footer.replace("{page}", &page.to_string()).replace("{total}", &total.to_string())
    }
}

impl ReportConfig {
    /// Check values a report cannot be laid out with
    pub fn validate(&self) -> Result<(), String> {
        let page = &self.page;
        if page.width <= 0.0 || page.height <= 0.0 || page.line_height <= 0.0 || page.margin < 0.0 {
            return Err("Page width, height and line height must be positive".to_string());
        }
        if page.printable_width() <= 0.0 || page.content_height() <= page.line_height {
            return Err(format!("Margin {}mm leaves no room on a {}x{}mm page", page.margin, page.width, page.height));
        }
        if page.top_offset < page.margin || page.top_offset >= page.content_bottom() {
            return Err("top_offset must lie between the top margin and the content bottom".to_string());
        }

        let images = &self.images;
        if images.fixed_width <= 0.0 || images.fixed_height <= 0.0 || images.max_width <= 0.0 || images.max_height <= 0.0
        {
            return Err("Image box dimensions must be positive".to_string());
        }
        if images.thumbnail_size == 0 {
            return Err("thumbnail_size must be at least 1".to_string());
        }

        for role in ColumnRole::ALL {
            if self.columns.pattern(role).trim().is_empty() {
                return Err(format!("Column pattern for {:?} is empty", role));
            }
        }

        if self.dates.formats.is_empty() {
            return Err("At least one date format is required".to_string());
        }

        Ok(())
    }
}

/// Parse a TOML config file
pub fn load_config_file(path: &Path) -> Result<ReportConfig, String> {
    debug!("Loading config from {:?}", path);
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&content).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
}

/// Build the report configuration from the config file and CLI arguments
///
/// An explicit `--config` must exist; the default location is only used
/// when present.
pub fn build_report_config(args: &CliArgs) -> Result<ReportConfig, String> {
    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => load_config_file(&path)?,
            None => ReportConfig::default(),
        },
    };

    apply_overrides(&mut config, args);
    config.validate()?;

    debug!("Resolved report config: {:?}", config);
    Ok(config)
}

/// Command-line flags win over the file
fn apply_overrides(config: &mut ReportConfig, args: &CliArgs) {
    if let Some(sizing) = args.image_size {
        config.images.sizing = sizing;
    }
    if let Some(style) = args.date_style {
        config.dates.style = style;
    }
    if let Some(size) = args.thumbnail_size {
        config.images.thumbnail_size = size;
    }
    if args.no_links {
        config.images.link = false;
    }
    if let Some(ref output) = args.output {
        config.text.output_file = output.clone();
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
