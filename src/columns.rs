/// Column resolution against the header row
///
/// Columns are located by case-insensitive substring match of a pattern
/// against each header name. A role whose pattern matches nothing resolves
/// to `None`, which callers treat as "feature unavailable".
use crate::config::ColumnsConfig;
use crate::error::AppError;
use crate::types::Cell;
use log::debug;
use serde::{Deserialize, Serialize};

/// Logical purpose of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Timestamp,
    Photos,
    Description,
    Author,
    Sector,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 5] =
        [ColumnRole::Timestamp, ColumnRole::Photos, ColumnRole::Description, ColumnRole::Author, ColumnRole::Sector];

    /// Header substring the form export uses for this role
    pub fn default_pattern(&self) -> &'static str {
        match self {
            ColumnRole::Timestamp => "carimbo de data/hora",
            ColumnRole::Photos => "foto",
            ColumnRole::Description => "descrição",
            ColumnRole::Author => "nome completo",
            ColumnRole::Sector => "setor",
        }
    }
}

/// Index of the first header containing `pattern`, ignoring case
pub fn find_column(header: &[Cell], pattern: &str) -> Option<usize> {
    let needle = pattern.to_lowercase();
    header.iter().position(|h| h.as_str().is_some_and(|name| name.to_lowercase().contains(&needle)))
}

/// Physical positions of every role in one header row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnMap {
    pub timestamp: Option<usize>,
    pub photos: Option<usize>,
    pub description: Option<usize>,
    pub author: Option<usize>,
    pub sector: Option<usize>,
}

impl ColumnMap {
    pub fn resolve(header: &[Cell], columns: &ColumnsConfig) -> Self {
        let map = ColumnMap {
            timestamp: find_column(header, columns.pattern(ColumnRole::Timestamp)),
            photos: find_column(header, columns.pattern(ColumnRole::Photos)),
            description: find_column(header, columns.pattern(ColumnRole::Description)),
            author: find_column(header, columns.pattern(ColumnRole::Author)),
            sector: find_column(header, columns.pattern(ColumnRole::Sector)),
        };
        debug!("resolved columns: {:?}", map);
        map
    }

    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        match role {
            ColumnRole::Timestamp => self.timestamp,
            ColumnRole::Photos => self.photos,
            ColumnRole::Description => self.description,
            ColumnRole::Author => self.author,
            ColumnRole::Sector => self.sector,
        }
    }

    /// Fail with every unresolved required role at once
    pub fn require(&self, columns: &ColumnsConfig) -> Result<(), AppError> {
        let missing: Vec<String> = columns
            .required
            .iter()
            .filter(|role| self.get(**role).is_none())
            .map(|role| columns.pattern(*role).to_string())
            .collect();

        if missing.is_empty() { Ok(()) } else { Err(AppError::MissingColumns(missing)) }
    }
}
