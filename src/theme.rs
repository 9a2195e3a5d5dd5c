// Theme lookup by name

use crate::document::{ChartContext, Document};
use crate::error::{ChartError, Result};
use crate::parser::parse_document;
use std::path::{Path, PathBuf};

/// File extension of theme definitions
pub const THEME_EXTENSION: &str = "theme";

/// Source of named theme documents
pub trait ThemeFactory {
    fn theme_document(&self, name: &str) -> Result<Document>;
}

/// Reads `<dir>/<name>.theme` files written in the element DSL
#[derive(Debug, Clone)]
pub struct DirectoryThemeFactory {
    dir: PathBuf,
    context: ChartContext,
}

impl DirectoryThemeFactory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            context: ChartContext::default(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn theme_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, THEME_EXTENSION))
    }
}

impl ThemeFactory for DirectoryThemeFactory {
    fn theme_document(&self, name: &str) -> Result<Document> {
        // Names are plain file stems, never paths
        if name.is_empty() || name.contains(|c: char| c == '/' || c == '\\') || name.starts_with('.') {
            return Err(ChartError::resource_load(format!("Invalid theme name '{}'", name)));
        }

        let path = self.theme_path(name);
        let source = std::fs::read_to_string(&path).map_err(|e| {
            ChartError::resource_load(format!("Failed to read theme {}: {}", path.display(), e))
        })?;
        log::debug!("loaded theme '{}' from {}", name, path.display());
        parse_document(&source, self.context.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TAG_SERIES;
    use crate::style::StyleKey;
    use plotters::style::RGBColor;

    #[test]
    fn test_reads_theme_file() {
        let factory = DirectoryThemeFactory::new("test/themes");
        let doc = factory.theme_document("ocean").unwrap();
        let series = doc.find_children_by_tag(doc.root(), TAG_SERIES);
        assert_eq!(series.len(), 3);
        assert_eq!(doc.element(series[0]).style().color(StyleKey::Color), Some(RGBColor(0x1f, 0x77, 0xb4)));
    }

    #[test]
    fn test_missing_theme() {
        let factory = DirectoryThemeFactory::new("test/themes");
        let err = factory.theme_document("no-such-theme").unwrap_err();
        assert!(matches!(err, ChartError::ResourceLoad(_)));
    }

    #[test]
    fn test_rejects_path_names() {
        let factory = DirectoryThemeFactory::new("test/themes");
        assert!(factory.theme_document("../ocean").is_err());
        assert!(factory.theme_document("").is_err());
    }

    #[test]
    fn test_theme_path() {
        let factory = DirectoryThemeFactory::new("/etc/charts");
        assert_eq!(factory.theme_path("ocean"), PathBuf::from("/etc/charts/ocean.theme"));
    }
}
