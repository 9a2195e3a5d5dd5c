// Error taxonomy for chart generation

use std::result;
use thiserror::Error;

pub type Result<T> = result::Result<T, ChartError>;

#[derive(Error, Debug)]
pub enum ChartError {
    /// A theme or chart definition could not be obtained or parsed
    #[error("Resource load error: {0}")]
    ResourceLoad(String),

    /// Caller-supplied rows violate the pivot preconditions
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The style resolver rejected an element
    #[error("Style resolution error: {0}")]
    Style(String),

    /// The rendering plugin could not process the styled document
    #[error("Chart processing error: {0:#}")]
    Processing(anyhow::Error),

    /// Rendered bytes could not be written
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChartError {
    pub fn resource_load<S: Into<String>>(msg: S) -> Self {
        ChartError::ResourceLoad(msg.into())
    }

    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        ChartError::InvalidInput(msg.into())
    }

    pub fn processing<S: Into<String>>(msg: S) -> Self {
        ChartError::Processing(anyhow::anyhow!(msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = ChartError::invalid_input("row 3 has no column 7");
        assert_eq!(err.to_string(), "Invalid input: row 3 has no column 7");
    }

    #[test]
    fn test_processing_keeps_context_chain() {
        let inner = anyhow::anyhow!("backend refused").context("Failed to draw bars");
        let err = ChartError::Processing(inner);
        let text = err.to_string();
        assert!(text.contains("Failed to draw bars"));
        assert!(text.contains("backend refused"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ChartError = io.into();
        assert!(matches!(err, ChartError::Io(_)));
    }
}
