// Element DSL and style value parsers

pub mod lexer;
pub mod pipeline;
pub mod style;

// Public API re-exports
pub use pipeline::{parse_components, parse_document, Component, Literal};
pub use style::parse_style_value;
