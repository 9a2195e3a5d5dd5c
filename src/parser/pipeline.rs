// Pipeline parser for the element DSL
//
// Format: component | component | ...
// component: tag(key: value, ...) { component | ... }
// The argument list and the nested block are both optional.

use super::lexer::{identifier, number_literal, string_literal, ws};
use crate::document::{ChartContext, Document, Element, ElementId, TAG_CHART};
use crate::error::{ChartError, Result};
use crate::style::{StyleKey, StyleValue};
use nom::{
    branch::alt,
    character::complete::char,
    combinator::{all_consuming, map, opt},
    multi::separated_list0,
    sequence::{delimited, separated_pair},
    IResult,
};

/// Value written after `key:`
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Num(f64),
}

/// One parsed `tag(...) { ... }` component
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub tag: String,
    pub args: Vec<(String, Literal)>,
    pub children: Vec<Component>,
}

// === Grammar ===

fn literal(input: &str) -> IResult<&str, Literal> {
    alt((
        map(string_literal, Literal::Str),
        map(number_literal, Literal::Num),
    ))(input)
}

fn argument(input: &str) -> IResult<&str, (String, Literal)> {
    separated_pair(ws(identifier), ws(char(':')), ws(literal))(input)
}

fn arguments(input: &str) -> IResult<&str, Vec<(String, Literal)>> {
    delimited(
        ws(char('(')),
        separated_list0(ws(char(',')), argument),
        ws(char(')')),
    )(input)
}

fn block(input: &str) -> IResult<&str, Vec<Component>> {
    delimited(ws(char('{')), components, ws(char('}')))(input)
}

fn component(input: &str) -> IResult<&str, Component> {
    let (input, tag) = ws(identifier)(input)?;
    let (input, args) = opt(arguments)(input)?;
    let (input, children) = opt(block)(input)?;
    Ok((
        input,
        Component {
            tag,
            args: args.unwrap_or_default(),
            children: children.unwrap_or_default(),
        },
    ))
}

fn components(input: &str) -> IResult<&str, Vec<Component>> {
    separated_list0(ws(char('|')), component)(input)
}

/// Parse DSL text into components
pub fn parse_components(input: &str) -> IResult<&str, Vec<Component>> {
    all_consuming(ws(components))(input)
}

// === Document Construction ===

/// Parse DSL text into a document whose root is a `chart` element holding
/// the top-level components in order.
pub fn parse_document(input: &str, context: ChartContext) -> Result<Document> {
    let components = match parse_components(input) {
        Ok((_, components)) => components,
        Err(e) => {
            return Err(ChartError::resource_load(format!(
                "Invalid chart definition: {}",
                describe_error(input, e)
            )))
        }
    };

    let mut doc = Document::new(Element::new(TAG_CHART), context);
    let root = doc.root();
    for component in &components {
        append_component(&mut doc, root, component)?;
    }
    log::debug!("parsed chart definition into {} elements", doc.len());
    Ok(doc)
}

fn append_component(doc: &mut Document, parent: ElementId, component: &Component) -> Result<()> {
    let element = component_element(component)?;
    let id = doc.append_child(parent, element);
    for child in &component.children {
        append_component(doc, id, child)?;
    }
    Ok(())
}

/// Keys naming a style property become styles, `text` sets the text, the
/// rest become attributes.
fn component_element(component: &Component) -> Result<Element> {
    let mut element = Element::new(&component.tag);
    for (key, value) in &component.args {
        if key == "text" {
            element.set_text(literal_text(value));
        } else if let Some(style_key) = StyleKey::from_name(key) {
            element.set_style(style_key, style_value(&component.tag, key, value)?);
        } else {
            match value {
                Literal::Str(s) => element.set_attribute(key, s.as_str()),
                Literal::Num(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                    element.set_attribute(key, *n as i64)
                }
                Literal::Num(n) => element.set_attribute(key, *n),
            }
        }
    }
    Ok(element)
}

fn style_value(tag: &str, key: &str, value: &Literal) -> Result<StyleValue> {
    match value {
        Literal::Num(n) => Ok(StyleValue::number(*n)),
        Literal::Str(s) => s.parse().map_err(|e: String| {
            ChartError::resource_load(format!("{}.{}: {}", tag, key, e))
        }),
    }
}

fn literal_text(value: &Literal) -> String {
    match value {
        Literal::Str(s) => s.clone(),
        Literal::Num(n) => n.to_string(),
    }
}

/// Point at the offset where parsing stopped
fn describe_error(input: &str, err: nom::Err<nom::error::Error<&str>>) -> String {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let offset = input.len() - e.input.len();
            let snippet: String = e.input.chars().take(20).collect();
            format!("unexpected input at offset {}: '{}'", offset, snippet)
        }
        nom::Err::Incomplete(_) => "incomplete input".to_string(),
    }
}
