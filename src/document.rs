//! Document Element Tree
//!
//! An ordered, rooted tree of named, attributed, styleable elements. Elements
//! live in an arena owned by the [`Document`]; an element can only enter the
//! tree through [`Document::append_child`], which takes a fresh owned element,
//! so every element has exactly one parent and no element can become its own
//! ancestor.
//!
//! Traversal is driven by [`Document::next_depth_first`], which needs nothing
//! but the current element to find the next one in pre-order.

use crate::style::{StyleKey, StyleMap, StyleValue};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;

pub const TAG_CHART: &str = "chart";
pub const TAG_TITLE: &str = "title";
pub const TAG_SERIES: &str = "series";
pub const TAG_PLOT: &str = "plot";
pub const TAG_RANGE_LABEL: &str = "rangeLabel";
pub const TAG_DOMAIN_LABEL: &str = "domainLabel";

/// Attribute linking a series element to a data column
pub const COLUMN_POSITION: &str = "column-position";

pub const DEFAULT_DRILL_URL: &str = "http://localhost:8080/Pentaho/JPivot";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
    Integer(i64),
}

impl AttributeValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            AttributeValue::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            AttributeValue::Text(s) => json!(s),
            AttributeValue::Number(n) => json!(n),
            AttributeValue::Integer(i) => json!(i),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Number(n) => write!(f, "{:?}", n),
            AttributeValue::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        AttributeValue::Number(n)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Integer(i)
    }
}

impl From<usize> for AttributeValue {
    fn from(i: usize) -> Self {
        AttributeValue::Integer(i as i64)
    }
}

/// Whether the style resolution pass has computed an element's final style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveState {
    #[default]
    Unresolved,
    Resolved,
}

/// A single node of the document
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, AttributeValue>,
    style: StyleMap,
    computed_style: StyleMap,
    state: ResolveState,
    text: Option<String>,
    parent: Option<ElementId>,
    next_sibling: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Element {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            style: StyleMap::new(),
            computed_style: StyleMap::new(),
            state: ResolveState::Unresolved,
            text: None,
            parent: None,
            next_sibling: None,
            children: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn with_style(mut self, key: StyleKey, value: StyleValue) -> Self {
        self.style.set(key, value);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn set_attribute(&mut self, key: &str, value: impl Into<AttributeValue>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Authored style
    pub fn style(&self) -> &StyleMap {
        &self.style
    }

    pub fn style_value(&self, key: StyleKey) -> Option<&StyleValue> {
        self.style.get(key)
    }

    pub fn set_style(&mut self, key: StyleKey, value: StyleValue) {
        self.style.set(key, value);
    }

    /// Final style snapshot; empty until the element is resolved
    pub fn computed_style(&self) -> &StyleMap {
        &self.computed_style
    }

    pub fn state(&self) -> ResolveState {
        self.state
    }

    pub fn is_style_resolved(&self) -> bool {
        self.state == ResolveState::Resolved
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

/// Construction context threaded through document building
#[derive(Debug, Clone, PartialEq)]
pub struct ChartContext {
    /// Drill-through URL placed on plot elements
    pub drill_url: String,
    /// Value of the `scale-num` style on plot elements
    pub scale_number: f64,
}

impl Default for ChartContext {
    fn default() -> Self {
        Self {
            drill_url: DEFAULT_DRILL_URL.to_string(),
            scale_number: 1.0,
        }
    }
}

/// An arena-backed element tree
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
    context: ChartContext,
}

impl Document {
    pub fn new(root: Element, context: ChartContext) -> Self {
        let mut doc = Document { elements: Vec::new(), context };
        doc.insert(root, None);
        doc
    }

    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    pub fn context(&self) -> &ChartContext {
        &self.context
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Element by id; ids are only handed out by this document
    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    pub fn element_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.elements[id.0]
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    fn insert(&mut self, mut element: Element, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.elements.len());
        element.parent = parent;
        element.next_sibling = None;
        element.children.clear();
        element.state = ResolveState::Unresolved;
        element.computed_style = StyleMap::new();
        self.elements.push(element);
        id
    }

    /// Append `element` as the last child of `parent`
    pub fn append_child(&mut self, parent: ElementId, element: Element) -> ElementId {
        let id = self.insert(element, Some(parent));
        if let Some(&last) = self.elements[parent.0].children.last() {
            self.elements[last.0].next_sibling = Some(id);
        }
        self.elements[parent.0].children.push(id);
        id
    }

    /// Direct children of `parent` carrying `tag`, in document order
    pub fn find_children_by_tag(&self, parent: ElementId, tag: &str) -> Vec<ElementId> {
        self.element(parent)
            .children
            .iter()
            .copied()
            .filter(|&c| self.element(c).tag == tag)
            .collect()
    }

    pub fn first_child_by_tag(&self, parent: ElementId, tag: &str) -> Option<ElementId> {
        self.element(parent)
            .children
            .iter()
            .copied()
            .find(|&c| self.element(c).tag == tag)
    }

    /// The element after `id` in pre-order: its first child, else its next
    /// sibling, else the next sibling of its nearest ancestor that has one.
    pub fn next_depth_first(&self, id: ElementId) -> Option<ElementId> {
        let element = self.element(id);
        if let Some(&first) = element.children.first() {
            return Some(first);
        }
        let mut current = element;
        loop {
            if let Some(sibling) = current.next_sibling {
                return Some(sibling);
            }
            current = self.element(current.parent?);
        }
    }

    pub fn iter_depth_first(&self) -> DepthFirst<'_> {
        DepthFirst { document: self, next: Some(self.root()) }
    }

    /// Number of ancestors of `id`
    pub fn depth(&self, id: ElementId) -> usize {
        let mut depth = 0;
        let mut current = self.element(id).parent;
        while let Some(p) = current {
            depth += 1;
            current = self.element(p).parent;
        }
        depth
    }

    /// Store the final style of `id` and flag it resolved
    pub fn set_resolved_style(&mut self, id: ElementId, computed: StyleMap) {
        let element = &mut self.elements[id.0];
        element.computed_style = computed;
        element.state = ResolveState::Resolved;
    }

    /// JSON view of the tree, used for debug dumps
    pub fn to_json(&self) -> Value {
        self.element_json(self.root())
    }

    fn element_json(&self, id: ElementId) -> Value {
        let element = self.element(id);
        let mut obj = Map::new();
        obj.insert("tag".to_string(), json!(element.tag));
        if let Some(text) = &element.text {
            obj.insert("text".to_string(), json!(text));
        }
        if !element.attributes.is_empty() {
            let attrs: Map<String, Value> = element
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect();
            obj.insert("attributes".to_string(), Value::Object(attrs));
        }
        if !element.style.is_empty() {
            obj.insert("style".to_string(), style_json(&element.style));
        }
        if element.is_style_resolved() {
            obj.insert("computed".to_string(), style_json(&element.computed_style));
        }
        if !element.children.is_empty() {
            let children = element.children.iter().map(|&c| self.element_json(c)).collect();
            obj.insert("children".to_string(), Value::Array(children));
        }
        Value::Object(obj)
    }
}

fn style_json(style: &StyleMap) -> Value {
    Value::Object(
        style
            .iter()
            .map(|(k, v)| (k.name().to_string(), json!(v.to_string())))
            .collect(),
    )
}

/// Pre-order iterator built on [`Document::next_depth_first`]
pub struct DepthFirst<'a> {
    document: &'a Document,
    next: Option<ElementId>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        let current = self.next?;
        self.next = self.document.next_depth_first(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// chart
    /// ├── a
    /// │   ├── a1
    /// │   └── a2
    /// │       └── a2x
    /// └── b
    fn sample() -> Document {
        let mut doc = Document::new(Element::new(TAG_CHART), ChartContext::default());
        let root = doc.root();
        let a = doc.append_child(root, Element::new("a"));
        doc.append_child(a, Element::new("a1"));
        let a2 = doc.append_child(a, Element::new("a2"));
        doc.append_child(a2, Element::new("a2x"));
        doc.append_child(root, Element::new("b"));
        doc
    }

    fn tags(doc: &Document) -> Vec<String> {
        doc.iter_depth_first().map(|id| doc.element(id).tag().to_string()).collect()
    }

    #[test]
    fn test_pre_order_traversal() {
        let doc = sample();
        assert_eq!(tags(&doc), vec!["chart", "a", "a1", "a2", "a2x", "b"]);
    }

    #[test]
    fn test_traversal_ends_after_last_node() {
        let doc = sample();
        let last = doc.iter_depth_first().last().unwrap();
        assert_eq!(doc.element(last).tag(), "b");
        assert_eq!(doc.next_depth_first(last), None);
    }

    #[test]
    fn test_single_node_tree() {
        let doc = Document::new(Element::new(TAG_CHART), ChartContext::default());
        assert_eq!(doc.next_depth_first(doc.root()), None);
        assert_eq!(doc.iter_depth_first().count(), 1);
    }

    #[test]
    fn test_deep_chain() {
        let mut doc = Document::new(Element::new(TAG_CHART), ChartContext::default());
        let mut parent = doc.root();
        for i in 0..1000 {
            parent = doc.append_child(parent, Element::new(&format!("n{}", i)));
        }
        assert_eq!(doc.iter_depth_first().count(), 1001);
        assert_eq!(doc.depth(parent), 1000);
        assert_eq!(doc.next_depth_first(parent), None);
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let doc = sample();
        let root = doc.root();
        let children: Vec<&str> = doc.element(root).children().iter().map(|&c| doc.element(c).tag()).collect();
        assert_eq!(children, vec!["a", "b"]);
        let a = doc.element(root).children()[0];
        assert_eq!(doc.element(a).parent(), Some(root));
    }

    #[test]
    fn test_attributes_and_styles() {
        let mut element = Element::new(TAG_SERIES)
            .with_attribute(COLUMN_POSITION, 3usize)
            .with_style(StyleKey::LineWidth, StyleValue::px(1.0));
        element.set_attribute("name", "Sales");
        element.set_attribute(COLUMN_POSITION, 4usize);
        assert_eq!(element.attribute(COLUMN_POSITION).and_then(|a| a.as_i64()), Some(4));
        assert_eq!(element.attribute("name").and_then(|a| a.as_str()), Some("Sales"));
        assert_eq!(element.attributes().count(), 2);
        assert_eq!(element.style_value(StyleKey::LineWidth), Some(&StyleValue::px(1.0)));
        assert_eq!(element.style_value(StyleKey::Color), None);
    }

    #[test]
    fn test_attribute_conversions() {
        assert_eq!(AttributeValue::from("2.5").as_f64(), Some(2.5));
        assert_eq!(AttributeValue::Number(-150.0).to_string(), "-150.0");
        assert_eq!(AttributeValue::Number(4.0).as_i64(), Some(4));
        assert_eq!(AttributeValue::Number(4.5).as_i64(), None);
    }

    #[test]
    fn test_find_children_by_tag() {
        let mut doc = Document::new(Element::new(TAG_CHART), ChartContext::default());
        let root = doc.root();
        doc.append_child(root, Element::new(TAG_TITLE));
        let s0 = doc.append_child(root, Element::new(TAG_SERIES));
        let s1 = doc.append_child(root, Element::new(TAG_SERIES));
        // Nested series are not direct children
        doc.append_child(s1, Element::new(TAG_SERIES));
        assert_eq!(doc.find_children_by_tag(root, TAG_SERIES), vec![s0, s1]);
        assert_eq!(doc.first_child_by_tag(root, TAG_PLOT), None);
    }

    #[test]
    fn test_append_resets_resolution() {
        let mut doc = Document::new(Element::new(TAG_CHART), ChartContext::default());
        let root = doc.root();
        doc.set_resolved_style(root, StyleMap::new());
        let copied = doc.element(root).clone();
        let id = doc.append_child(root, copied);
        assert!(!doc.element(id).is_style_resolved());
        assert!(doc.element(id).children().is_empty());
        assert!(doc.element(root).is_style_resolved());
    }

    #[test]
    fn test_to_json() {
        let mut doc = Document::new(Element::new(TAG_CHART), ChartContext::default());
        let root = doc.root();
        doc.append_child(root, Element::new(TAG_TITLE).with_text("Sales"));
        doc.append_child(
            root,
            Element::new("dataset").with_attribute("type", "pie"),
        );
        let value = doc.to_json();
        assert_eq!(value["tag"], "chart");
        assert_eq!(value["children"][0]["text"], "Sales");
        assert_eq!(value["children"][1]["attributes"]["type"], "pie");
        assert!(value.get("computed").is_none());
    }
}
