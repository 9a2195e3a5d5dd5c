//! Style Resolution Pass
//!
//! Walks the document in pre-order and asks a [`StyleResolver`] for the final
//! style of every element that has not been resolved yet. Pre-order means an
//! element's parent is always resolved before the element itself, so
//! resolvers may read the parent's computed style.

use crate::document::{Document, ElementId};
use crate::error::Result;
use crate::style::StyleMap;

/// Service computing the final style of one element
pub trait StyleResolver {
    fn compute_style(&self, document: &Document, id: ElementId) -> Result<StyleMap>;
}

/// Resolve every unresolved element of `document`, returning how many were resolved.
///
/// The first resolver error aborts the pass; elements visited before it keep
/// their resolved style.
pub fn resolve_styles<R: StyleResolver + ?Sized>(document: &mut Document, resolver: &R) -> Result<usize> {
    let mut resolved = 0;
    let mut current = Some(document.root());

    while let Some(id) = current {
        if !document.element(id).is_style_resolved() {
            let computed = resolver.compute_style(document, id)?;
            log::trace!(
                "resolved <{}> with {} style properties",
                document.element(id).tag(),
                computed.len()
            );
            document.set_resolved_style(id, computed);
            resolved += 1;
        }
        current = document.next_depth_first(id);
    }

    log::debug!("resolved styles for {} of {} elements", resolved, document.len());
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ChartContext, Element};
    use crate::error::ChartError;
    use std::cell::RefCell;

    /// Records the visit order and checks the parent is already resolved
    struct Recorder {
        visits: RefCell<Vec<ElementId>>,
    }

    impl Recorder {
        fn new() -> Self {
            Self { visits: RefCell::new(Vec::new()) }
        }
    }

    impl StyleResolver for Recorder {
        fn compute_style(&self, document: &Document, id: ElementId) -> Result<StyleMap> {
            if let Some(parent) = document.element(id).parent() {
                assert!(document.element(parent).is_style_resolved());
            }
            self.visits.borrow_mut().push(id);
            Ok(document.element(id).style().clone())
        }
    }

    struct Failing;

    impl StyleResolver for Failing {
        fn compute_style(&self, document: &Document, id: ElementId) -> Result<StyleMap> {
            if document.element(id).tag() == "bad" {
                return Err(ChartError::Style("bad element".to_string()));
            }
            Ok(StyleMap::new())
        }
    }

    fn doc() -> Document {
        Document::new(Element::new("chart"), ChartContext::default())
    }

    #[test]
    fn test_single_node_tree() {
        let mut doc = doc();
        let recorder = Recorder::new();
        assert_eq!(resolve_styles(&mut doc, &recorder).unwrap(), 1);
        assert_eq!(*recorder.visits.borrow(), vec![doc.root()]);
        assert!(doc.element(doc.root()).is_style_resolved());
    }

    #[test]
    fn test_each_node_visited_once_in_pre_order() {
        let mut doc = doc();
        let root = doc.root();
        let a = doc.append_child(root, Element::new("a"));
        let a1 = doc.append_child(a, Element::new("a1"));
        let b = doc.append_child(root, Element::new("b"));
        let b1 = doc.append_child(b, Element::new("b1"));

        let recorder = Recorder::new();
        assert_eq!(resolve_styles(&mut doc, &recorder).unwrap(), 5);
        assert_eq!(*recorder.visits.borrow(), vec![root, a, a1, b, b1]);
        assert!(doc.iter_depth_first().all(|id| doc.element(id).is_style_resolved()));
    }

    #[test]
    fn test_deep_chain() {
        let mut doc = doc();
        let mut parent = doc.root();
        for i in 0..500 {
            parent = doc.append_child(parent, Element::new(&format!("n{}", i)));
        }
        let recorder = Recorder::new();
        assert_eq!(resolve_styles(&mut doc, &recorder).unwrap(), 501);
        let visits = recorder.visits.borrow();
        assert!(visits.windows(2).all(|w| doc.element(w[1]).parent() == Some(w[0])));
    }

    #[test]
    fn test_resolved_nodes_are_skipped() {
        let mut doc = doc();
        let root = doc.root();
        let a = doc.append_child(root, Element::new("a"));
        let recorder = Recorder::new();
        resolve_styles(&mut doc, &recorder).unwrap();

        // A second pass only picks up the new element
        let b = doc.append_child(root, Element::new("b"));
        let again = Recorder::new();
        assert_eq!(resolve_styles(&mut doc, &again).unwrap(), 1);
        assert_eq!(*again.visits.borrow(), vec![b]);
        assert!(doc.element(a).is_style_resolved());
    }

    #[test]
    fn test_error_propagates() {
        let mut doc = doc();
        let root = doc.root();
        let ok = doc.append_child(root, Element::new("ok"));
        let bad = doc.append_child(root, Element::new("bad"));
        let after = doc.append_child(root, Element::new("after"));

        let result = resolve_styles(&mut doc, &Failing);
        assert!(matches!(result, Err(ChartError::Style(_))));
        assert!(doc.element(ok).is_style_resolved());
        assert!(!doc.element(bad).is_style_resolved());
        assert!(!doc.element(after).is_style_resolved());
    }

    #[test]
    fn test_stores_computed_style() {
        use crate::style::{StyleKey, StyleValue};
        let mut doc = doc();
        let root = doc.root();
        let s = doc.append_child(root, Element::new("series").with_style(StyleKey::LineWidth, StyleValue::px(2.0)));
        resolve_styles(&mut doc, &Recorder::new()).unwrap();
        assert_eq!(doc.element(s).computed_style().get(StyleKey::LineWidth), Some(&StyleValue::px(2.0)));
    }
}
