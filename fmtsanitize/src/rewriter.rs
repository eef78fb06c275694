//! Structure-aware rewriting of the target string resource.
//!
//! A target is a `<string>` element, or an `<item>` element declaring
//! `type="string"`, whose `name` attribute equals the configured name. Its
//! text content, flattened across inline markup such as `<xliff:g>`, is
//! normalized as one unit. When anything changes the element's children are
//! replaced by the normalized text.

use serde::Serialize;

use crate::{
    config::DEFAULT_TARGET_NAME,
    document::{Document, Element, Node},
    error::Error,
    normalizer::Normalizer,
};

/// One rewritten target element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementRewrite {
    /// Element kind, `string` or `item`.
    pub kind: String,
    pub replacements: usize,
    /// Canonical keys in index order.
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewriteReport {
    pub elements: Vec<ElementRewrite>,
}

impl RewriteReport {
    pub fn changed(&self) -> bool {
        !self.elements.is_empty()
    }

    pub fn replacements(&self) -> usize {
        self.elements.iter().map(|e| e.replacements).sum()
    }
}

/// Outcome of rewriting serialized markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// Parsed fine, nothing to rewrite.
    Unchanged,
    /// The markup could not be parsed; the source should be passed through as is.
    Unparsable(String),
    Rewritten {
        content: String,
        report: RewriteReport,
    },
}

impl RewriteOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, RewriteOutcome::Rewritten { .. })
    }

    /// The rewritten content, if any.
    pub fn content(&self) -> Option<&str> {
        match self {
            RewriteOutcome::Rewritten { content, .. } => Some(content),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewriter {
    target_name: String,
    normalizer: Normalizer,
}

impl Default for Rewriter {
    fn default() -> Self {
        Rewriter::new(DEFAULT_TARGET_NAME, Normalizer::default())
    }
}

impl Rewriter {
    pub fn new(target_name: impl Into<String>, normalizer: Normalizer) -> Self {
        Rewriter {
            target_name: target_name.into(),
            normalizer,
        }
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn is_target(&self, element: &Element) -> bool {
        if element.attribute("name").as_deref() != Some(self.target_name.as_str()) {
            return false;
        }
        // Prefixed names such as `tools:string` are not resource kinds.
        match element.name().as_str() {
            "string" => true,
            "item" => element.attribute("type").as_deref() == Some("string"),
            _ => false,
        }
    }

    /// Rewrites all target elements in place. Returns whether anything changed.
    pub fn rewrite(&self, document: &mut Document) -> bool {
        self.rewrite_with_report(document).changed()
    }

    pub fn rewrite_with_report(&self, document: &mut Document) -> RewriteReport {
        let mut report = RewriteReport::default();
        self.rewrite_nodes(document.nodes_mut(), &mut report);
        report
    }

    fn rewrite_nodes(&self, nodes: &mut [Node], report: &mut RewriteReport) {
        for node in nodes {
            let Node::Element(element) = node else {
                continue;
            };
            if !self.is_target(element) {
                self.rewrite_nodes(element.children_mut(), report);
                continue;
            }
            if let Some(rewrite) = self.rewrite_element(element) {
                report.elements.push(rewrite);
            }
        }
    }

    fn rewrite_element(&self, element: &mut Element) -> Option<ElementRewrite> {
        let text = match element.text_content() {
            Ok(text) => text,
            Err(e) => {
                log::warn!(
                    "skipping <{} name=\"{}\">: {}",
                    element.name(),
                    self.target_name,
                    e
                );
                return None;
            }
        };
        let normalized = self.normalizer.normalize(&text);
        if !normalized.changed {
            return None;
        }
        log::debug!(
            "rewrote <{} name=\"{}\">: {:?} -> {:?}",
            element.name(),
            self.target_name,
            text,
            normalized.text
        );
        element.set_text(&normalized.text);
        Some(ElementRewrite {
            kind: element.name(),
            replacements: normalized.replacements,
            keys: normalized.keys,
        })
    }

    /// Parses, rewrites and, only if something changed, re-serializes `xml`.
    ///
    /// A document that fails to parse is reported as [`RewriteOutcome::Unparsable`]
    /// rather than as an error; serialization failures are returned as errors.
    pub fn rewrite_str(&self, xml: &str) -> Result<RewriteOutcome, Error> {
        let mut document = match Document::parse(xml) {
            Ok(document) => document,
            Err(e) => {
                log::warn!("passing through unparsable document: {}", e);
                return Ok(RewriteOutcome::Unparsable(e.to_string()));
            }
        };
        let report = self.rewrite_with_report(&mut document);
        if !report.changed() {
            return Ok(RewriteOutcome::Unchanged);
        }
        let content = document.to_xml()?;
        Ok(RewriteOutcome::Rewritten { content, report })
    }
}
