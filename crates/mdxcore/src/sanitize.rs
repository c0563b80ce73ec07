use serde::{Deserialize, Serialize};

use crate::blocklist::Blocklist;
use crate::danger::Classifier;
use crate::document::{AttributeValue, JsxAttribute, MdxExpression, Node};
use crate::estree::SyntaxNode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Drop every expression and every expression-valued attribute.
    #[default]
    RemoveAll,
    /// Drop only what the classifier flags.
    RemoveDangerousOnly,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeScope {
    #[default]
    IncludeAttributes,
    ExcludeAttributes,
}

/// What dangerous-only mode does with an expression that has no parsed tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingTreePolicy {
    /// Fail open: nothing to analyze, nothing flagged.
    #[default]
    Keep,
    /// Fail closed.
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeOptions {
    pub mode: Mode,
    pub attributes: AttributeScope,
    pub missing_tree: MissingTreePolicy,
    /// Also remove a parent whose children were all removed.
    pub prune_empty_parents: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            mode: Mode::RemoveAll,
            attributes: AttributeScope::IncludeAttributes,
            missing_tree: MissingTreePolicy::Keep,
            prune_empty_parents: true,
        }
    }
}

impl SanitizeOptions {
    pub fn dangerous_only() -> Self {
        Self {
            mode: Mode::RemoveDangerousOnly,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeReport {
    pub expressions_removed: usize,
    pub attributes_removed: usize,
    pub parents_pruned: usize,
    /// Expressions and attributes kept only because they had no parsed tree.
    pub kept_without_analysis: usize,
}

impl SanitizeReport {
    pub fn removed_anything(&self) -> bool {
        self.expressions_removed + self.attributes_removed + self.parents_pruned > 0
    }
}

/// Removes expression content from an MDX tree in place.
///
/// Runs two passes: expression nodes first, then the attributes of JSX
/// elements (unless attributes are out of scope).
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer<'a> {
    classifier: Classifier<'a>,
    options: SanitizeOptions,
}

impl Sanitizer<'static> {
    pub fn with_options(options: SanitizeOptions) -> Self {
        Self::new(Blocklist::shared(), options)
    }
}

impl<'a> Sanitizer<'a> {
    pub fn new(blocklist: &'a Blocklist, options: SanitizeOptions) -> Self {
        Self {
            classifier: Classifier::new(blocklist),
            options,
        }
    }

    pub fn options(&self) -> &SanitizeOptions {
        &self.options
    }

    pub fn sanitize(&self, tree: &mut Node) -> SanitizeReport {
        let mut report = SanitizeReport::default();

        // The root itself is never removed.
        if let Some(children) = tree.children_mut() {
            self.prune_children(children, &mut report);
        }

        if self.options.attributes == AttributeScope::IncludeAttributes {
            self.filter_attributes(tree, &mut report);
        }

        log::debug!(
            "sanitized {} tree ({:?}): {} expressions, {} attributes, {} parents removed",
            tree.kind(),
            self.options.mode,
            report.expressions_removed,
            report.attributes_removed,
            report.parents_pruned
        );
        report
    }

    fn prune_children(&self, children: &mut Vec<Node>, report: &mut SanitizeReport) {
        children.retain_mut(|child| !self.prune(child, report));
    }

    /// Whether `node` should be dropped from its parent.
    fn prune(&self, node: &mut Node, report: &mut SanitizeReport) -> bool {
        if let Node::Expression(expr) = node {
            let remove = self.remove_expression(expr, report);
            if remove {
                report.expressions_removed += 1;
            }
            return remove;
        }

        let prune_empty = self.options.prune_empty_parents;
        let Some(children) = node.children_mut() else {
            return false;
        };
        if children.is_empty() {
            return false;
        }

        self.prune_children(children, report);
        if prune_empty && children.is_empty() {
            log::trace!("pruning emptied {} node", node.kind());
            report.parents_pruned += 1;
            return true;
        }
        false
    }

    fn remove_expression(&self, expr: &MdxExpression, report: &mut SanitizeReport) -> bool {
        match self.options.mode {
            Mode::RemoveAll => true,
            Mode::RemoveDangerousOnly => self.is_unsafe(expr.syntax(), &expr.value, report),
        }
    }

    fn filter_attributes(&self, node: &mut Node, report: &mut SanitizeReport) {
        if let Node::Element(element) = node {
            if let Some(attributes) = element.attributes.as_mut() {
                let before = attributes.len();
                attributes.retain(|attr| self.keep_attribute(attr, report));
                report.attributes_removed += before - attributes.len();
            }
        }

        if let Some(children) = node.children_mut() {
            for child in children.iter_mut() {
                self.filter_attributes(child, report);
            }
        }
    }

    fn keep_attribute(&self, attr: &JsxAttribute, report: &mut SanitizeReport) -> bool {
        let (syntax, source) = match attr {
            JsxAttribute::Spread(spread) => (spread.syntax(), spread.value.as_str()),
            JsxAttribute::Named(named) => match &named.value {
                None | Some(AttributeValue::Literal(_)) => return true,
                Some(AttributeValue::Expression(expr)) => (expr.syntax(), expr.value.as_str()),
            },
        };

        match self.options.mode {
            Mode::RemoveAll => false,
            Mode::RemoveDangerousOnly => !self.is_unsafe(syntax, source, report),
        }
    }

    /// Dangerous-only verdict for one expression.
    fn is_unsafe(
        &self,
        syntax: Option<&SyntaxNode>,
        source: &str,
        report: &mut SanitizeReport,
    ) -> bool {
        match syntax {
            Some(tree) => match self.classifier.find(tree) {
                Some(finding) => {
                    log::debug!("removing `{}`: {}", source, finding);
                    true
                }
                None => false,
            },
            None => match self.options.missing_tree {
                MissingTreePolicy::Keep => {
                    log::warn!("no syntax tree for `{}`, keeping it", source);
                    report.kept_without_analysis += 1;
                    false
                }
                MissingTreePolicy::Remove => {
                    log::debug!("no syntax tree for `{}`, removing it", source);
                    true
                }
            },
        }
    }
}

/// Sanitizes `tree` with the built-in blocklist.
pub fn sanitize(tree: &mut Node, options: SanitizeOptions) -> SanitizeReport {
    Sanitizer::with_options(options).sanitize(tree)
}
