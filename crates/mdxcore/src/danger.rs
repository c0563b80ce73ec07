//! Static danger classification of ESTree expressions.
//!
//! An expression is dangerous when any node in it can reach a blocked
//! capability: a blocked global, a computed static method of a built-in
//! constructor, a prototype-chain property, `super`, `import.meta` or a
//! dynamic `import()`. Nothing is evaluated.

use std::fmt;

use crate::blocklist::Blocklist;
use crate::estree::{CallExpression, MemberExpression, SyntaxNode};

/// The check that flagged an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    MetaProperty,
    Super,
    BlockedGlobal,
    BlockedGlobalCall,
    ComputedCallOnGlobal,
    ComputedCallOnConstructor,
    BlockedProperty,
    MemberOfBlockedGlobal,
    DynamicImport,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            Rule::MetaProperty => "meta property access",
            Rule::Super => "super reference",
            Rule::BlockedGlobal => "reference to a blocked global",
            Rule::BlockedGlobalCall => "call of a blocked global",
            Rule::ComputedCallOnGlobal => "computed call on a blocked global",
            Rule::ComputedCallOnConstructor => "computed call on a built-in constructor",
            Rule::BlockedProperty => "access to a blocked property",
            Rule::MemberOfBlockedGlobal => "member access on a blocked global",
            Rule::DynamicImport => "dynamic import",
        };
        f.write_str(description)
    }
}

/// Where and why an expression was flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub rule: Rule,
    pub node_type: String,
    /// Offending name, when the rule is about one.
    pub name: Option<String>,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} `{}` ({})", self.rule, name, self.node_type),
            None => write!(f, "{} ({})", self.rule, self.node_type),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    blocklist: &'a Blocklist,
}

impl Default for Classifier<'static> {
    fn default() -> Self {
        Self::new(Blocklist::shared())
    }
}

impl<'a> Classifier<'a> {
    pub fn new(blocklist: &'a Blocklist) -> Self {
        Self { blocklist }
    }

    pub fn blocklist(&self) -> &'a Blocklist {
        self.blocklist
    }

    pub fn is_dangerous(&self, tree: &SyntaxNode) -> bool {
        self.find(tree).is_some()
    }

    /// First dangerous construct in a pre-order walk of `tree`.
    pub fn find(&self, tree: &SyntaxNode) -> Option<Finding> {
        self.walk(tree, None)
    }

    fn walk(&self, node: &SyntaxNode, parent: Option<&SyntaxNode>) -> Option<Finding> {
        if let Some(finding) = self.check(node, parent) {
            log::trace!("flagged {}", finding);
            return Some(finding);
        }

        let mut found = None;
        node.any_child(|child| {
            found = self.walk(child, Some(node));
            found.is_some()
        });
        found
    }

    fn check(&self, node: &SyntaxNode, parent: Option<&SyntaxNode>) -> Option<Finding> {
        let (rule, name) = match node {
            SyntaxNode::MetaProperty(_) => (Rule::MetaProperty, None),
            SyntaxNode::Super => (Rule::Super, None),
            SyntaxNode::ImportExpression(_) => (Rule::DynamicImport, None),
            SyntaxNode::Identifier(ident) => {
                if !self.blocklist.is_blocked_global(&ident.name)
                    || is_property_name(node, parent)
                    || is_parameter(node, parent)
                {
                    return None;
                }
                (Rule::BlockedGlobal, Some(ident.name.clone()))
            }
            SyntaxNode::CallExpression(call) => self.check_call(call)?,
            SyntaxNode::MemberExpression(member) => self.check_member(member)?,
            _ => return None,
        };

        Some(Finding {
            rule,
            node_type: node.type_name().to_string(),
            name,
        })
    }

    fn check_call(&self, call: &CallExpression) -> Option<(Rule, Option<String>)> {
        if let Some(name) = call.callee.as_identifier() {
            if self.blocklist.is_blocked_global(name) {
                return Some((Rule::BlockedGlobalCall, Some(name.to_string())));
            }
        }

        // `target[key](...)`
        let SyntaxNode::MemberExpression(callee) = call.callee.as_ref() else {
            return None;
        };
        if !callee.computed {
            return None;
        }
        let target = callee.object.as_identifier()?;
        if self.blocklist.is_blocked_global(target) {
            Some((Rule::ComputedCallOnGlobal, Some(target.to_string())))
        } else if self.blocklist.is_builtin_constructor(target) {
            Some((Rule::ComputedCallOnConstructor, Some(target.to_string())))
        } else {
            None
        }
    }

    fn check_member(&self, member: &MemberExpression) -> Option<(Rule, Option<String>)> {
        let property = match member.property.as_ref() {
            SyntaxNode::Identifier(ident) if !member.computed => Some(ident.name.clone()),
            SyntaxNode::Literal(literal) => literal.as_property_key(),
            _ => None,
        };
        if let Some(property) = property {
            if self.blocklist.is_blocked_property(&property) {
                return Some((Rule::BlockedProperty, Some(property)));
            }
        }

        // Covers `g.x`, `g[x]` and `g?.x` alike.
        let target = member.object.as_identifier()?;
        self.blocklist
            .is_blocked_global(target)
            .then(|| (Rule::MemberOfBlockedGlobal, Some(target.to_string())))
    }
}

/// `node` names the field in `parent.node`, it does not refer to a binding.
fn is_property_name(node: &SyntaxNode, parent: Option<&SyntaxNode>) -> bool {
    match parent {
        Some(SyntaxNode::MemberExpression(member)) => {
            !member.computed && std::ptr::eq(member.property.as_ref(), node)
        }
        _ => false,
    }
}

/// `node` is declared as a parameter of `parent`, shadowing any global.
fn is_parameter(node: &SyntaxNode, parent: Option<&SyntaxNode>) -> bool {
    match parent {
        Some(SyntaxNode::Function(function)) => {
            function.params.iter().any(|param| std::ptr::eq(param, node))
        }
        _ => false,
    }
}

/// Classifies `tree` against the built-in blocklist.
pub fn is_dangerous(tree: &SyntaxNode) -> bool {
    Classifier::default().is_dangerous(tree)
}
