//! The parts of an MDX mdast tree the sanitizer works on.
//!
//! Expression nodes and JSX elements are typed; every other node type is
//! carried through as a [`GenericNode`] with its fields untouched, so a tree
//! decodes and encodes back to the same JSON.

use anyhow::{anyhow, Result};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::estree::{Estree, SyntaxNode};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Expression(MdxExpression),
    Element(MdxJsxElement),
    Other(GenericNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpressionKind {
    #[serde(rename = "mdxFlowExpression")]
    Flow,
    #[serde(rename = "mdxTextExpression")]
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    #[serde(rename = "mdxJsxFlowElement")]
    Flow,
    #[serde(rename = "mdxJsxTextElement")]
    Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estree: Option<Estree>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `{...}` in flow or text position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdxExpression {
    #[serde(rename = "type")]
    pub kind: ExpressionKind,
    /// Source between the braces.
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ExpressionData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdxJsxElement {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// `None` for fragments.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<JsxAttribute>>,
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsxAttribute {
    /// `name`, `name="..."` or `name={...}`
    #[serde(rename = "mdxJsxAttribute")]
    Named(NamedAttribute),
    /// `{...expression}`
    #[serde(rename = "mdxJsxExpressionAttribute")]
    Spread(SpreadAttribute),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedAttribute {
    pub name: String,
    #[serde(default)]
    pub value: Option<AttributeValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Literal(String),
    Expression(ValueExpression),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueExpressionKind {
    #[serde(rename = "mdxJsxAttributeValueExpression")]
    ValueExpression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueExpression {
    #[serde(rename = "type")]
    pub kind: ValueExpressionKind,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ExpressionData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadAttribute {
    /// Source between the braces, including the leading `...`.
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ExpressionData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn syntax_of(data: &Option<ExpressionData>) -> Option<&SyntaxNode> {
    data.as_ref()?.estree.as_ref()?.program()
}

impl MdxExpression {
    /// Parsed expression, if upstream attached one.
    pub fn syntax(&self) -> Option<&SyntaxNode> {
        syntax_of(&self.data)
    }
}

impl ValueExpression {
    pub fn syntax(&self) -> Option<&SyntaxNode> {
        syntax_of(&self.data)
    }
}

impl SpreadAttribute {
    pub fn syntax(&self) -> Option<&SyntaxNode> {
        syntax_of(&self.data)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| <D::Error as de::Error>::missing_field("type"))?;

        let node = match kind.as_str() {
            "mdxFlowExpression" | "mdxTextExpression" => {
                serde_json::from_value(value).map(Node::Expression)
            }
            "mdxJsxFlowElement" | "mdxJsxTextElement" => {
                serde_json::from_value(value).map(Node::Element)
            }
            _ => serde_json::from_value(value).map(Node::Other),
        };
        node.map_err(|e| de::Error::custom(format!("invalid `{}` node: {}", kind, e)))
    }
}

impl Node {
    pub fn kind(&self) -> &str {
        match self {
            Node::Expression(expr) => match expr.kind {
                ExpressionKind::Flow => "mdxFlowExpression",
                ExpressionKind::Text => "mdxTextExpression",
            },
            Node::Element(element) => match element.kind {
                ElementKind::Flow => "mdxJsxFlowElement",
                ElementKind::Text => "mdxJsxTextElement",
            },
            Node::Other(node) => &node.kind,
        }
    }

    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Expression(_) => None,
            Node::Element(element) => Some(&element.children),
            Node::Other(node) => node.children.as_deref(),
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Expression(_) => None,
            Node::Element(element) => Some(&mut element.children),
            Node::Other(node) => node.children.as_mut(),
        }
    }

    /// Visits `self` and all descendants in document order.
    pub fn walk<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a Node),
    {
        f(self);
        for child in self.children().unwrap_or_default() {
            child.walk(f);
        }
    }

    pub fn count_expressions(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |node| {
            if matches!(node, Node::Expression(_)) {
                count += 1;
            }
        });
        count
    }

    /// Named expression attributes plus spread attributes in the subtree.
    pub fn count_dynamic_attributes(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |node| {
            if let Node::Element(element) = node {
                count += element
                    .attributes
                    .iter()
                    .flatten()
                    .filter(|attr| attr.is_dynamic())
                    .count();
            }
        });
        count
    }

    /// Indented one-line-per-node rendering, for logs and diagnostics.
    pub fn outline(&self) -> String {
        let mut lines = Vec::new();
        self.outline_into(0, &mut lines);
        lines.join("\n")
    }

    fn outline_into(&self, depth: usize, lines: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        let label = match self {
            Node::Expression(expr) => format!("{} {{{}}}", self.kind(), expr.value),
            Node::Element(element) => {
                let attributes: String = element
                    .attributes
                    .iter()
                    .flatten()
                    .map(|attr| format!(" {}", attr))
                    .collect();
                format!(
                    "{} <{}{}>",
                    self.kind(),
                    element.name.as_deref().unwrap_or_default(),
                    attributes
                )
            }
            Node::Other(node) => match node.extra.get("value").and_then(Value::as_str) {
                Some(value) => format!("{} {:?}", node.kind, value),
                None => node.kind.clone(),
            },
        };
        lines.push(format!("{}{}", indent, label));

        for child in self.children().unwrap_or_default() {
            child.outline_into(depth + 1, lines);
        }
    }
}

impl JsxAttribute {
    /// Whether the attribute's value comes from an expression.
    pub fn is_dynamic(&self) -> bool {
        match self {
            JsxAttribute::Spread(_) => true,
            JsxAttribute::Named(attr) => {
                matches!(attr.value, Some(AttributeValue::Expression(_)))
            }
        }
    }
}

impl std::fmt::Display for JsxAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsxAttribute::Spread(spread) => write!(f, "{{{}}}", spread.value),
            JsxAttribute::Named(attr) => match &attr.value {
                None => f.write_str(&attr.name),
                Some(AttributeValue::Literal(value)) => write!(f, "{}={:?}", attr.name, value),
                Some(AttributeValue::Expression(expr)) => {
                    write!(f, "{}={{{}}}", attr.name, expr.value)
                }
            },
        }
    }
}

/// Decodes an mdast tree from its JSON form.
pub fn from_json_str(json: &str) -> Result<Node> {
    serde_json::from_str(json).map_err(|e| anyhow!("failed to decode document tree: {}", e))
}

/// Encodes an mdast tree back to JSON.
pub fn to_json_string(tree: &Node, pretty: bool) -> Result<String> {
    let encoded = if pretty {
        serde_json::to_string_pretty(tree)
    } else {
        serde_json::to_string(tree)
    };
    encoded.map_err(|e| anyhow!("failed to encode document tree: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use serde_json::json;

    fn decode(value: Value) -> Node {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decode_expression_nodes() {
        let node = decode(flow_expression("process.env", Some(member(ident("process"), "env"))));
        let Node::Expression(expr) = &node else {
            panic!("unexpected node: {:?}", node);
        };
        assert_eq!(expr.kind, ExpressionKind::Flow);
        assert_eq!(expr.value, "process.env");
        assert_eq!(expr.syntax().map(SyntaxNode::type_name), Some("Program"));

        let node = decode(text_expression("x", None));
        let Node::Expression(expr) = &node else {
            panic!("unexpected node: {:?}", node);
        };
        assert_eq!(expr.kind, ExpressionKind::Text);
        assert!(expr.syntax().is_none());
    }

    #[test]
    fn test_decode_attributes() {
        let node = decode(jsx_flow(
            "Component",
            vec![
                string_attr("id", "test-id"),
                bool_attr("enabled"),
                expr_attr("value", "props.value", Some(member(ident("props"), "value"))),
                spread_attr("...rest", Some(ident("rest"))),
            ],
            vec![],
        ));
        let Node::Element(element) = &node else {
            panic!("unexpected node: {:?}", node);
        };
        let attributes = element.attributes.as_ref().unwrap();
        assert_eq!(attributes.len(), 4);
        assert!(!attributes[0].is_dynamic());
        assert!(!attributes[1].is_dynamic());
        assert!(attributes[2].is_dynamic());
        assert!(attributes[3].is_dynamic());
        assert_eq!(node.count_dynamic_attributes(), 2);

        match &attributes[2] {
            JsxAttribute::Named(NamedAttribute {
                value: Some(AttributeValue::Expression(expr)),
                ..
            }) => assert!(expr.syntax().is_some()),
            other => panic!("unexpected attribute: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_nodes_round_trip() {
        let tree = json!({
            "type": "root",
            "children": [
                {
                    "type": "heading",
                    "depth": 2,
                    "children": [{"type": "text", "value": "Title"}],
                    "position": {"start": {"line": 1, "column": 1, "offset": 0}}
                },
                {"type": "thematicBreak"},
                {
                    "type": "mdxJsxTextElement",
                    "name": null,
                    "attributes": [],
                    "children": [],
                    "position": {"start": {"line": 3, "column": 1, "offset": 12}}
                }
            ]
        });
        let node = decode(tree.clone());
        assert_eq!(serde_json::to_value(&node).unwrap(), tree);
    }

    #[test]
    fn test_expression_round_trip_keeps_estree() {
        let tree = flow_expression("a && b", Some(logical("&&", ident("a"), ident("b"))));
        let node = decode(tree.clone());
        assert_eq!(serde_json::to_value(&node).unwrap(), tree);
    }

    #[test]
    fn test_missing_type_is_an_error() {
        let result: std::result::Result<Node, _> = serde_json::from_value(json!({"children": []}));
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_expression_node_is_an_error() {
        let result = from_json_str(r#"{"type": "mdxFlowExpression", "value": 3}"#);
        let error = result.unwrap_err().to_string();
        assert!(error.contains("mdxFlowExpression"), "{}", error);
    }

    #[test]
    fn test_element_without_attribute_list() {
        let node = decode(json!({"type": "mdxJsxFlowElement", "name": "X", "children": []}));
        let Node::Element(element) = &node else {
            panic!("unexpected node: {:?}", node);
        };
        assert!(element.attributes.is_none());
        assert_eq!(node.count_dynamic_attributes(), 0);
    }

    #[test]
    fn test_counts_and_walk() {
        let node = decode(root(vec![
            heading(1, vec![text_expression("props.title", None)]),
            paragraph(vec![
                text("My name is "),
                text_expression("user.name", None),
                text("."),
            ]),
            flow_expression("1 + 1", None),
        ]));
        assert_eq!(node.count_expressions(), 3);

        let mut kinds = Vec::new();
        node.walk(&mut |n| kinds.push(n.kind().to_string()));
        assert_eq!(kinds[0], "root");
        assert_eq!(kinds.len(), 8);
    }

    #[test]
    fn test_outline() {
        let node = decode(root(vec![
            paragraph(vec![text("Hi "), text_expression("name", None)]),
            jsx_flow(
                "Component",
                vec![
                    string_attr("id", "x"),
                    bool_attr("enabled"),
                    expr_attr("value", "value", None),
                    spread_attr("...rest", None),
                ],
                vec![],
            ),
        ]));
        insta::assert_snapshot!(node.outline(), @r###"
        root
          paragraph
            text "Hi "
            mdxTextExpression {name}
          mdxJsxFlowElement <Component id="x" enabled value={value} {...rest}>
        "###);
    }

    #[test]
    fn test_json_string_helpers() {
        let node = from_json_str(r#"{"type":"root","children":[]}"#).unwrap();
        assert_eq!(to_json_string(&node, false).unwrap(), r#"{"type":"root","children":[]}"#);
        assert!(from_json_str("not json").is_err());
    }
}
