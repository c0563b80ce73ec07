//! ESTree syntax trees attached to MDX expression nodes.
//!
//! The node types the danger classifier reasons about get their own variant;
//! everything else the grammar can produce lands in [`SyntaxNode::Other`],
//! which keeps the node's fields so that it can still be walked.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxNode {
    Identifier(Identifier),
    Literal(Literal),
    /// `import.meta`, `new.target`
    MetaProperty(Fields),
    Super,
    /// `import(source)`
    ImportExpression(Fields),
    MemberExpression(MemberExpression),
    CallExpression(CallExpression),
    Function(Function),
    Other(Other),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub rest: Fields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: Value,
    pub rest: Fields,
}

impl Literal {
    /// The key this literal names when used as a property, following the
    /// usual string conversion of primitive values.
    pub fn as_property_key(&self) -> Option<String> {
        match &self.value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null => Some("null".to_string()),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    pub object: Box<SyntaxNode>,
    pub property: Box<SyntaxNode>,
    pub computed: bool,
    pub optional: bool,
    pub rest: Fields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub callee: Box<SyntaxNode>,
    pub arguments: Vec<SyntaxNode>,
    pub optional: bool,
    pub rest: Fields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Declaration,
    Expression,
    Arrow,
}

impl FunctionKind {
    fn from_type(kind: &str) -> Option<Self> {
        match kind {
            "FunctionDeclaration" => Some(Self::Declaration),
            "FunctionExpression" => Some(Self::Expression),
            "ArrowFunctionExpression" => Some(Self::Arrow),
            _ => None,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            Self::Declaration => "FunctionDeclaration",
            Self::Expression => "FunctionExpression",
            Self::Arrow => "ArrowFunctionExpression",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub kind: FunctionKind,
    pub id: Option<Box<SyntaxNode>>,
    pub params: Vec<SyntaxNode>,
    pub body: Box<SyntaxNode>,
    pub rest: Fields,
}

/// A node whose type has no dedicated variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Other {
    pub kind: String,
    pub fields: Fields,
}

/// The fields of a node in source order, minus its `type` tag.
///
/// Typed variants keep the fields they don't model in a `rest` map, so that
/// node-valued extensions (`typeAnnotation`, `returnType`, ...) are walked too.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(pub Vec<(String, Field)>);

#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Node(Box<SyntaxNode>),
    /// Array field; entries that are not nodes (elision holes) are skipped.
    Nodes(Vec<SyntaxNode>),
    Scalar(Value),
}

impl Fields {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self::from_object_except(object, &[])
    }

    fn from_object_except(object: &Map<String, Value>, modeled: &[&str]) -> Self {
        let fields = object
            .iter()
            .filter(|(key, _)| key.as_str() != "type" && !modeled.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), Field::from_json(value)))
            .collect();
        Self(fields)
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.0.iter().find(|(key, _)| key == name).map(|(_, field)| field)
    }

    fn any_node<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&SyntaxNode) -> bool,
    {
        self.0.iter().any(|(_, field)| match field {
            Field::Node(node) => f(&**node),
            Field::Nodes(nodes) => nodes.iter().any(&mut f),
            Field::Scalar(_) => false,
        })
    }
}

impl Field {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => {
                Field::Nodes(items.iter().filter_map(SyntaxNode::from_json).collect())
            }
            other => match SyntaxNode::from_json(other) {
                Some(node) => Field::Node(Box::new(node)),
                None => Field::Scalar(other.clone()),
            },
        }
    }
}

impl SyntaxNode {
    /// Builds a node from its ESTree JSON form.
    ///
    /// Returns `None` when `value` is not an object with a string `type`.
    /// A node of a known type whose fields don't have the expected shape is
    /// kept as [`SyntaxNode::Other`].
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let kind = object.get("type")?.as_str()?;

        let node = match kind {
            "Super" => Some(Self::Super),
            "MetaProperty" => Some(Self::MetaProperty(Fields::from_object(object))),
            "ImportExpression" => Some(Self::ImportExpression(Fields::from_object(object))),
            "Identifier" => object
                .get("name")
                .and_then(Value::as_str)
                .map(|name| {
                    Self::Identifier(Identifier {
                        name: name.to_string(),
                        rest: Fields::from_object_except(object, &["name"]),
                    })
                }),
            "Literal" => Some(Self::Literal(Literal {
                value: object.get("value").cloned().unwrap_or(Value::Null),
                rest: Fields::from_object_except(object, &["value"]),
            })),
            "MemberExpression" => member_from_json(object),
            "CallExpression" => call_from_json(object),
            _ => FunctionKind::from_type(kind).and_then(|kind| function_from_json(kind, object)),
        };

        Some(node.unwrap_or_else(|| {
            Self::Other(Other {
                kind: kind.to_string(),
                fields: Fields::from_object(object),
            })
        }))
    }

    pub fn type_name(&self) -> &str {
        match self {
            Self::Identifier(_) => "Identifier",
            Self::Literal(_) => "Literal",
            Self::MetaProperty(_) => "MetaProperty",
            Self::Super => "Super",
            Self::ImportExpression(_) => "ImportExpression",
            Self::MemberExpression(_) => "MemberExpression",
            Self::CallExpression(_) => "CallExpression",
            Self::Function(function) => function.kind.type_name(),
            Self::Other(other) => &other.kind,
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier(ident) => Some(&ident.name),
            _ => None,
        }
    }

    /// Calls `f` on each direct child in field order and stops at the first
    /// `true`.
    pub fn any_child<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&SyntaxNode) -> bool,
    {
        match self {
            Self::Super => false,
            Self::Identifier(ident) => ident.rest.any_node(f),
            Self::Literal(literal) => literal.rest.any_node(f),
            Self::MetaProperty(fields) | Self::ImportExpression(fields) => fields.any_node(f),
            Self::MemberExpression(member) => {
                f(&*member.object) || f(&*member.property) || member.rest.any_node(&mut f)
            }
            Self::CallExpression(call) => {
                f(&*call.callee)
                    || call.arguments.iter().any(&mut f)
                    || call.rest.any_node(&mut f)
            }
            Self::Function(function) => {
                function.id.as_deref().is_some_and(&mut f)
                    || function.params.iter().any(&mut f)
                    || f(&*function.body)
                    || function.rest.any_node(&mut f)
            }
            Self::Other(other) => other.fields.any_node(f),
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut count = 1;
        self.any_child(|child| {
            count += child.node_count();
            false
        });
        count
    }
}

fn boxed_node(object: &Map<String, Value>, key: &str) -> Option<Box<SyntaxNode>> {
    object.get(key).and_then(SyntaxNode::from_json).map(Box::new)
}

fn node_list(object: &Map<String, Value>, key: &str) -> Option<Vec<SyntaxNode>> {
    object
        .get(key)?
        .as_array()
        .map(|items| items.iter().filter_map(SyntaxNode::from_json).collect())
}

fn flag(object: &Map<String, Value>, key: &str) -> bool {
    object.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn member_from_json(object: &Map<String, Value>) -> Option<SyntaxNode> {
    Some(SyntaxNode::MemberExpression(MemberExpression {
        object: boxed_node(object, "object")?,
        property: boxed_node(object, "property")?,
        computed: flag(object, "computed"),
        optional: flag(object, "optional"),
        rest: Fields::from_object_except(object, &["object", "property", "computed", "optional"]),
    }))
}

fn call_from_json(object: &Map<String, Value>) -> Option<SyntaxNode> {
    Some(SyntaxNode::CallExpression(CallExpression {
        callee: boxed_node(object, "callee")?,
        arguments: node_list(object, "arguments").unwrap_or_default(),
        optional: flag(object, "optional"),
        rest: Fields::from_object_except(object, &["callee", "arguments", "optional"]),
    }))
}

fn function_from_json(kind: FunctionKind, object: &Map<String, Value>) -> Option<SyntaxNode> {
    Some(SyntaxNode::Function(Function {
        kind,
        id: boxed_node(object, "id"),
        params: node_list(object, "params").unwrap_or_default(),
        body: boxed_node(object, "body")?,
        rest: Fields::from_object_except(object, &["id", "params", "body"]),
    }))
}

/// The `data.estree` payload of an MDX node.
///
/// The JSON is kept untouched so that the tree serializes back exactly as it
/// was received; the typed view is built once on the way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct Estree {
    raw: Value,
    program: Option<SyntaxNode>,
}

impl Estree {
    pub fn program(&self) -> Option<&SyntaxNode> {
        self.program.as_ref()
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl From<Value> for Estree {
    fn from(raw: Value) -> Self {
        let program = SyntaxNode::from_json(&raw);
        if program.is_none() && !raw.is_null() {
            log::warn!("estree payload is not a syntax node, treating it as absent");
        }
        Self { raw, program }
    }
}

impl From<Estree> for Value {
    fn from(estree: Estree) -> Self {
        estree.raw
    }
}
