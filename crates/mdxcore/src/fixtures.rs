//! Builders for the ESTree and mdast JSON that `micromark-extension-mdxjs`
//! attaches to parsed MDX, used across the unit tests.

use serde_json::{json, Value};

use crate::estree::SyntaxNode;

pub fn ident(name: &str) -> Value {
    json!({"type": "Identifier", "name": name})
}

pub fn lit(value: Value) -> Value {
    json!({"type": "Literal", "value": value})
}

pub fn this() -> Value {
    json!({"type": "ThisExpression"})
}

pub fn member(object: Value, property: &str) -> Value {
    json!({
        "type": "MemberExpression",
        "object": object,
        "property": ident(property),
        "computed": false,
        "optional": false
    })
}

pub fn optional_member(object: Value, property: &str) -> Value {
    json!({
        "type": "MemberExpression",
        "object": object,
        "property": ident(property),
        "computed": false,
        "optional": true
    })
}

pub fn computed(object: Value, property: Value) -> Value {
    json!({
        "type": "MemberExpression",
        "object": object,
        "property": property,
        "computed": true,
        "optional": false
    })
}

pub fn chain(expression: Value) -> Value {
    json!({"type": "ChainExpression", "expression": expression})
}

pub fn call(callee: Value, arguments: Vec<Value>) -> Value {
    json!({
        "type": "CallExpression",
        "callee": callee,
        "arguments": arguments,
        "optional": false
    })
}

pub fn new_expr(callee: Value, arguments: Vec<Value>) -> Value {
    json!({"type": "NewExpression", "callee": callee, "arguments": arguments})
}

pub fn binary(operator: &str, left: Value, right: Value) -> Value {
    json!({"type": "BinaryExpression", "operator": operator, "left": left, "right": right})
}

pub fn logical(operator: &str, left: Value, right: Value) -> Value {
    json!({"type": "LogicalExpression", "operator": operator, "left": left, "right": right})
}

pub fn conditional(test: Value, consequent: Value, alternate: Value) -> Value {
    json!({
        "type": "ConditionalExpression",
        "test": test,
        "consequent": consequent,
        "alternate": alternate
    })
}

pub fn unary(operator: &str, argument: Value) -> Value {
    json!({"type": "UnaryExpression", "operator": operator, "prefix": true, "argument": argument})
}

pub fn await_expr(argument: Value) -> Value {
    json!({"type": "AwaitExpression", "argument": argument})
}

pub fn array(elements: Vec<Value>) -> Value {
    json!({"type": "ArrayExpression", "elements": elements})
}

pub fn object(properties: Vec<(&str, Value)>) -> Value {
    let properties: Vec<Value> = properties
        .into_iter()
        .map(|(key, value)| {
            json!({
                "type": "Property",
                "key": ident(key),
                "value": value,
                "kind": "init",
                "method": false,
                "shorthand": false,
                "computed": false
            })
        })
        .collect();
    json!({"type": "ObjectExpression", "properties": properties})
}

pub fn arrow(params: Vec<Value>, body: Value) -> Value {
    json!({
        "type": "ArrowFunctionExpression",
        "id": null,
        "expression": true,
        "generator": false,
        "async": false,
        "params": params,
        "body": body
    })
}

pub fn block(statements: Vec<Value>) -> Value {
    json!({"type": "BlockStatement", "body": statements})
}

pub fn return_stmt(argument: Value) -> Value {
    json!({"type": "ReturnStatement", "argument": argument})
}

pub fn expr_stmt(expression: Value) -> Value {
    json!({"type": "ExpressionStatement", "expression": expression})
}

pub fn function_expr(name: Option<&str>, params: Vec<Value>, body: Vec<Value>) -> Value {
    json!({
        "type": "FunctionExpression",
        "id": name.map(ident),
        "expression": false,
        "generator": false,
        "async": false,
        "params": params,
        "body": block(body)
    })
}

pub fn function_decl(name: &str, params: Vec<Value>, body: Vec<Value>) -> Value {
    json!({
        "type": "FunctionDeclaration",
        "id": ident(name),
        "expression": false,
        "generator": false,
        "async": false,
        "params": params,
        "body": block(body)
    })
}

/// Class member; `kind` follows from the name.
pub fn method(name: &str, params: Vec<Value>, body: Vec<Value>) -> Value {
    let kind = if name == "constructor" { "constructor" } else { "method" };
    json!({
        "type": "MethodDefinition",
        "static": false,
        "computed": false,
        "key": ident(name),
        "kind": kind,
        "value": function_expr(None, params, body)
    })
}

/// `{ name(params) { body } }`
pub fn object_method(name: &str, params: Vec<Value>, body: Vec<Value>) -> Value {
    let property = json!({
        "type": "Property",
        "key": ident(name),
        "value": function_expr(None, params, body),
        "kind": "init",
        "method": true,
        "shorthand": false,
        "computed": false
    });
    json!({"type": "ObjectExpression", "properties": [property]})
}

/// Statement-level program, for declarations.
pub fn program_of(statements: Vec<Value>) -> Value {
    json!({
        "type": "Program",
        "sourceType": "module",
        "comments": [],
        "body": statements
    })
}

pub fn class_expr(name: &str, super_class: Option<Value>, methods: Vec<Value>) -> Value {
    json!({
        "type": "ClassExpression",
        "id": ident(name),
        "superClass": super_class,
        "body": {"type": "ClassBody", "body": methods}
    })
}

pub fn super_node() -> Value {
    json!({"type": "Super"})
}

pub fn meta_property(meta: &str, property: &str) -> Value {
    json!({"type": "MetaProperty", "meta": ident(meta), "property": ident(property)})
}

pub fn import_expr(source: Value) -> Value {
    json!({"type": "ImportExpression", "source": source})
}

pub fn assign(left: Value, right: Value) -> Value {
    json!({"type": "AssignmentExpression", "operator": "=", "left": left, "right": right})
}

/// Wraps one expression the way an MDX expression's `data.estree` does.
pub fn program(expression: Value) -> Value {
    json!({
        "type": "Program",
        "sourceType": "module",
        "comments": [],
        "body": [expr_stmt(expression)]
    })
}

pub fn syntax(expression: Value) -> SyntaxNode {
    SyntaxNode::from_json(&program(expression)).expect("fixture is a syntax node")
}

pub fn flow_expression(source: &str, expression: Option<Value>) -> Value {
    expression_node("mdxFlowExpression", source, expression)
}

pub fn text_expression(source: &str, expression: Option<Value>) -> Value {
    expression_node("mdxTextExpression", source, expression)
}

fn expression_node(kind: &str, source: &str, expression: Option<Value>) -> Value {
    match expression {
        Some(expression) => json!({
            "type": kind,
            "value": source,
            "data": {"estree": program(expression)}
        }),
        None => json!({"type": kind, "value": source}),
    }
}

pub fn text(value: &str) -> Value {
    json!({"type": "text", "value": value})
}

pub fn paragraph(children: Vec<Value>) -> Value {
    json!({"type": "paragraph", "children": children})
}

pub fn heading(depth: u8, children: Vec<Value>) -> Value {
    json!({"type": "heading", "depth": depth, "children": children})
}

pub fn root(children: Vec<Value>) -> Value {
    json!({"type": "root", "children": children})
}

pub fn jsx_flow(name: &str, attributes: Vec<Value>, children: Vec<Value>) -> Value {
    json!({
        "type": "mdxJsxFlowElement",
        "name": name,
        "attributes": attributes,
        "children": children
    })
}

pub fn jsx_text(name: &str, attributes: Vec<Value>, children: Vec<Value>) -> Value {
    json!({
        "type": "mdxJsxTextElement",
        "name": name,
        "attributes": attributes,
        "children": children
    })
}

pub fn bool_attr(name: &str) -> Value {
    json!({"type": "mdxJsxAttribute", "name": name, "value": null})
}

pub fn string_attr(name: &str, value: &str) -> Value {
    json!({"type": "mdxJsxAttribute", "name": name, "value": value})
}

pub fn expr_attr(name: &str, source: &str, expression: Option<Value>) -> Value {
    let mut value = json!({"type": "mdxJsxAttributeValueExpression", "value": source});
    if let Some(expression) = expression {
        value["data"] = json!({"estree": program(expression)});
    }
    json!({"type": "mdxJsxAttribute", "name": name, "value": value})
}

pub fn spread_attr(source: &str, argument: Option<Value>) -> Value {
    let mut attr = json!({"type": "mdxJsxExpressionAttribute", "value": source});
    if let Some(argument) = argument {
        let spread = json!({
            "type": "ObjectExpression",
            "properties": [{"type": "SpreadElement", "argument": argument}]
        });
        attr["data"] = json!({"estree": program(spread)});
    }
    attr
}
