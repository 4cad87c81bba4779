//! Turning a verb tree into a document for the telephony platform.

use serde_json::{Map, Number, Value};
use switchboard_types::{ActionNode, AttrValue};

use crate::tree::VerbTree;

/// Converts a finished verb tree into an output document.
///
/// Implementations must keep sibling and child order exactly as built.
pub trait Renderer {
    type Output;

    fn render(&self, tree: &VerbTree) -> Self::Output;
}

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Renders TwiML: one `<Response>` element holding an element per action.
///
/// Leaf actions carry their payload as element text. Container actions
/// render their children and ignore any payload. Attribute keys written in
/// snake_case are emitted in camelCase (`finish_on_key` → `finishOnKey`).
#[derive(Debug, Clone, Copy, Default)]
pub struct TwimlRenderer;

impl Renderer for TwimlRenderer {
    type Output = String;

    fn render(&self, tree: &VerbTree) -> String {
        let mut out = String::from(XML_DECLARATION);
        if tree.is_empty() {
            out.push_str("<Response/>");
            return out;
        }
        out.push_str("<Response>");
        for node in tree {
            write_element(&mut out, node);
        }
        out.push_str("</Response>");
        out
    }
}

fn write_element(out: &mut String, node: &ActionNode) {
    let name = node.kind.element_name();
    out.push('<');
    out.push_str(name);
    for (key, value) in &node.attributes {
        out.push(' ');
        out.push_str(&camel_case(key));
        out.push_str("=\"");
        escape_into(out, &value.to_string());
        out.push('"');
    }

    if node.kind.is_container() {
        if node.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &node.children {
            write_element(out, child);
        }
    } else {
        match &node.payload {
            Some(payload) => {
                out.push('>');
                escape_into(out, payload);
            }
            None => {
                out.push_str("/>");
                return;
            }
        }
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
}

/// Renders the verb tree as a JSON array of action objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    type Output = Value;

    fn render(&self, tree: &VerbTree) -> Value {
        Value::Array(tree.iter().map(node_value).collect())
    }
}

fn node_value(node: &ActionNode) -> Value {
    let mut object = Map::new();
    object.insert(
        "verb".to_string(),
        Value::String(node.kind.element_name().to_string()),
    );
    if let Some(payload) = &node.payload {
        object.insert("text".to_string(), Value::String(payload.clone()));
    }
    if !node.attributes.is_empty() {
        let attributes = node
            .attributes
            .iter()
            .map(|(key, value)| (key.clone(), attr_value(value)))
            .collect();
        object.insert("attributes".to_string(), Value::Object(attributes));
    }
    if !node.children.is_empty() {
        object.insert(
            "nested".to_string(),
            Value::Array(node.children.iter().map(node_value).collect()),
        );
    }
    Value::Object(object)
}

fn attr_value(value: &AttrValue) -> Value {
    match value {
        AttrValue::Bool(value) => Value::Bool(*value),
        AttrValue::Int(value) => Value::Number((*value).into()),
        AttrValue::Float(value) => Number::from_f64(*value).map_or(Value::Null, Value::Number),
        AttrValue::Text(value) => Value::String(value.clone()),
    }
}
