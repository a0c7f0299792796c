use super::{load_document, loader};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::{json, Map, Value};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use trellis_tree::Node;

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Document to load
    pub file: PathBuf,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn tree(args: TreeArgs, cwd: &Path) -> Result<bool> {
    let config = Config::load(cwd)?;
    let loader = loader(&config)?;
    let (root, report) = load_document(&loader, &args.file)?;

    match args.format.as_str() {
        "json" => {
            let nodes: Vec<_> = root.children().iter().map(node_json).collect();
            println!("{}", serde_json::to_string_pretty(&nodes)?);
        }
        "text" => {
            let mut out = String::new();
            for node in root.children() {
                render(&node, 0, &mut out);
            }
            print!("{}", out);
            for diagnostic in &report.diagnostics {
                eprintln!("{}", diagnostic.to_string().yellow());
            }
        }
        other => return Err(anyhow::anyhow!("Unknown format: {} (expected text or json)", other)),
    }
    Ok(true)
}

/// Indented outline: the node, its properties and bindings, then its
/// prototype and children
fn render(node: &Node, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let hidden = if node.is_visible() { "" } else { " (hidden)" };
    let _ = writeln!(out, "{}{}{}", indent, node.describe(), hidden);

    let classes = node.classes();
    if !classes.is_empty() {
        let _ = writeln!(out, "{}  .{}", indent, classes.join(" ."));
    }
    for (name, value) in node.properties() {
        let _ = writeln!(out, "{}  {} = {}", indent, name, value);
    }
    for binding in node.bindings() {
        let property = match &binding.key {
            Some(key) => format!("{}[{}]", binding.property, key),
            None => binding.property.clone(),
        };
        let _ = writeln!(out, "{}  {} <- data {}", indent, property, binding.field);
    }
    if let Some(prototype) = node.prototype() {
        let _ = writeln!(out, "{}  prototype:", indent);
        render(&prototype, depth + 2, out);
    }
    for child in node.children() {
        render(&child, depth + 1, out);
    }
}

fn node_json(node: &Node) -> Value {
    let mut object = Map::new();
    object.insert("type".into(), json!(node.type_name()));
    if let Some(id) = node.id() {
        object.insert("id".into(), json!(id));
    }
    if !node.is_visible() {
        object.insert("visible".into(), json!(false));
    }
    let classes = node.classes();
    if !classes.is_empty() {
        object.insert("classes".into(), json!(classes));
    }

    let properties: Map<String, Value> = node
        .properties()
        .into_iter()
        .map(|(name, value)| (name, value.to_json()))
        .collect();
    if !properties.is_empty() {
        object.insert("properties".into(), Value::Object(properties));
    }

    let bindings: Vec<_> = node
        .bindings()
        .iter()
        .map(|b| json!({ "property": b.property, "key": b.key, "field": b.field }))
        .collect();
    if !bindings.is_empty() {
        object.insert("bindings".into(), Value::Array(bindings));
    }
    if let Some(prototype) = node.prototype() {
        object.insert("prototype".into(), node_json(&prototype));
    }

    let children: Vec<_> = node.children().iter().map(node_json).collect();
    if !children.is_empty() {
        object.insert("children".into(), Value::Array(children));
    }
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_loader::Loader;
    use trellis_tree::widgets::CONTAINER;

    fn load(source: &str) -> Node {
        let root = Node::new(&CONTAINER);
        Loader::standard().load_str(source, &root).unwrap();
        root
    }

    const SOURCE: &str = r#"
        widget Form#f {
            widget Entry#name { maxlength: integer = 20; }
            widget TableView#t {
                object TableViewColumn#c {
                    object TextCellRenderer { text: data = "title"; }
                    object InputCell { widget Entry#qty { } }
                }
            }
        }
    "#;

    #[test]
    fn test_render_outline() {
        let root = load(SOURCE);
        let mut out = String::new();
        for node in root.children() {
            render(&node, 0, &mut out);
        }
        let expected = "\
Form#f
  Entry#name
    maxlength = 20
  TableView#t
    TableViewColumn#c
      TextCellRenderer
        text <- data title
      InputCell
        prototype:
          Entry#qty
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_json_shape() {
        let root = load(SOURCE);
        let form = node_json(&root.children()[0]);
        assert_eq!(form["type"], "Form");
        assert_eq!(form["children"][0]["properties"]["maxlength"], 20);
        let cell = &form["children"][1]["children"][0]["children"][1];
        assert_eq!(cell["type"], "InputCell");
        assert_eq!(cell["prototype"]["id"], "qty");
        assert!(cell.get("children").is_none());
    }
}
