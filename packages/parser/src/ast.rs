use serde::{Deserialize, Serialize};
use std::fmt;

/// Span information for source location tracking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub id: String,
}

impl Span {
    pub fn new(start: usize, end: usize, id: String) -> Self {
        Self { start, end, id }
    }
}

/// Root document node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub nodes: Vec<NodeDecl>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of node declarations, nested ones included
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[NodeDecl]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.nodes)
    }
}

/// Declaration context of a node
///
/// Widgets are addressable and take part in duplicate-id checking across the
/// whole document. Objects are plain composable nodes (columns, renderers, rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Widget,
    Object,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Widget => write!(f, "widget"),
            NodeKind::Object => write!(f, "object"),
        }
    }
}

/// A node declaration: `widget Entry#name { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDecl {
    pub kind: NodeKind,
    pub type_name: String,
    pub id: Option<String>,
    pub properties: Vec<PropertyDecl>,
    pub children: Vec<NodeDecl>,
    pub span: Span,
}

/// A property declaration: `name[key]: type translatable = value;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub name: String,
    /// Key of an indexed (map-valued) property
    pub key: Option<String>,
    #[serde(rename = "type")]
    pub ty: PropertyType,
    #[serde(default)]
    pub translatable: bool,
    /// Raw literal text, quotes stripped and escapes resolved
    pub value: String,
    pub span: Span,
}

impl PropertyDecl {
    /// `name` or `name[key]`, as written
    pub fn qualified_name(&self) -> String {
        match &self.key {
            Some(key) => format!("{}[{}]", self.name, key),
            None => self.name.clone(),
        }
    }
}

/// Declared type tag of a property value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Boolean,
    Integer,
    Float,
    Constant,
    Data,
    Date,
    /// No type given; the literal is taken as a string
    Implicit,
}

impl PropertyType {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "string" => Some(PropertyType::String),
            "boolean" => Some(PropertyType::Boolean),
            "integer" => Some(PropertyType::Integer),
            "float" => Some(PropertyType::Float),
            "constant" => Some(PropertyType::Constant),
            "data" => Some(PropertyType::Data),
            "date" => Some(PropertyType::Date),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::String => "string",
            PropertyType::Boolean => "boolean",
            PropertyType::Integer => "integer",
            PropertyType::Float => "float",
            PropertyType::Constant => "constant",
            PropertyType::Data => "data",
            PropertyType::Date => "date",
            PropertyType::Implicit => "implicit-string",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
