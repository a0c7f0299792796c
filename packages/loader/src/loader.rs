//! Tree loader
//!
//! Turns a parsed [`Document`] into nodes attached under a target node.
//!
//! A [`Loader`] holds what stays fixed between loads (type registry,
//! translator, options, file system). A [`Ui`] is one load session: it indexes
//! every widget by id, hands out generated ids and collects diagnostics. Widget
//! ids are unique per session, so loading a second document into the same
//! session cannot reuse an id.
//!
//! Every failure is fatal to the load: nothing is attached to the target and
//! the session forgets the ids of the failed document. The only soft outcome
//! is a [`Diagnostic`] for implicit-string literals that look typed.

use crate::diagnostic::Diagnostic;
use crate::error::{LoadError, LoadResult};
use crate::expression::{evaluate, TypeScope};
use crate::property::{fit, implicit_shape, parse_literal, LiteralShape};
use crate::registry::Registry;
use crate::translator::{IdentityTranslator, Translator};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, instrument, warn};
use trellis_common::{read_document, CommonError, FileSystem, RealFileSystem, Visitor};
use trellis_parser::ast::{Document, NodeDecl, NodeKind, PropertyDecl, PropertyType};
use trellis_parser::parse;
use trellis_tree::{AcceptsChildren, AddressableWidget, Capabilities, Node, PropertyBinding, PropertyValue, TreeError, TreeResult};

#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Treat typed-looking implicit strings as errors instead of diagnostics
    pub strict_implicit_strings: bool,
}

pub struct Loader {
    registry: Registry,
    translator: Box<dyn Translator>,
    options: LoaderOptions,
    fs: Box<dyn FileSystem>,
}

impl Loader {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            translator: Box::new(IdentityTranslator),
            options: LoaderOptions::default(),
            fs: Box::new(RealFileSystem),
        }
    }

    /// A loader over the standard component library
    pub fn standard() -> Self {
        Self::new(Registry::with_standard_library())
    }

    pub fn with_options(mut self, options: LoaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Box::new(translator);
        self
    }

    pub fn with_file_system(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Box::new(fs);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Start a load session
    pub fn session(&self) -> Ui<'_> {
        Ui {
            loader: self,
            widgets: IndexMap::new(),
            reserved: HashSet::new(),
            counters: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Load one document in a fresh session
    pub fn load(&self, document: &Document, target: &Node) -> LoadResult<LoadReport> {
        let mut ui = self.session();
        ui.load(document, target)?;
        Ok(ui.into_report())
    }

    pub fn load_str(&self, source: &str, target: &Node) -> LoadResult<LoadReport> {
        let mut ui = self.session();
        ui.load_str(source, target)?;
        Ok(ui.into_report())
    }

    pub fn load_file(&self, path: &Path, target: &Node) -> LoadResult<LoadReport> {
        let mut ui = self.session();
        ui.load_file(path, target)?;
        Ok(ui.into_report())
    }
}

/// Outcome of a finished session
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Every widget with an id, in document order
    pub widgets: IndexMap<String, Node>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadReport {
    pub fn widget(&self, id: &str) -> TreeResult<Node> {
        self.widgets
            .get(id)
            .cloned()
            .ok_or_else(|| TreeError::WidgetNotFound { id: id.to_string() })
    }
}

/// A load session
pub struct Ui<'l> {
    loader: &'l Loader,
    widgets: IndexMap<String, Node>,
    /// Every id declared so far, widgets and objects, so generated ids avoid them
    reserved: HashSet<String>,
    counters: HashMap<&'static str, usize>,
    diagnostics: Vec<Diagnostic>,
}

/// Session state to restore when a load fails
struct Checkpoint {
    widgets: usize,
    reserved: HashSet<String>,
    counters: HashMap<&'static str, usize>,
    diagnostics: usize,
}

/// Collects declared ids ahead of building, so duplicates fail before any node
/// is created
#[derive(Default)]
struct IdScan {
    widget_ids: Vec<(String, String)>,
    all_ids: Vec<String>,
}

impl Visitor for IdScan {
    fn visit_node(&mut self, node: &NodeDecl) {
        if let Some(id) = &node.id {
            self.all_ids.push(id.clone());
            if node.kind == NodeKind::Widget {
                self.widget_ids.push((id.clone(), describe(node)));
            }
        }
        trellis_common::walk_node(self, node);
    }
}

fn describe(decl: &NodeDecl) -> String {
    match &decl.id {
        Some(id) => format!("{}#{}", decl.type_name, id),
        None => decl.type_name.clone(),
    }
}

impl<'l> Ui<'l> {
    #[instrument(skip_all, fields(nodes = document.node_count(), target = %target.describe()))]
    pub fn load(&mut self, document: &Document, target: &Node) -> LoadResult<()> {
        info!("Loading document");

        let mut scan = IdScan::default();
        scan.visit_document(document);

        let mut seen = HashSet::new();
        for (id, element) in &scan.widget_ids {
            if self.widgets.contains_key(id) || !seen.insert(id.as_str()) {
                return Err(LoadError::DuplicateId {
                    id: id.clone(),
                    element: element.clone(),
                });
            }
        }

        let checkpoint = self.checkpoint();
        self.reserved.extend(scan.all_ids);
        if let Err(e) = self.build_into(document, target) {
            warn!(error = %e, "Load failed, rolling back");
            self.rollback(checkpoint);
            return Err(e);
        }

        info!(widgets = self.widgets.len(), diagnostics = self.diagnostics.len(), "Document loaded");
        Ok(())
    }

    /// Build every top-level node, then attach them all. A failed attach
    /// detaches the nodes attached before it, so `target` is left untouched.
    fn build_into(&mut self, document: &Document, target: &Node) -> LoadResult<()> {
        let nodes = document
            .nodes
            .iter()
            .map(|decl| self.build(decl))
            .collect::<LoadResult<Vec<_>>>()?;

        let mut attached: Vec<Node> = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let Err(e) = attach(target, node.clone()) {
                for node in attached.iter().rev() {
                    node.detach();
                }
                return Err(e);
            }
            attached.push(node);
        }
        Ok(())
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            widgets: self.widgets.len(),
            reserved: self.reserved.clone(),
            counters: self.counters.clone(),
            diagnostics: self.diagnostics.len(),
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.widgets.truncate(checkpoint.widgets);
        self.reserved = checkpoint.reserved;
        self.counters = checkpoint.counters;
        self.diagnostics.truncate(checkpoint.diagnostics);
    }

    pub fn load_str(&mut self, source: &str, target: &Node) -> LoadResult<()> {
        let document = parse(source).map_err(|source| LoadError::MalformedDocument {
            path: "<string>".to_string(),
            source,
        })?;
        self.load(&document, target)
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load_file(&mut self, path: &Path, target: &Node) -> LoadResult<()> {
        let fs = self.loader.fs.as_ref();
        if !fs.exists(path) {
            return Err(LoadError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let document = read_document(fs, path).map_err(|e| match e {
            CommonError::Parse { source, .. } => LoadError::MalformedDocument {
                path: path.display().to_string(),
                source,
            },
            CommonError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                LoadError::FileNotFound {
                    path: path.to_path_buf(),
                }
            }
            CommonError::Io { source, .. } => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        self.load(&document, target)
    }

    /// Look up a widget loaded in this session
    pub fn widget(&self, id: &str) -> TreeResult<Node> {
        self.widgets
            .get(id)
            .cloned()
            .ok_or_else(|| TreeError::WidgetNotFound { id: id.to_string() })
    }

    pub fn widgets(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.widgets.iter().map(|(id, node)| (id.as_str(), node))
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_report(self) -> LoadReport {
        LoadReport {
            widgets: self.widgets,
            diagnostics: self.diagnostics,
        }
    }

    /// `<lowercased type><n>`, skipping ids already in use
    fn generate_id(&mut self, type_name: &'static str) -> String {
        let counter = self.counters.entry(type_name).or_insert(0);
        loop {
            *counter += 1;
            let id = format!("{}{}", type_name.to_lowercase(), counter);
            if !self.reserved.contains(&id) {
                self.reserved.insert(id.clone());
                return id;
            }
        }
    }

    fn build(&mut self, decl: &NodeDecl) -> LoadResult<Node> {
        let element = describe(decl);
        let spec = self
            .loader
            .registry
            .resolve(&decl.type_name)
            .ok_or_else(|| LoadError::UnknownType {
                type_name: decl.type_name.clone(),
                element: element.clone(),
            })?;

        let is_widget = spec.has(Capabilities::WIDGET);
        if is_widget != (decl.kind == NodeKind::Widget) {
            return Err(LoadError::WrongNodeKind {
                element,
                kind: decl.kind,
                type_name: decl.type_name.clone(),
            });
        }

        let id = match &decl.id {
            Some(id) => Some(id.clone()),
            None if spec.has(Capabilities::AUTO_ID) => Some(self.generate_id(spec.name)),
            None => None,
        };

        let node = Node::new(spec);
        if let Some(id) = id {
            node.set_id(id)?;
        }
        if let Some(id) = node.as_widget().and_then(|widget| widget.widget_id()) {
            self.widgets.insert(id, node.clone());
        }
        debug!(element = %node.describe(), "Building node");

        for property in &decl.properties {
            self.apply_property(&node, property)?;
        }

        for child in &decl.children {
            let child = self.build(child)?;
            attach(&node, child)?;
        }

        Ok(node)
    }

    fn apply_property(&mut self, node: &Node, decl: &PropertyDecl) -> LoadResult<()> {
        let element = node.describe();
        let name = decl.qualified_name();
        let invalid_name = |reason: Option<&str>| LoadError::InvalidPropertyName {
            element: element.clone(),
            property: name.clone(),
            reason: reason.map(str::to_string),
        };
        let invalid_type = |reason: String| LoadError::InvalidPropertyType {
            element: element.clone(),
            property: name.clone(),
            ty: decl.ty,
            reason,
        };

        let spec = node.spec().property(&decl.name).ok_or_else(|| invalid_name(None))?;
        match (&decl.key, spec.indexed) {
            (Some(_), false) => return Err(invalid_name(Some("not an indexed property"))),
            (None, true) => return Err(invalid_name(Some("indexed property needs a key"))),
            _ => {}
        }

        let value = match decl.ty {
            PropertyType::Data => {
                let binding = PropertyBinding {
                    property: decl.name.clone(),
                    key: decl.key.clone(),
                    field: decl.value.clone(),
                };
                debug!(element = %element, property = %name, field = %decl.value, "Recording data binding");
                node.bind(binding)?;
                return Ok(());
            }
            PropertyType::Constant => {
                let scope = TypeScope {
                    spec: node.spec(),
                    registry: &self.loader.registry,
                };
                let result = evaluate(&decl.value, &scope).map_err(|source| LoadError::Expression {
                    element: element.clone(),
                    property: name.clone(),
                    source,
                })?;
                fit(PropertyValue::Integer(result), spec.kind).map_err(invalid_type)?
            }
            PropertyType::Implicit => {
                self.check_implicit(&element, &name, &decl.value)?;
                parse_literal(decl.ty, &decl.value, spec.kind).map_err(invalid_type)?
            }
            ty => parse_literal(ty, &decl.value, spec.kind).map_err(invalid_type)?,
        };

        let value = if decl.translatable {
            match value {
                PropertyValue::String(text) => PropertyValue::String(self.loader.translator.translate(&text)),
                _ => return Err(invalid_type("only string values are translatable".to_string())),
            }
        } else {
            value
        };
        if let Some((min, max)) = spec.out_of_range(&value) {
            return Err(invalid_type(format!("{} is outside {}..={}", value, min, max)));
        }

        match &decl.key {
            Some(key) => node.set_indexed_property(&decl.name, key, value)?,
            None => node.set_property(&decl.name, value)?,
        }
        Ok(())
    }

    fn check_implicit(&mut self, element: &str, property: &str, literal: &str) -> LoadResult<()> {
        let Some(shape) = implicit_shape(literal) else {
            return Ok(());
        };
        let suggested = match shape {
            LiteralShape::Boolean => "boolean",
            LiteralShape::Number => "integer or float",
        };
        let message = format!(
            "'{}' has no declared type but looks like a {}; declare the type explicitly",
            literal, suggested
        );

        if self.loader.options.strict_implicit_strings {
            return Err(LoadError::InvalidPropertyType {
                element: element.to_string(),
                property: property.to_string(),
                ty: PropertyType::Implicit,
                reason: message,
            });
        }

        warn!(element = %element, property = %property, literal = %literal, "Implicit string looks typed");
        self.diagnostics.push(
            Diagnostic::warning(message)
                .with_element(element)
                .with_property(property),
        );
        Ok(())
    }
}

fn attach(parent: &Node, child: Node) -> LoadResult<()> {
    let Some(parent_view) = parent.as_parent() else {
        return Err(LoadError::DoesNotImplementParent {
            parent: parent.describe(),
            child: child.describe(),
        });
    };
    parent_view.add_child(child)?;
    Ok(())
}
