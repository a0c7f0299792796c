pub mod check;
pub mod tree;

pub use check::{check, CheckArgs};
pub use tree::{tree, TreeArgs};

use anyhow::{anyhow, Result};
use std::path::Path;
use trellis_loader::{LoadError, LoadReport, Loader};
use trellis_tree::widgets::CONTAINER;
use trellis_tree::Node;

use crate::config::Config;

/// Loader configured from `trellis.config.json`
pub(crate) fn loader(config: &Config) -> Result<Loader> {
    Ok(Loader::new(config.registry()?).with_options(config.loader_options()))
}

/// Load one document file into a fresh root container
pub(crate) fn load_document(loader: &Loader, path: &Path) -> Result<(Node, LoadReport)> {
    let root = Node::new(&CONTAINER);
    let report = loader
        .load_file(path, &root)
        .map_err(|e| describe_load_error(e, path))?;
    Ok((root, report))
}

/// Parse failures are rendered against the source; everything else as is
fn describe_load_error(error: LoadError, path: &Path) -> anyhow::Error {
    if let LoadError::MalformedDocument { source, .. } = &error {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("unknown");
        if let Ok(text) = std::fs::read_to_string(path) {
            return anyhow!("\n{}", trellis_parser::format_error(&text, file_name, source));
        }
    }
    anyhow!(error)
}
