use crate::error::{CommonError, CommonResult};
use crate::filesystem::FileSystem;
use std::path::Path;
use trellis_parser::ast::Document;
use trellis_parser::parse_with_path;

/// Read and parse a document through the given file system
pub fn read_document(fs: &dyn FileSystem, path: &Path) -> CommonResult<Document> {
    let source = fs.read_to_string(path).map_err(|source| CommonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_with_path(&source, &path.display().to_string()).map_err(|source| CommonError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
