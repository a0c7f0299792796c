use std::path::PathBuf;
use thiserror::Error;
use trellis_parser::ParseError;

/// Failure reading a document from a [`crate::FileSystem`]
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

pub type CommonResult<T> = Result<T, CommonError>;

