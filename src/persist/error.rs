use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("could not read graph file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("could not write graph file {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("graph file {} is malformed: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("could not encode graph: {0}")]
    Encode(serde_json::Error),
}
