use log::{debug, info};
use measure_time::debug_time;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::graph::GraphStore;
use crate::persist::{PersistError, Persistence};

/// Default location of the graph file, relative to the working directory.
pub const DEFAULT_DATABASE: &str = "routesdatabase.json";

/// Persists the graph as pretty-printed JSON.
///
/// The file maps each origin to its vehicle classes, each holding the
/// ordered list of outgoing edges:
///
/// ```json
/// {
///   "Porter": {
///     "Bus": [
///       {
///         "source": "Porter",
///         "destination": "Davis",
///         "distance": 2.0,
///         "vehicleType": "Bus",
///         "cost": 4.0,
///         "leastTrafficTime": 7.0
///       }
///     ]
///   }
/// }
/// ```
///
/// Writes go to a sibling temporary file which is then renamed over the
/// original, so a failed write leaves the previous graph intact.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl Default for JsonFile {
    fn default() -> Self {
        JsonFile::new(DEFAULT_DATABASE)
    }
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The exact bytes written for `store`.
    pub fn encode(store: &GraphStore) -> Result<Vec<u8>, PersistError> {
        let mut bytes = serde_json::to_vec_pretty(store).map_err(PersistError::Encode)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = OsString::from(self.path.as_os_str());
        staging.push(".tmp");
        PathBuf::from(staging)
    }

    fn write_error(&self, source: std::io::Error) -> PersistError {
        PersistError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl Persistence for JsonFile {
    fn load(&self) -> Result<Option<GraphStore>, PersistError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    "No graph file at {}, starting with an empty graph",
                    self.path.display()
                );
                return Ok(None);
            }
            Err(source) => {
                return Err(PersistError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            debug!("Graph file {} is empty", self.path.display());
            return Ok(None);
        }

        // A literal `null` is treated like an absent graph.
        let store: Option<GraphStore> =
            serde_json::from_slice(&bytes).map_err(|source| PersistError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        if let Some(store) = &store {
            info!(
                "Loaded {} edges across {} stations from {}",
                store.edge_count(),
                store.stations().len(),
                self.path.display()
            );
        }

        Ok(store)
    }

    fn persist(&self, store: &GraphStore) -> Result<(), PersistError> {
        debug_time!("Persisting graph to {}", self.path.display());

        let bytes = JsonFile::encode(store)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.write_error(err))?;
        }

        let staging = self.staging_path();
        fs::write(&staging, &bytes).map_err(|err| self.write_error(err))?;
        fs::rename(&staging, &self.path).map_err(|err| self.write_error(err))?;

        debug!("Persisted {} edges", store.edge_count());
        Ok(())
    }
}
