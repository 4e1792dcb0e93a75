use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A tileset image could not be read or decoded.
#[derive(Debug, Error)]
#[error("failed to load tileset image {}: {source}", path.display())]
pub struct AssetLoadError {
    pub path: PathBuf,
    #[source]
    pub source: anyhow::Error,
}

/// Error type for map loading.
#[derive(Debug, Error)]
pub enum MapError {
    /// File I/O error
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// JSON parse error
    #[error("JSON parse error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Unsupported file format (non-JSON)
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    /// Structurally invalid map
    #[error("Invalid map: {0}")]
    InvalidMap(String),
    /// A layer's data length does not match the map dimensions
    #[error("Invalid layer size for layer '{layer}': expected {expected} cells, got {actual}")]
    InvalidLayerSize {
        layer: String,
        expected: usize,
        actual: usize,
    },
    /// A tile layer references a GID past the last tileset
    #[error("Layer '{layer}' references gid {gid}, but the last known gid is {max_gid}")]
    InvalidTileGid { layer: String, gid: u32, max_gid: u32 },
    /// An object references a GID past the last tileset
    #[error(
        "Object {object_id} in layer '{layer}' references gid {gid}, \
         but the last known gid is {max_gid}"
    )]
    InvalidObjectGid {
        layer: String,
        object_id: u32,
        gid: u32,
        max_gid: u32,
    },
    /// A tileset image failed to load while building the atlas
    #[error(transparent)]
    AssetLoad(#[from] AssetLoadError),
}
