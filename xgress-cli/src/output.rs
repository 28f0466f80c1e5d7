//! Graph file writer.
//!
//! The file is written atomically: first to a `.tmp` sibling, then renamed
//! over the final path, so an interrupted run never leaves half a graph behind.

use std::path::Path;
use xgress_core::{Result, VisGraph, XgressError};

pub fn write_graph(path: &Path, graph: &VisGraph, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(graph)?
    } else {
        serde_json::to_string(graph)?
    };

    let io_err = |source: std::io::Error| XgressError::Output {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;

    tracing::debug!(path = %path.display(), "Graph written");
    Ok(())
}
