//! Graph export

use crate::error::Result;
use crate::graph::GraphSnapshot;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write a snapshot as pretty-printed `{"nodes": [...], "edges": [...]}`
///
/// The file is created or truncated.
pub fn write_json(snapshot: &GraphSnapshot, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    info!(
        path = %path.display(),
        nodes = snapshot.nodes.len(),
        edges = snapshot.edges.len(),
        "Graph exported"
    );
    Ok(())
}
