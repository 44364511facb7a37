//! Binary snapshot of a built [`Csr`], so large graphs can skip the text
//! parse and counting sort on the next run.
//!
//! Layout (all little endian):
//!
//! ```text
//! magic "CSR1"        4 bytes
//! version             u32
//! orientation         u32   0 = forward, 1 = reverse
//! node_count          u64
//! edge_count          u64
//! row_offsets         [u32; node_count + 1]
//! column_indices      [u32; edge_count]
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::debug;

use crate::csr_adjacency::{Csr, Orientation};
use crate::error::{LoadError, LoadResult};

const MAGIC: &[u8; 4] = b"CSR1";
const VERSION: u32 = 1;

pub fn write_csr<W: Write>(mut writer: W, csr: &Csr) -> std::io::Result<()> {
    // Header: Magic (4) + Version (4) + Orientation (4) + Nodes (8) + Edges (8)
    writer.write_all(MAGIC)?;
    writer.write_u32::<LittleEndian>(VERSION)?;
    writer.write_u32::<LittleEndian>(orientation_tag(csr.orientation()))?;
    writer.write_u64::<LittleEndian>(csr.node_count() as u64)?;
    writer.write_u64::<LittleEndian>(csr.edge_count() as u64)?;

    // Body: the raw arrays
    for &offset in csr.row_offsets() {
        writer.write_u32::<LittleEndian>(offset)?;
    }
    for &value in csr.column_indices() {
        writer.write_u32::<LittleEndian>(value)?;
    }

    writer.flush()
}

pub fn read_csr<R: Read>(mut reader: R) -> LoadResult<Csr> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(LoadError::BadMagic);
    }

    let version = reader.read_u32::<LittleEndian>()?;
    if version != VERSION {
        return Err(LoadError::UnsupportedVersion(version));
    }
    let orientation = match reader.read_u32::<LittleEndian>()? {
        0 => Orientation::Forward,
        1 => Orientation::Reverse,
        tag => return Err(LoadError::UnknownOrientation(tag)),
    };

    let node_count = reader.read_u64::<LittleEndian>()?;
    let edge_count = reader.read_u64::<LittleEndian>()?;
    if node_count > i32::MAX as u64 {
        return Err(LoadError::corrupt(format!("node count {node_count} too large")));
    }
    if edge_count > u32::MAX as u64 {
        return Err(LoadError::corrupt(format!("edge count {edge_count} too large")));
    }

    // Counts come from the file, so the arrays grow as they are read
    // instead of being allocated up front.
    let row_offsets = read_u32s(&mut reader, node_count as usize + 1)?;
    let column_indices = read_u32s(&mut reader, edge_count as usize)?;

    let csr = Csr::from_parts(row_offsets, column_indices, orientation)
        .map_err(LoadError::corrupt)?;
    debug!(
        nodes = csr.node_count(),
        edges = csr.edge_count(),
        "read CSR dump"
    );
    Ok(csr)
}

pub fn save_csr(path: impl AsRef<Path>, csr: &Csr) -> LoadResult<()> {
    let file = File::create(path.as_ref())?;
    write_csr(BufWriter::new(file), csr)?;
    Ok(())
}

pub fn open_csr(path: impl AsRef<Path>) -> LoadResult<Csr> {
    let file = File::open(path.as_ref())?;
    read_csr(BufReader::new(file))
}

fn read_u32s<R: Read>(reader: &mut R, count: usize) -> LoadResult<Vec<u32>> {
    let mut values = Vec::with_capacity(count.min(1 << 20));
    for _ in 0..count {
        values.push(reader.read_u32::<LittleEndian>()?);
    }
    Ok(values)
}

fn orientation_tag(orientation: Orientation) -> u32 {
    match orientation {
        Orientation::Forward => 0,
        Orientation::Reverse => 1,
    }
}
