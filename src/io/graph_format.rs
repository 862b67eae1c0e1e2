//! Binary `.vg` format for precomputed visibility graphs.
//!
//! Every value is a little-endian `i32` or `f32`, with no header or version:
//! - vertex count, then `x, y` per slot; a descriptor slot is written as
//!   `x = -inf` with the opposite slot index stored in the bits of `y`
//! - edge list count, then per slot: edge count and `(neighbour, cost)` pairs
//! - wedge list count (0 when wedges were not stored), then per slot: wedge
//!   count and `(x, y, aux)` triples
//! - level mid `x, y` and level bounds `xmin, ymin, xmax, ymax`
//!
//! Per-vertex visibility bounds are not persisted.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{FormatError, Result, VisGraphError};
use crate::graph::{Edge, LevelBounds, VisibilityGraph};
use crate::math::{Bbox, Point2};
use crate::vertices::{Slot, VisVertices};
use crate::visibility::Wedge;

const DESCRIPTOR_X: f32 = f32::NEG_INFINITY;
/// Counts come from untrusted input, so buffers only reserve up to this many
/// entries ahead of reading them.
const MAX_RESERVE: usize = 4096;

/// Writes `graph` to the file at `path`, replacing it.
///
/// # Errors
///
/// Returns [`VisGraphError::Io`] if the file cannot be created or written.
pub fn save_graph(graph: &VisibilityGraph, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_graph(graph, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Reads a graph from the file at `path`.
///
/// # Errors
///
/// Returns [`VisGraphError::Io`] if the file cannot be read, or
/// [`FormatError`] if its contents are not a valid graph.
pub fn load_graph(path: &Path) -> Result<VisibilityGraph> {
    let mut reader = BufReader::new(File::open(path)?);
    read_graph(&mut reader)
}

/// Encodes `graph` into `writer`.
///
/// # Errors
///
/// Returns [`VisGraphError::Io`] if writing fails.
pub fn write_graph<W: Write>(graph: &VisibilityGraph, writer: &mut W) -> Result<()> {
    let vertices = graph.vertices();
    write_count(writer, vertices.len())?;
    for slot in vertices.slots() {
        let (x, y) = match *slot {
            Slot::Vertex(p) => (p.x, p.y),
            Slot::Descriptor { opposite } => {
                (DESCRIPTOR_X, f32::from_bits(descriptor_bits(opposite)))
            }
        };
        write_f32(writer, x)?;
        write_f32(writer, y)?;
    }

    write_count(writer, graph.edge_lists().len())?;
    for edges in graph.edge_lists() {
        write_count(writer, edges.len())?;
        for edge in edges {
            write_count(writer, edge.to)?;
            write_f32(writer, edge.cost)?;
        }
    }

    let wedge_lists = graph.wedge_lists().unwrap_or_default();
    write_count(writer, wedge_lists.len())?;
    for wedges in wedge_lists {
        write_count(writer, wedges.len())?;
        for wedge in wedges {
            write_f32(writer, wedge.intersection.x)?;
            write_f32(writer, wedge.intersection.y)?;
            write_i32(writer, wedge.aux)?;
        }
    }

    let bounds = graph.bounds();
    let bbox = bounds.bbox;
    for value in [bounds.mid.x, bounds.mid.y, bbox.xmin, bbox.ymin, bbox.xmax, bbox.ymax] {
        write_f32(writer, value)?;
    }
    debug!(
        slots = vertices.len(),
        edges = graph.edge_count(),
        wedges = wedge_lists.iter().map(Vec::len).sum::<usize>(),
        "visibility graph written"
    );
    Ok(())
}

/// Decodes a graph from `reader`, validating every index it contains.
///
/// # Errors
///
/// Returns [`FormatError`] on truncated input, negative counts, list counts
/// that disagree with the vertex count, slots that do not form bracketed
/// polygons, or ids outside the vertex range or naming a descriptor. Other
/// read failures are returned as [`VisGraphError::Io`].
pub fn read_graph<R: Read>(reader: &mut R) -> Result<VisibilityGraph> {
    let len = read_count(reader, "vertex")?;
    let mut slots = Vec::with_capacity(len.min(MAX_RESERVE));
    for slot in 0..len {
        let x = read_f32(reader, "vertex")?;
        let y = read_f32(reader, "vertex")?;
        if x == DESCRIPTOR_X {
            let opposite = y.to_bits();
            if opposite as usize >= len {
                return Err(FormatError::DanglingDescriptor { slot, opposite, len }.into());
            }
            slots.push(Slot::Descriptor {
                opposite: opposite as usize,
            });
        } else {
            slots.push(Slot::Vertex(Point2::new(x, y)));
        }
    }
    check_layout(&slots)?;

    let edge_lists = read_count(reader, "edge list")?;
    if edge_lists != len {
        return Err(FormatError::CountMismatch {
            what: "edge list",
            expected: len,
            found: edge_lists,
        }
        .into());
    }
    let mut edges = Vec::with_capacity(len.min(MAX_RESERVE));
    for vertex in 0..len {
        let count = read_count(reader, "edge")?;
        let mut list = Vec::with_capacity(count.min(MAX_RESERVE));
        for _ in 0..count {
            let to = read_id(reader, vertex, len, "edge")?;
            check_vertex_target(&slots, vertex, to)?;
            let cost = read_f32(reader, "edge")?;
            list.push(Edge::new(to, cost));
        }
        edges.push(list);
    }

    let wedge_lists = read_count(reader, "wedge list")?;
    if wedge_lists != 0 && wedge_lists != len {
        return Err(FormatError::CountMismatch {
            what: "wedge list",
            expected: len,
            found: wedge_lists,
        }
        .into());
    }
    let mut wedges = Vec::with_capacity(wedge_lists.min(MAX_RESERVE));
    for vertex in 0..wedge_lists {
        let count = read_count(reader, "wedge")?;
        let mut list = Vec::with_capacity(count.min(MAX_RESERVE));
        for index in 0..count {
            let x = read_f32(reader, "wedge")?;
            let y = read_f32(reader, "wedge")?;
            let aux = read_i32(reader, "wedge")?;
            // The trailing split wedge indexes into its own list.
            let split = index + 1 == count;
            let bound = if split { count } else { len };
            let wedge = Wedge::new(Point2::new(x, y), aux);
            if wedge.closest() >= bound {
                return Err(FormatError::NeighbourOutOfRange {
                    vertex,
                    neighbour: aux,
                    len: bound,
                }
                .into());
            }
            if !split {
                check_vertex_target(&slots, vertex, wedge.closest())?;
            }
            list.push(wedge);
        }
        wedges.push(list);
    }

    let mut level = [0.0; 6];
    for value in &mut level {
        *value = read_f32(reader, "level bounds")?;
    }
    let [mid_x, mid_y, xmin, ymin, xmax, ymax] = level;
    let bounds = LevelBounds {
        mid: Point2::new(mid_x, mid_y),
        bbox: Bbox::new(xmin, ymin, xmax, ymax),
    };

    let graph = VisibilityGraph::from_parts(
        VisVertices::from_slots(slots),
        edges,
        (wedge_lists > 0).then_some(wedges),
        Vec::new(),
        bounds,
    );
    debug!(
        slots = len,
        edges = graph.edge_count(),
        wedges = graph.has_wedges(),
        "visibility graph read"
    );
    Ok(graph)
}

/// Slots must form back-to-back polygons of at least 3 finite vertices, each
/// opened by a descriptor naming its last vertex and closed by one naming its
/// first.
fn check_layout(slots: &[Slot]) -> Result<()> {
    let broken = |slot: usize| -> Result<()> { Err(FormatError::BrokenLayout { slot }.into()) };
    if slots.is_empty() {
        return broken(0);
    }
    let mut head = 0;
    while head < slots.len() {
        let Slot::Descriptor { opposite: last } = slots[head] else {
            return broken(head);
        };
        let foot = last + 1;
        if last < head + 3 || foot >= slots.len() {
            return broken(head);
        }
        let corners = &slots[head + 1..=last];
        if let Some(offset) = corners.iter().position(|slot| {
            !matches!(slot, Slot::Vertex(p) if p.x.is_finite() && p.y.is_finite())
        }) {
            return broken(head + 1 + offset);
        }
        if slots[foot] != (Slot::Descriptor { opposite: head + 1 }) {
            return broken(foot);
        }
        head = foot + 1;
    }
    Ok(())
}

fn check_vertex_target(slots: &[Slot], vertex: usize, neighbour: usize) -> Result<()> {
    match slots[neighbour] {
        Slot::Vertex(_) => Ok(()),
        Slot::Descriptor { .. } => {
            Err(FormatError::DescriptorNeighbour { vertex, neighbour }.into())
        }
    }
}

fn write_i32<W: Write>(writer: &mut W, value: i32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_f32<W: Write>(writer: &mut W, value: f32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn descriptor_bits(opposite: usize) -> u32 {
    opposite as u32
}

/// Counts and ids share the `i32` encoding.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn write_count<W: Write>(writer: &mut W, value: usize) -> Result<()> {
    write_i32(writer, value as i32)
}

fn read_bytes<R: Read>(reader: &mut R, what: &'static str) -> Result<[u8; 4]> {
    let mut bytes = [0; 4];
    reader.read_exact(&mut bytes).map_err(|err| match err.kind() {
        ErrorKind::UnexpectedEof => VisGraphError::from(FormatError::UnexpectedEof(what)),
        _ => VisGraphError::Io(err),
    })?;
    Ok(bytes)
}

fn read_i32<R: Read>(reader: &mut R, what: &'static str) -> Result<i32> {
    read_bytes(reader, what).map(i32::from_le_bytes)
}

fn read_f32<R: Read>(reader: &mut R, what: &'static str) -> Result<f32> {
    read_bytes(reader, what).map(f32::from_le_bytes)
}

fn read_count<R: Read>(reader: &mut R, what: &'static str) -> Result<usize> {
    let value = read_i32(reader, what)?;
    usize::try_from(value).map_err(|_| FormatError::NegativeCount { what, value }.into())
}

fn read_id<R: Read>(
    reader: &mut R,
    vertex: usize,
    len: usize,
    what: &'static str,
) -> Result<usize> {
    let neighbour = read_i32(reader, what)?;
    usize::try_from(neighbour)
        .ok()
        .filter(|&id| id < len)
        .ok_or_else(|| {
            FormatError::NeighbourOutOfRange {
                vertex,
                neighbour,
                len,
            }
            .into()
        })
}
