use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::csr_adjacency::Edge;
use crate::error::{LoadError, LoadResult};

/// Edges read from a text file, plus the largest id seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeList {
    pub edges: Vec<Edge>,
    pub max_id: Option<i32>,
}

impl EdgeList {
    /// Smallest node count that covers every id in the list (0 when empty).
    /// Negative ids do not count; the validator reports them.
    pub fn inferred_node_count(&self) -> i32 {
        match self.max_id {
            Some(max) if max >= 0 => max.saturating_add(1),
            _ => 0,
        }
    }
}

/// Reads `source target` pairs, one per line.
///
/// Columns may be separated by tabs or spaces and anything after the
/// second column is ignored. Blank lines and lines starting with `#` or
/// `%` are skipped.
pub fn read_edges<R: BufRead>(reader: R) -> LoadResult<EdgeList> {
    let mut list = EdgeList::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('%') {
            continue;
        }

        let edge = parse_edge(trimmed).ok_or_else(|| LoadError::Parse {
            line: index + 1,
            content: line.clone(),
        })?;
        let larger = edge.source.max(edge.target);
        list.max_id = Some(list.max_id.map_or(larger, |m| m.max(larger)));
        list.edges.push(edge);
    }

    debug!(edges = list.edges.len(), max_id = ?list.max_id, "read edge list");
    Ok(list)
}

/// Opens `path` and reads it with [`read_edges`].
pub fn load_edges(path: impl AsRef<Path>) -> LoadResult<EdgeList> {
    let file = File::open(path.as_ref())?;
    read_edges(BufReader::new(file))
}

fn parse_edge(line: &str) -> Option<Edge> {
    let mut parts = line.split_whitespace();
    let source = parts.next()?.parse::<i32>().ok()?;
    let target = parts.next()?.parse::<i32>().ok()?;
    Some(Edge { source, target })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_tab_and_space_separated() {
        let input = "0\t1\n0 2\n2   3  extra\n";
        let list = read_edges(Cursor::new(input)).unwrap();
        assert_eq!(
            list.edges,
            vec![Edge::new(0, 1), Edge::new(0, 2), Edge::new(2, 3)]
        );
        assert_eq!(list.max_id, Some(3));
        assert_eq!(list.inferred_node_count(), 4);
    }

    #[test]
    fn test_skips_comments_and_blank_lines() {
        let input = "# header\n% matrix market style\n\n  \n5\t4\n";
        let list = read_edges(Cursor::new(input)).unwrap();
        assert_eq!(list.edges, vec![Edge::new(5, 4)]);
        assert_eq!(list.inferred_node_count(), 6);
    }

    #[test]
    fn test_empty_input() {
        let list = read_edges(Cursor::new("")).unwrap();
        assert!(list.edges.is_empty());
        assert_eq!(list.max_id, None);
        assert_eq!(list.inferred_node_count(), 0);
    }

    #[test]
    fn test_negative_ids_are_kept() {
        let list = read_edges(Cursor::new("0 -1\n")).unwrap();
        assert_eq!(list.edges, vec![Edge::new(0, -1)]);
        assert_eq!(list.inferred_node_count(), 1);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let input = "0 1\n# fine\n2 x\n";
        match read_edges(Cursor::new(input)) {
            Err(LoadError::Parse { line, content }) => {
                assert_eq!(line, 3);
                assert_eq!(content, "2 x");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_single_column_is_malformed() {
        let err = read_edges(Cursor::new("7\n")).unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1\t0").unwrap();
        writeln!(file, "1\t2").unwrap();
        let list = load_edges(file.path()).unwrap();
        assert_eq!(list.edges.len(), 2);
        assert_eq!(list.inferred_node_count(), 3);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_edges("/definitely/not/here.tsv").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
