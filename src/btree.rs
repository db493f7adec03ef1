//! Depth-first traversal of the Desktop Services B-tree.

use crate::buddy::Allocator;
use crate::cursor::ByteCursor;
use crate::raw::NodeHeader;
use crate::value::{Value, read_utf16_be};
use crate::{Error, RecordSet, Result, Warning};
use ds_types::FourCc;
use log::{debug, trace, warn};
use std::collections::HashSet;

/// Deepest tree accepted regardless of what the master block claims. Finder
/// never writes more than a handful of levels.
pub const MAX_TREE_DEPTH: u32 = 32;

/// Walks nodes by block ID, collecting every record into a [`RecordSet`].
///
/// Records are read in storage order: a node's own records first, then its
/// children left to right, then the rightmost child. Nodes more than
/// `max_depth` levels below the root are rejected.
pub struct TreeWalker<'c, 'a> {
    cursor: &'c mut ByteCursor<'a>,
    allocator: Allocator,
    max_depth: u32,
    records: RecordSet,
    warnings: Vec<Warning>,
    visited: HashSet<u32>,
    entries_seen: u64,
}

/// Everything a finished traversal produced.
#[derive(Debug, Default)]
pub struct Walked {
    pub records: RecordSet,
    pub warnings: Vec<Warning>,
    /// Records encountered, including skipped ones.
    pub entries_seen: u64,
}

impl<'c, 'a> TreeWalker<'c, 'a> {
    pub fn new(cursor: &'c mut ByteCursor<'a>, allocator: Allocator, max_depth: u32) -> Self {
        Self {
            cursor,
            allocator,
            max_depth: max_depth.min(MAX_TREE_DEPTH),
            records: RecordSet::new(),
            warnings: Vec::new(),
            visited: HashSet::new(),
            entries_seen: 0,
        }
    }

    /// Read the node stored in block `node_id` and everything below it.
    pub fn walk(&mut self, node_id: u32) -> Result<()> {
        self.walk_at(node_id, 0)
    }

    fn walk_at(&mut self, node_id: u32, depth: u32) -> Result<()> {
        if !self.visited.insert(node_id) {
            return Err(Error::NodeRevisited { node: node_id });
        }
        if depth > self.max_depth {
            return Err(Error::TreeTooDeep {
                node: node_id,
                limit: self.max_depth,
            });
        }

        let address = self.allocator.resolve(self.cursor, node_id)?;
        self.cursor.seek(address.offset);

        let header: NodeHeader = self.cursor.read_struct()?;
        debug!(
            "node {node_id} at {:#x}: {} records, {}",
            address.offset,
            header.record_count,
            if header.is_leaf() { "leaf" } else { "internal" }
        );

        let mut children = Vec::new();
        for _ in 0..header.record_count {
            if !header.is_leaf() {
                children.push(self.cursor.read_u32()?);
            }
            self.read_entry()?;
        }

        for child in children {
            self.walk_at(child, depth + 1)?;
        }
        if !header.is_leaf() {
            self.walk_at(header.rightmost_child, depth + 1)?;
        }

        Ok(())
    }

    /// Read one record. An unknown type tag drops the record with a warning;
    /// reading resumes right after the tag, as the value's width is unknown.
    fn read_entry(&mut self) -> Result<()> {
        let name_length = self.cursor.read_u32()?;
        let filename = read_utf16_be(self.cursor, name_length)?;
        let struct_id = FourCc(self.cursor.read_array()?);
        let type_code = FourCc(self.cursor.read_array()?);
        self.entries_seen += 1;

        match Value::read(self.cursor, type_code) {
            Ok(value) => {
                trace!("{filename:?} {struct_id} {type_code}: {value}");
                self.records
                    .entry(filename)
                    .or_default()
                    .insert(struct_id, value);
            }
            Err(Error::UnrecognizedType(type_code)) => {
                let warning = Warning::SkippedEntry {
                    filename,
                    struct_id,
                    type_code,
                };
                warn!("{warning}");
                self.warnings.push(warning);
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }

    pub fn finish(self) -> Walked {
        Walked {
            records: self.records,
            warnings: self.warnings,
            entries_seen: self.entries_seen,
        }
    }
}
