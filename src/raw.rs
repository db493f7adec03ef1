//! Unvalidated on-disk structures, decoded as they appear in the file. All
//! integers are big-endian. Callers decide what a field's value means.

use deku::prelude::*;
use ds_types::{ALIGNMENT_PREFIX, BLOCK_SIZE_MASK, FourCc};

/// First twelve bytes of the file.
#[derive(Debug, PartialEq, DekuRead)]
#[deku(endian = "big")]
pub struct Prelude {
    /// Usually `1`. Not part of the addressed data; every stored offset
    /// skips these four bytes.
    pub alignment: u32,
    /// Expected to be [`ds_types::BUD1_MAGIC`].
    pub magic: [u8; 4],
    /// Position of the allocator's own block, relative to the end of the
    /// alignment word.
    pub allocator_offset: u32,
}

impl Prelude {
    pub fn magic(&self) -> FourCc {
        FourCc(self.magic)
    }
}

/// A named block reference in the allocator directory.
#[derive(Debug, PartialEq, DekuRead)]
#[deku(endian = "big")]
pub struct DirectoryEntry {
    pub name_length: u8,
    #[deku(count = "name_length")]
    pub name: Vec<u8>,
    pub block_id: u32,
}

/// Header of the Desktop Services (`DSDB`) block.
#[derive(Debug, Clone, PartialEq, Eq, DekuRead)]
#[deku(endian = "big")]
pub struct MasterBlock {
    /// Block ID of the B-tree root node.
    pub root_node: u32,
    /// Number of internal levels above the leaves.
    pub levels: u32,
    /// Total records across all nodes.
    pub record_count: u32,
    /// Total nodes in the tree.
    pub node_count: u32,
    /// Always 0x1000.
    pub page_size: u32,
}

/// Start of every B-tree node.
#[derive(Debug, PartialEq, DekuRead)]
#[deku(endian = "big")]
pub struct NodeHeader {
    /// Zero for leaf nodes. For internal nodes, the child holding keys greater
    /// than every record in this node.
    pub rightmost_child: u32,
    pub record_count: u32,
}

impl NodeHeader {
    pub fn is_leaf(&self) -> bool {
        self.rightmost_child == 0
    }
}

/// Location of an allocated block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockAddress {
    /// Absolute position in the file, including the alignment prefix.
    pub offset: u64,
    /// Always a power of two.
    pub size: u64,
}

impl BlockAddress {
    /// Unpack an offset-table word: the upper 27 bits hold the 32-byte aligned
    /// offset, the low 5 bits hold log2 of the size.
    pub fn from_word(word: u32) -> Self {
        Self {
            offset: ALIGNMENT_PREFIX + u64::from((word >> 5) << 5),
            size: 1u64 << (word & BLOCK_SIZE_MASK),
        }
    }
}
