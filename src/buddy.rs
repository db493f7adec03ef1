//! The buddy allocator: block ID resolution and the directory of named
//! blocks.

use crate::cursor::ByteCursor;
use crate::raw::{BlockAddress, DirectoryEntry};
use crate::{Error, Result};
use ds_types::{ALIGNMENT_PREFIX, ALLOCATOR_HEADER_LENGTH, DIRECTORY_OFFSET, MASTER_BLOCK_NAME};
use log::{debug, trace};

/// Handle on the allocator block, located by the prelude's allocator offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocator {
    offset: u32,
}

impl Allocator {
    pub fn new(offset: u32) -> Self {
        Self { offset }
    }

    /// Absolute position of the allocator block's contents.
    fn base(&self) -> u64 {
        u64::from(self.offset) + ALIGNMENT_PREFIX
    }

    /// Look up a block's address in the offset table.
    ///
    /// The cursor is left where it was, whether or not the lookup succeeds.
    pub fn resolve(&self, cursor: &mut ByteCursor<'_>, block_id: u32) -> Result<BlockAddress> {
        let slot = self.base() + ALLOCATOR_HEADER_LENGTH + u64::from(block_id) * 4;

        let word = cursor.preserving_position(|c| {
            c.seek(slot);
            c.read_u32()
        })?;

        let address = BlockAddress::from_word(word);
        trace!(
            "block {block_id}: word {word:#010x} -> offset {:#x}, size {}",
            address.offset, address.size
        );
        Ok(address)
    }

    /// Scan the directory of named blocks for the Desktop Services master
    /// block, returning its block ID.
    ///
    /// Stops at the first match. A missing entry, or a directory that runs
    /// off the end of the buffer, is [`Error::MasterBlockNotFound`].
    pub fn find_master_block(&self, cursor: &mut ByteCursor<'_>) -> Result<u32> {
        cursor.seek(self.base() + DIRECTORY_OFFSET);
        let count = cursor
            .read_u32()
            .map_err(|_| Error::MasterBlockNotFound)?;
        debug!("allocator directory holds {count} entries");

        for _ in 0..count {
            let entry: DirectoryEntry = cursor
                .read_struct()
                .map_err(|_| Error::MasterBlockNotFound)?;
            trace!(
                "directory entry {:?} -> block {}",
                String::from_utf8_lossy(&entry.name),
                entry.block_id
            );
            if entry.name == MASTER_BLOCK_NAME {
                return Ok(entry.block_id);
            }
        }

        Err(Error::MasterBlockNotFound)
    }
}
