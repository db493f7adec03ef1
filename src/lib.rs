#![forbid(unsafe_code)]

//! Reader for macOS `.DS_Store` files.
//!
//! A `.DS_Store` is a `Bud1` buddy-allocated file. Its allocator directory
//! names a `DSDB` master block, which holds the root of a B-tree of records.
//! Each record attaches one typed value, keyed by a four-character struct ID,
//! to a filename in the folder.
//!
//! ```no_run
//! let data = std::fs::read(".DS_Store")?;
//! let store = dsstorust::parse(&data)?;
//! for (filename, properties) in store.records() {
//!     println!("{filename}: {} properties", properties.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod btree;
pub mod buddy;
pub mod cursor;
mod error;
pub mod format;
pub mod raw;
mod value;

pub use ds_types::{FinderDate, FourCc, StructId, TypeCode};
pub use error::{Error, Result};
pub use raw::MasterBlock;
pub use value::Value;

use buddy::Allocator;
use btree::TreeWalker;
use cursor::ByteCursor;
use ds_types::BUD1_MAGIC;
use log::{debug, warn};
use raw::Prelude;
use std::collections::BTreeMap;
use std::fmt;

/// Values for one filename, keyed by struct ID.
pub type Properties = BTreeMap<FourCc, Value>;

/// Every decoded record, by filename.
pub type RecordSet = BTreeMap<String, Properties>;

/// Problems that do not stop a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The file does not start with `Bud1`. Parsing carries on regardless.
    MagicMismatch { found: FourCc },
    /// A record had an unknown type tag and was dropped.
    SkippedEntry {
        filename: String,
        struct_id: FourCc,
        type_code: FourCc,
    },
    /// The master block's record count disagrees with the records found.
    RecordCountMismatch { expected: u32, found: u64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MagicMismatch { found } => write!(
                f,
                "file magic is '{found}', not '{BUD1_MAGIC}'; this may not be a .DS_Store file"
            ),
            Warning::SkippedEntry {
                filename,
                struct_id,
                type_code,
            } => write!(
                f,
                "skipping record '{struct_id}' for '{filename}': unrecognized data type '{type_code}'"
            ),
            Warning::RecordCountMismatch { expected, found } => write!(
                f,
                "master block lists {expected} records, but the tree holds {found}"
            ),
        }
    }
}

/// A fully decoded `.DS_Store`.
#[derive(Debug, Clone)]
pub struct Store {
    records: RecordSet,
    master: MasterBlock,
    warnings: Vec<Warning>,
}

impl Store {
    /// Decode a complete `.DS_Store` held in memory.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);
        let mut warnings = Vec::new();

        let prelude: Prelude = cursor.read_struct()?;
        if prelude.magic() != BUD1_MAGIC {
            let warning = Warning::MagicMismatch {
                found: prelude.magic(),
            };
            warn!("{warning}");
            warnings.push(warning);
        }

        let allocator = Allocator::new(prelude.allocator_offset);
        let master_id = allocator.find_master_block(&mut cursor)?;
        let address = allocator.resolve(&mut cursor, master_id)?;
        cursor.seek(address.offset);
        let master: MasterBlock = cursor.read_struct()?;
        debug!("master block {master_id}: {master:?}");

        let mut walker = TreeWalker::new(&mut cursor, allocator, master.levels);
        walker.walk(master.root_node)?;
        let walked = walker.finish();
        warnings.extend(walked.warnings);

        if walked.entries_seen != u64::from(master.record_count) {
            let warning = Warning::RecordCountMismatch {
                expected: master.record_count,
                found: walked.entries_seen,
            };
            warn!("{warning}");
            warnings.push(warning);
        }

        Ok(Self {
            records: walked.records,
            master,
            warnings,
        })
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn into_records(self) -> RecordSet {
        self.records
    }

    /// Look up a single value.
    pub fn get(&self, filename: &str, struct_id: FourCc) -> Option<&Value> {
        self.records.get(filename)?.get(&struct_id)
    }

    pub fn master_block(&self) -> &MasterBlock {
        &self.master
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Number of records dropped for carrying an unknown type tag.
    pub fn skipped_entries(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, Warning::SkippedEntry { .. }))
            .count()
    }
}

/// Decode a complete `.DS_Store` held in memory. Same as [`Store::parse`].
pub fn parse(data: &[u8]) -> Result<Store> {
    Store::parse(data)
}
