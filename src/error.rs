use ds_types::FourCc;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures while decoding a `.DS_Store` buffer.
///
/// Only [`Error::UnrecognizedType`] is scoped to a single record; the tree
/// walker turns it into a [`crate::Warning`]. Everything else aborts the parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A read would run past the end of the buffer.
    #[error("truncated input: read past end of buffer at offset {offset:#x}")]
    Truncated { offset: u64 },

    /// The allocator directory has no `DSDB` entry.
    #[error("could not find 'DSDB' master block in the allocator directory")]
    MasterBlockNotFound,

    /// A record carries a type tag outside the known set.
    #[error("unrecognized data type '{0}'")]
    UnrecognizedType(FourCc),

    /// A B-tree node was reached twice, so the tree references itself.
    #[error("B-tree node {node} visited twice")]
    NodeRevisited { node: u32 },

    /// A node lies deeper below the root than the tree can be.
    #[error("B-tree node {node} is more than {limit} levels below the root")]
    TreeTooDeep { node: u32, limit: u32 },

    /// A fixed-layout structure failed to decode for a reason other than
    /// running out of input.
    #[error("malformed structure: {0}")]
    Layout(String),
}
