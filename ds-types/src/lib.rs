// SPDX-License-Identifier: MIT

//! Types and constants for the `Bud1` buddy-allocator file that macOS Finder
//! writes as `.DS_Store`, adjusted to use Rust-friendly naming.
//!
//! Layout described in Mark Mentovai's and Wim Lewis' notes on the format
//! (`Mac::Finder::DSStore`, "DSStoreFormat").

#![forbid(dead_code, unsafe_code, unused)]

use std::fmt;

/// A four-character code, as used throughout Apple's file formats for
/// signatures, record identifiers and type tags.
///
/// Stored as raw bytes. Codes seen in the wild are ASCII, but nothing in the
/// format enforces that.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    pub const fn new(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

impl From<[u8; 4]> for FourCc {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl From<u32> for FourCc {
    fn from(code: u32) -> Self {
        Self(code.to_be_bytes())
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc({:?})", String::from_utf8_lossy(&self.0))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FourCc {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// region Buddy allocator

/// File signature following the alignment word.
pub const BUD1_MAGIC: FourCc = FourCc::new(b"Bud1");

/// Name of the directory entry pointing at the Desktop Services master block.
pub const MASTER_BLOCK_NAME: &[u8] = b"DSDB";

/// Every offset stored in the file is relative to the end of the leading
/// 4-byte alignment word.
pub const ALIGNMENT_PREFIX: u64 = 4;

/// Block count and an unknown (always zero) word precede the offset table in
/// the allocator's own block.
pub const ALLOCATOR_HEADER_LENGTH: u64 = 8;

/// The offset table always reserves 256 slots, whatever the block count.
pub const ALLOCATOR_TABLE_SLOTS: u64 = 256;

/// Distance from the allocator block to the directory of named blocks: the
/// allocator header plus the fixed-size offset table.
pub const DIRECTORY_OFFSET: u64 = ALLOCATOR_HEADER_LENGTH + ALLOCATOR_TABLE_SLOTS * 4;

/// Low bits of an address word hold log2 of the block size. The remaining bits
/// hold the block offset, which is always 32-byte aligned.
pub const BLOCK_SIZE_MASK: u32 = 0x1F;

// endregion

// region Records

/// Data type tag stored with every record in the Desktop Services B-tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TypeCode {
    /// One byte, nonzero for true.
    Bool = u32::from_be_bytes(*b"bool"),
    /// Big-endian 32-bit integer. Despite the name, four bytes on disk.
    Shor = u32::from_be_bytes(*b"shor"),
    /// Big-endian 32-bit integer.
    Long = u32::from_be_bytes(*b"long"),
    /// Big-endian 64-bit integer.
    Comp = u32::from_be_bytes(*b"comp"),
    /// Big-endian 64-bit timestamp, see [`FinderDate`].
    Dutc = u32::from_be_bytes(*b"dutc"),
    /// A four-character code.
    Type = u32::from_be_bytes(*b"type"),
    /// Length in UTF-16 code units, followed by UTF-16BE text.
    Ustr = u32::from_be_bytes(*b"ustr"),
    /// Length in bytes, followed by the bytes.
    Blob = u32::from_be_bytes(*b"blob"),
}

impl TypeCode {
    pub const ALL: [TypeCode; 8] = [
        TypeCode::Bool,
        TypeCode::Shor,
        TypeCode::Long,
        TypeCode::Comp,
        TypeCode::Dutc,
        TypeCode::Type,
        TypeCode::Ustr,
        TypeCode::Blob,
    ];

    /// Look up a tag read from disk. Returns `None` for unknown tags.
    pub fn from_four_cc(code: FourCc) -> Option<Self> {
        Self::ALL.into_iter().find(|known| known.four_cc() == code)
    }

    pub const fn four_cc(self) -> FourCc {
        FourCc((self as u32).to_be_bytes())
    }
}

/// Well-known record identifiers ("struct IDs") written by Finder.
///
/// Finder writes many more; unknown identifiers are kept as plain [`FourCc`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum StructId {
    /// Folder background (`blob`).
    Background = u32::from_be_bytes(*b"BKGD"),
    /// Icon position within its folder window (`blob`).
    IconLocation = u32::from_be_bytes(*b"Iloc"),
    /// Browser window settings (`blob`, binary property list).
    BrowserWindowSettings = u32::from_be_bytes(*b"bwsp"),
    /// Spotlight comment (`ustr`).
    Comment = u32::from_be_bytes(*b"cmmt"),
    /// Icon position on the desktop (`blob`).
    DesktopIconLocation = u32::from_be_bytes(*b"dilc"),
    /// Folder is expanded in list view (`bool`).
    ListExpanded = u32::from_be_bytes(*b"dscl"),
    /// File name extension (`ustr`).
    Extension = u32::from_be_bytes(*b"extn"),
    /// Finder window geometry and view style (`blob`).
    WindowInfo = u32::from_be_bytes(*b"fwi0"),
    /// Finder window sidebar width (`long`).
    SidebarWidth = u32::from_be_bytes(*b"fwsw"),
    /// Finder window height (`shor`).
    WindowHeight = u32::from_be_bytes(*b"fwvh"),
    /// Icon view scroll position (`blob`).
    IconViewScroll = u32::from_be_bytes(*b"icsp"),
    /// Icon view properties (`blob`, binary property list).
    IconViewProperties = u32::from_be_bytes(*b"icvp"),
    /// Logical size of the folder contents (`comp`).
    LogicalSize = u32::from_be_bytes(*b"lg1S"),
    /// List view scroll position (`blob`).
    ListViewScroll = u32::from_be_bytes(*b"lssp"),
    /// List view properties (`blob`, binary property list).
    ListViewProperties = u32::from_be_bytes(*b"lsvp"),
    /// List view properties, newer variant (`blob`, binary property list).
    ListViewPropertiesAlt = u32::from_be_bytes(*b"lsvP"),
    /// Modification date (`dutc`, or `blob` in older files).
    ModificationDate = u32::from_be_bytes(*b"moDD"),
    /// Modification date, alternate spelling (`dutc` or `blob`).
    ModificationDateAlt = u32::from_be_bytes(*b"modD"),
    /// Physical size of the folder contents (`comp`).
    PhysicalSize = u32::from_be_bytes(*b"ph1S"),
    /// Background picture alias (`blob`).
    Picture = u32::from_be_bytes(*b"pict"),
    /// Unknown, always 1 (`long`).
    Version = u32::from_be_bytes(*b"vSrn"),
    /// View style (`type`), such as `icnv` or `Nlsv`.
    ViewStyle = u32::from_be_bytes(*b"vstl"),
}

impl StructId {
    pub const ALL: [StructId; 22] = [
        StructId::Background,
        StructId::IconLocation,
        StructId::BrowserWindowSettings,
        StructId::Comment,
        StructId::DesktopIconLocation,
        StructId::ListExpanded,
        StructId::Extension,
        StructId::WindowInfo,
        StructId::SidebarWidth,
        StructId::WindowHeight,
        StructId::IconViewScroll,
        StructId::IconViewProperties,
        StructId::LogicalSize,
        StructId::ListViewScroll,
        StructId::ListViewProperties,
        StructId::ListViewPropertiesAlt,
        StructId::ModificationDate,
        StructId::ModificationDateAlt,
        StructId::PhysicalSize,
        StructId::Picture,
        StructId::Version,
        StructId::ViewStyle,
    ];

    pub fn from_four_cc(code: FourCc) -> Option<Self> {
        Self::ALL.into_iter().find(|known| known.four_cc() == code)
    }

    pub const fn four_cc(self) -> FourCc {
        FourCc((self as u32).to_be_bytes())
    }

    /// Records whose blob holds an embedded binary property list.
    pub const fn holds_property_list(self) -> bool {
        matches!(
            self,
            StructId::BrowserWindowSettings
                | StructId::IconViewProperties
                | StructId::ListViewProperties
                | StructId::ListViewPropertiesAlt
        )
    }

    pub const fn is_modification_date(self) -> bool {
        matches!(
            self,
            StructId::ModificationDate | StructId::ModificationDateAlt
        )
    }
}

/// Leading bytes of an embedded binary property list.
pub const BPLIST_MAGIC: &[u8] = b"bplist";

// endregion

// region Dates

/// Seconds between 1904-01-01 (classic Mac OS epoch) and 1970-01-01.
pub const MAC_EPOCH_OFFSET: i64 = 2_082_844_800;

/// A `dutc` timestamp: fixed-point seconds since 1904-01-01 UTC, with 16
/// fractional bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FinderDate(pub u64);

impl FinderDate {
    /// Whole seconds since the Unix epoch. Fractional seconds are dropped.
    pub const fn unix_seconds(self) -> i64 {
        (self.0 >> 16) as i64 - MAC_EPOCH_OFFSET
    }
}

// endregion
