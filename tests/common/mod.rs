//! Builds synthetic `.DS_Store` images for integration tests.

#![allow(dead_code)]

use dsstorust::Value;

/// Relative offset of the allocator block, just past the 32-byte header.
const ALLOCATOR_AT: usize = 0x20;

/// Lays out a `Bud1` file: header, allocator block (ID 0) with its offset
/// table and directory, then each added block in order.
pub struct StoreBuilder {
    magic: [u8; 4],
    blocks: Vec<Vec<u8>>,
    directory: Vec<(Vec<u8>, u32)>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self {
            magic: *b"Bud1",
            blocks: Vec::new(),
            directory: Vec::new(),
        }
    }

    pub fn magic(mut self, magic: &[u8; 4]) -> Self {
        self.magic = *magic;
        self
    }

    /// ID the next call to [`StoreBuilder::add_block`] will return.
    pub fn next_id(&self) -> u32 {
        self.blocks.len() as u32 + 1
    }

    pub fn add_block(&mut self, contents: Vec<u8>) -> u32 {
        let id = self.next_id();
        self.blocks.push(contents);
        id
    }

    pub fn directory_entry(&mut self, name: &[u8], block_id: u32) -> &mut Self {
        self.directory.push((name.to_vec(), block_id));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        // Allocator contents: block count, unknown word, 256 offset slots,
        // directory, 32 empty free lists.
        let mut allocator = Vec::new();
        allocator.extend_from_slice(&(self.blocks.len() as u32 + 1).to_be_bytes());
        allocator.extend_from_slice(&0u32.to_be_bytes());
        let table_at = allocator.len();
        allocator.resize(table_at + 256 * 4, 0);
        allocator.extend_from_slice(&(self.directory.len() as u32).to_be_bytes());
        for (name, id) in &self.directory {
            allocator.push(name.len() as u8);
            allocator.extend_from_slice(name);
            allocator.extend_from_slice(&id.to_be_bytes());
        }
        allocator.resize(allocator.len() + 32 * 4, 0);

        // Place every block, allocator first.
        let mut placed = Vec::new();
        let mut next = ALLOCATOR_AT;
        let allocator_log2 = log2_size(allocator.len());
        placed.push((next, allocator_log2));
        next += 1 << allocator_log2;
        for block in &self.blocks {
            let log2 = log2_size(block.len());
            placed.push((next, log2));
            next += 1 << log2;
        }

        for (slot, (offset, log2)) in placed.iter().enumerate() {
            let word = *offset as u32 | *log2;
            let at = table_at + slot * 4;
            allocator[at..at + 4].copy_from_slice(&word.to_be_bytes());
        }

        let mut image = vec![0u8; 4 + next];
        image[0..4].copy_from_slice(&1u32.to_be_bytes());
        image[4..8].copy_from_slice(&self.magic);
        let allocator_size = 1u32 << allocator_log2;
        image[8..12].copy_from_slice(&(ALLOCATOR_AT as u32).to_be_bytes());
        image[12..16].copy_from_slice(&allocator_size.to_be_bytes());
        image[16..20].copy_from_slice(&(ALLOCATOR_AT as u32).to_be_bytes());

        let contents = std::iter::once(&allocator).chain(self.blocks.iter());
        for ((offset, _), bytes) in placed.iter().zip(contents) {
            let at = 4 + offset;
            image[at..at + bytes.len()].copy_from_slice(bytes);
        }
        image
    }
}

/// Smallest power of two holding `len` bytes, never below 32.
fn log2_size(len: usize) -> u32 {
    len.max(32).next_power_of_two().trailing_zeros()
}

pub fn master_block(root: u32, levels: u32, records: u32, nodes: u32) -> Vec<u8> {
    [root, levels, records, nodes, 0x1000]
        .iter()
        .flat_map(|word| word.to_be_bytes())
        .collect()
}

pub fn utf16_be(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_be_bytes).collect()
}

/// One record with an explicit type tag and pre-encoded value.
pub fn raw_record(filename: &str, struct_id: &[u8; 4], tag: &[u8; 4], value: &[u8]) -> Vec<u8> {
    let mut out = (filename.encode_utf16().count() as u32).to_be_bytes().to_vec();
    out.extend(utf16_be(filename));
    out.extend_from_slice(struct_id);
    out.extend_from_slice(tag);
    out.extend_from_slice(value);
    out
}

/// Encode a value with the tag Finder would typically use for it.
pub fn encode_value(value: &Value) -> (&'static [u8; 4], Vec<u8>) {
    match value {
        Value::Bool(b) => (b"bool", vec![u8::from(*b)]),
        Value::U32(n) => (b"long", n.to_be_bytes().to_vec()),
        Value::U64(n) => (b"comp", n.to_be_bytes().to_vec()),
        Value::Type(code) => (b"type", code.as_bytes().to_vec()),
        Value::Text(text) => {
            let mut out = (text.encode_utf16().count() as u32).to_be_bytes().to_vec();
            out.extend(utf16_be(text));
            (b"ustr", out)
        }
        Value::Blob(bytes) => {
            let mut out = (bytes.len() as u32).to_be_bytes().to_vec();
            out.extend_from_slice(bytes);
            (b"blob", out)
        }
    }
}

pub fn record(filename: &str, struct_id: &[u8; 4], value: &Value) -> Vec<u8> {
    let (tag, bytes) = encode_value(value);
    raw_record(filename, struct_id, tag, &bytes)
}

pub fn leaf(records: &[Vec<u8>]) -> Vec<u8> {
    let mut out = 0u32.to_be_bytes().to_vec();
    out.extend_from_slice(&(records.len() as u32).to_be_bytes());
    records.iter().for_each(|r| out.extend_from_slice(r));
    out
}

/// Internal node: each record is preceded by the child holding smaller keys.
pub fn internal(records: &[(u32, Vec<u8>)], rightmost_child: u32) -> Vec<u8> {
    let mut out = rightmost_child.to_be_bytes().to_vec();
    out.extend_from_slice(&(records.len() as u32).to_be_bytes());
    for (child, record) in records {
        out.extend_from_slice(&child.to_be_bytes());
        out.extend_from_slice(record);
    }
    out
}

/// Single-leaf store: master block is block 1, the leaf block 2.
pub fn single_leaf_store(records: &[Vec<u8>]) -> Vec<u8> {
    let mut builder = StoreBuilder::new();
    let master = builder.add_block(master_block(2, 0, records.len() as u32, 1));
    builder.add_block(leaf(records));
    builder.directory_entry(b"DSDB", master);
    builder.build()
}
