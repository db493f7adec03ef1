//! Bounds-checked, big-endian reading over an in-memory buffer.

use crate::{Error, Result};
use byteorder::{BigEndian, ReadBytesExt};
use deku::{DekuContainerRead, DekuError};
use std::io::Cursor;

/// Sequential reader with absolute seeking. Every read is checked against the
/// end of the buffer and fails with [`Error::Truncated`] instead of panicking.
pub struct ByteCursor<'a> {
    inner: Cursor<&'a [u8]>,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            inner: Cursor::new(data),
        }
    }

    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    /// Move to an absolute offset. Offsets past the end are accepted; the
    /// next read will fail.
    pub fn seek(&mut self, offset: u64) {
        self.inner.set_position(offset);
    }

    /// Run `f`, then return to the position held before the call. The
    /// position is restored whether `f` succeeds or fails.
    pub fn preserving_position<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.position();
        let out = f(self);
        self.seek(saved);
        out
    }

    fn truncated(&self) -> Error {
        Error::Truncated {
            offset: self.position(),
        }
    }

    /// Apply a `byteorder` read, rewinding if it comes up short.
    fn read_with<T>(
        &mut self,
        read: impl FnOnce(&mut Cursor<&'a [u8]>) -> std::io::Result<T>,
    ) -> Result<T> {
        let at = self.position();
        read(&mut self.inner).map_err(|_| {
            self.seek(at);
            Error::Truncated { offset: at }
        })
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_with(|c| c.read_u8())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_with(|c| c.read_u32::<BigEndian>())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_with(|c| c.read_u64::<BigEndian>())
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let data: &'a [u8] = *self.inner.get_ref();
        let start = usize::try_from(self.position()).map_err(|_| self.truncated())?;
        let end = start.checked_add(len).ok_or_else(|| self.truncated())?;
        let bytes = data.get(start..end).ok_or_else(|| self.truncated())?;
        self.seek(end as u64);
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Decode a fixed-layout record at the current position.
    pub fn read_struct<T>(&mut self) -> Result<T>
    where
        T: DekuContainerRead<'a>,
    {
        let data: &'a [u8] = *self.inner.get_ref();
        let start = usize::try_from(self.position()).map_err(|_| self.truncated())?;
        let rest = data.get(start..).unwrap_or(&[]);

        match T::from_bytes((rest, 0)) {
            Ok(((remaining, _bit_offset), value)) => {
                let consumed = rest.len() - remaining.len();
                self.seek((start + consumed) as u64);
                Ok(value)
            }
            Err(DekuError::Incomplete(_)) => Err(self.truncated()),
            Err(e) => Err(Error::Layout(e.to_string())),
        }
    }
}
