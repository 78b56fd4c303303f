//! Length-delimited message framing.
//!
//! Each frame is a big-endian `u32` body length followed by a MessagePack
//! body (struct fields encoded by name). A stream that ends cleanly before
//! the first byte of a frame yields `Ok(None)`; a stream that ends anywhere
//! inside a frame is [`FrameError::Truncated`].

use std::io::{ErrorKind, Read, Write};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::FrameError;

/// Largest frame body accepted unless configured otherwise (16 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

const LENGTH_PREFIX: usize = 4;

/// Write one delimited message and flush.
pub fn write_delimited<W, T>(writer: &mut W, message: &T) -> Result<(), FrameError>
where
    W: Write + ?Sized,
    T: Serialize,
{
    let body = rmp_serde::to_vec_named(message)?;
    let len = u32::try_from(body.len()).map_err(|_| FrameError::TooLarge {
        len: body.len(),
        max: u32::MAX as usize,
    })?;
    writer.write_u32::<BigEndian>(len)?;
    writer.write_all(&body)?;
    writer.flush()?;
    Ok(())
}

/// Read one delimited message.
///
/// Returns `Ok(None)` if the stream is already at end-of-stream.
pub fn read_delimited<R, T>(reader: &mut R, max_size: usize) -> Result<Option<T>, FrameError>
where
    R: Read + ?Sized,
    T: DeserializeOwned,
{
    let mut prefix = [0u8; LENGTH_PREFIX];
    let mut filled = 0;
    while filled < LENGTH_PREFIX {
        match reader.read(&mut prefix[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(FrameError::Truncated),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    let len = BigEndian::read_u32(&prefix) as usize;
    if len > max_size {
        warn!(len, max = max_size, "rejecting oversized frame");
        return Err(FrameError::TooLarge { len, max: max_size });
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => FrameError::Truncated,
        _ => FrameError::Io(e),
    })?;
    Ok(Some(rmp_serde::from_slice(&body)?))
}
