//! # RESP2 Client Codec
//!
//! Encode outbound commands and decode replies from a streaming TCP buffer.
//!
//! ## Design Principles
//!
//! 1. **Streaming Friendly**: decoding consumes nothing until one complete
//!    reply is buffered; partial frames report "need more data".
//! 2. **Fail Fast**: a malformed frame is a protocol error immediately.
//! 3. **Low Allocation**: only bulk payloads are copied out of the buffer.
//!
//! Replies nest (arrays of arrays), so decoding is a recursive try-parse
//! over the buffered bytes rather than a flat state machine; a reply that is
//! still incomplete is simply re-parsed once more bytes arrive. Console
//! replies are small, so the repeated work is negligible.

use bytes::BytesMut;

use crate::error::{StoreError, StoreResult};
use crate::reply::Reply;

/// Encodes one command as a RESP2 array of bulk strings.
pub fn encode_command(args: &[&str], out: &mut BytesMut) {
    out.extend_from_slice(format!("*{}\r\n", args.len()).as_bytes());
    for arg in args {
        out.extend_from_slice(format!("${}\r\n", arg.len()).as_bytes());
        out.extend_from_slice(arg.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
}

/// Attempts to decode a single reply from the front of `buf`.
///
/// Returns `Ok(None)` when more data is required. On success the caller must
/// advance the buffer by the returned byte count.
pub fn decode(buf: &[u8]) -> StoreResult<Option<(Reply, usize)>> {
    let mut pos = 0;
    match parse_reply(buf, &mut pos)? {
        Some(reply) => Ok(Some((reply, pos))),
        None => Ok(None),
    }
}

fn parse_reply(buf: &[u8], pos: &mut usize) -> StoreResult<Option<Reply>> {
    let line = match read_line(buf, pos) {
        Some(line) => line,
        None => return Ok(None),
    };
    let (&tag, rest) = line
        .split_first()
        .ok_or_else(|| StoreError::Protocol("empty reply line".to_string()))?;
    match tag {
        b'+' => Ok(Some(Reply::Simple(lossy(rest)))),
        b'-' => Ok(Some(Reply::Error(lossy(rest)))),
        b':' => {
            let text = lossy(rest);
            let value = text.parse().map_err(|_| {
                StoreError::Protocol(format!("bad integer reply \"{text}\""))
            })?;
            Ok(Some(Reply::Int(value)))
        }
        b'$' => {
            let len = parse_len(rest)?;
            let Ok(len) = usize::try_from(len) else {
                // Negative length is the null bulk reply.
                return Ok(Some(Reply::Nil));
            };
            if buf.len() < *pos + len + 2 {
                return Ok(None);
            }
            let data = &buf[*pos..*pos + len];
            if &buf[*pos + len..*pos + len + 2] != b"\r\n" {
                return Err(StoreError::Protocol(
                    "bulk payload not terminated by CRLF".to_string(),
                ));
            }
            *pos += len + 2;
            Ok(Some(Reply::Bulk(lossy(data))))
        }
        b'*' => {
            let len = parse_len(rest)?;
            let Ok(len) = usize::try_from(len) else {
                return Ok(Some(Reply::Nil));
            };
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                match parse_reply(buf, pos)? {
                    Some(item) => items.push(item),
                    None => return Ok(None),
                }
            }
            Ok(Some(Reply::Array(items)))
        }
        other => Err(StoreError::Protocol(format!(
            "unknown reply tag '{}'",
            other as char
        ))),
    }
}

/// Reads one CRLF-terminated line starting at `*pos`, advancing past it.
fn read_line<'a>(buf: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    let mut idx = *pos + 1;
    while idx < buf.len() {
        if buf[idx] == b'\n' && buf[idx - 1] == b'\r' {
            let line = &buf[*pos..idx - 1];
            *pos = idx + 1;
            return Some(line);
        }
        idx += 1;
    }
    None
}

fn parse_len(data: &[u8]) -> StoreResult<i64> {
    let text = lossy(data);
    text.parse().map_err(|_| {
        StoreError::Protocol(format!("bad length prefix \"{text}\""))
    })
}

fn lossy(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}
