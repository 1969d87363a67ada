//! # Line Framing
//!
//! Extract newline-delimited frames from a streaming TCP buffer. The
//! terminator (and an optional trailing carriage return) is stripped.

use bytes::BytesMut;

/// Splits one newline-terminated frame off the front of `buf`.
///
/// Returns `None` until a full line is buffered.
pub fn next_line(buf: &mut BytesMut) -> Option<BytesMut> {
    let pos = buf.iter().position(|&b| b == b'\n')?;
    let mut line = buf.split_to(pos + 1);
    line.truncate(pos);
    if line.last() == Some(&b'\r') {
        let end = line.len() - 1;
        line.truncate(end);
    }
    Some(line)
}
