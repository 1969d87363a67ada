//! # Console Client
//!
//! Purpose: Drive a console server over newline-delimited JSON, primarily
//! from integration tests.
//!
//! ## Design Principles
//!
//! 1. **Mirror The Wire**: one request out, a stream of messages back;
//!    nothing is interpreted beyond the envelope.
//! 2. **Explicit Waiting**: callers say which operation they expect and
//!    trace messages are skipped, not hidden.

use std::io;

use kvdash_common::{Message, Request, OP_ERROR};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// A connected console client.
pub struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    /// Connects to a console server.
    pub async fn connect(addr: &str) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (reader, writer) = stream.into_split();
        Ok(Client {
            reader: BufReader::new(reader),
            writer,
        })
    }

    /// Sends one request.
    pub async fn send(&mut self, request: &Request) -> io::Result<()> {
        let mut line = serde_json::to_vec(request)?;
        line.push(b'\n');
        self.writer.write_all(&line).await
    }

    /// Receives the next message, whatever its operation.
    pub async fn recv(&mut self) -> io::Result<Message> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            ));
        }
        Ok(serde_json::from_str(&line)?)
    }

    /// Waits for a message with the given operation, skipping everything
    /// else. An `error` message arriving first is surfaced as an error,
    /// unless `error` is what the caller asked for.
    pub async fn expect(&mut self, operation: &str) -> io::Result<Message> {
        loop {
            let message = self.recv().await?;
            if message.operation == operation {
                return Ok(message);
            }
            if message.operation == OP_ERROR {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    message.data.to_string(),
                ));
            }
        }
    }
}
