//! # Store Connections
//!
//! Purpose: The strategy trait the console core talks through, plus the TCP
//! RESP2 connection and the backend dispatch enum.
//!
//! ## Design Principles
//!
//! 1. **Single Primitive**: the console issues one command at a time, so the
//!    whole behavior surface is `command`.
//! 2. **Zero-Cost Dispatch**: callers stay generic over the trait; calls
//!    monomorphize instead of going through trait objects.
//! 3. **Scoped Release**: dropping a connection closes it, so every exit
//!    path releases what it acquired.

use std::future::Future;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{StoreError, StoreResult};
use crate::memory::MemoryStore;
use crate::reply::Reply;
use crate::resp;

/// Strategy trait: the behavior surface the console needs from a store.
pub trait StoreConn: Send {
    /// Issues one command and returns its decoded reply.
    ///
    /// A store-side rejection surfaces as [`StoreError::Command`] with the
    /// store's message verbatim.
    fn command(&mut self, args: &[&str]) -> impl Future<Output = StoreResult<Reply>> + Send;
}

/// TCP connection speaking RESP2 to a real store.
#[derive(Debug)]
pub struct RespConn {
    stream: TcpStream,
    buf: BytesMut,
}

impl RespConn {
    /// Connects to `addr`, authenticating and selecting the database when
    /// needed.
    pub async fn connect(addr: &str, password: Option<&str>, db: u32) -> StoreResult<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let mut conn = RespConn {
            stream,
            buf: BytesMut::with_capacity(4096),
        };
        if let Some(password) = password {
            conn.roundtrip(&["AUTH", password]).await?;
        }
        if db > 0 {
            let index = db.to_string();
            conn.roundtrip(&["SELECT", &index]).await?;
        }
        Ok(conn)
    }

    async fn roundtrip(&mut self, args: &[&str]) -> StoreResult<Reply> {
        let mut out = BytesMut::new();
        resp::encode_command(args, &mut out);
        self.stream.write_all(&out).await?;
        self.read_reply().await
    }

    async fn read_reply(&mut self) -> StoreResult<Reply> {
        loop {
            if let Some((reply, used)) = resp::decode(&self.buf)? {
                self.buf.advance(used);
                return match reply {
                    Reply::Error(message) => Err(StoreError::Command(message)),
                    other => Ok(other),
                };
            }
            let n = self.stream.read_buf(&mut self.buf).await?;
            if n == 0 {
                return Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "store closed the connection",
                )));
            }
        }
    }
}

impl StoreConn for RespConn {
    async fn command(&mut self, args: &[&str]) -> StoreResult<Reply> {
        self.roundtrip(args).await
    }
}

/// A per-operation connection to one configured backend.
#[derive(Debug)]
pub enum StoreHandle {
    /// RESP2 connection to a real store.
    Resp(RespConn),
    /// Handle to a shared in-process store.
    Memory(MemoryStore),
}

impl StoreConn for StoreHandle {
    async fn command(&mut self, args: &[&str]) -> StoreResult<Reply> {
        match self {
            StoreHandle::Resp(conn) => conn.command(args).await,
            StoreHandle::Memory(store) => store.command(args).await,
        }
    }
}
