//! The one TCP socket to the game server.
//!
//! Owns framing and read reassembly; no retry logic lives here. The
//! session manager decides what a failure means.

use std::time::Duration;

use bytes::BytesMut;
use rcon_protocol::{encode_frame, CodecError, FrameDecoder, XorKey};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time;
use tracing::{debug, trace};

use crate::error::RconError;

pub(crate) struct Connection {
    stream: TcpStream,
    decoder: FrameDecoder,
    read_buf: BytesMut,
}

impl Connection {
    /// Establish the TCP connection. Authentication is layered above
    /// by the session manager, since the handshake itself is frame
    /// exchanges.
    pub async fn open(host: &str, port: u16, deadline: Duration) -> Result<Connection, RconError> {
        debug!(host, port, "opening connection");
        let stream = time::timeout(deadline, TcpStream::connect((host, port)))
            .await
            .map_err(|_| RconError::Timeout)??;
        stream.set_nodelay(true)?;
        Ok(Connection {
            stream,
            decoder: FrameDecoder::new(),
            read_buf: BytesMut::with_capacity(8192),
        })
    }

    /// Length-prefix `payload` and write it out.
    pub async fn send_frame(&mut self, payload: &[u8]) -> Result<(), RconError> {
        trace!(len = payload.len(), "sending frame");
        let frame = encode_frame(payload);
        self.stream.write_all(&frame).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Block until one complete frame arrives or `deadline` elapses.
    ///
    /// Partial bytes received before a timeout stay buffered, so a
    /// later call picks up where this one left off.
    pub async fn recv_frame(&mut self, deadline: Duration) -> Result<Vec<u8>, RconError> {
        time::timeout(deadline, self.recv_frame_inner())
            .await
            .map_err(|_| RconError::Timeout)?
    }

    async fn recv_frame_inner(&mut self) -> Result<Vec<u8>, RconError> {
        loop {
            if let Some(payload) = self.decoder.decode(&mut self.read_buf)? {
                trace!(len = payload.len(), "received frame");
                return Ok(payload);
            }

            let mut buf = [0u8; 4096];
            let n = self.stream.read(&mut buf).await?;
            if n == 0 {
                // EOF mid-frame means the length prefix was never
                // satisfied; that is malformed data, not a clean close.
                if self.decoder.mid_frame() || !self.read_buf.is_empty() {
                    return Err(RconError::Frame(CodecError::Truncated));
                }
                return Err(RconError::ConnectionLost);
            }
            self.read_buf.extend_from_slice(&buf[..n]);
        }
    }

    /// The handshake read: the server's first frame after accept
    /// carries the XOR key for the rest of the session.
    pub async fn recv_key(&mut self, deadline: Duration) -> Result<XorKey, RconError> {
        let bytes = self.recv_frame(deadline).await?;
        Ok(XorKey::new(bytes)?)
    }

    /// Shut the socket down. Idempotent; errors are irrelevant since
    /// the connection is being discarded either way.
    pub async fn close(&mut self) {
        let _ = self.stream.shutdown().await;
    }
}
