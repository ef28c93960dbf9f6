//! Strict-FIFO command dispatch.
//!
//! The wire protocol carries no request ids: a response can only be
//! matched to a request by ordering. This module is therefore the
//! single serialization point of the engine: submissions queue on an
//! mpsc channel and one worker loop per live session consumes them,
//! one in-flight exchange at a time. Any reordering here would hand
//! response N to caller N-1 silently, so nothing below ever reads the
//! socket outside the current exchange.

use std::time::Duration;

use rcon_protocol::{unpack_array, CodecError, XorKey};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::connection::Connection;
use crate::error::RconError;

/// How many continuation frames a multi-frame array response may
/// span before we give up and hand back what we have.
const MAX_MULTIPART_CYCLES: usize = 10;

/// Deadline for discarding a late response after a command timeout,
/// so the next exchange starts aligned.
const LATE_DRAIN: Duration = Duration::from_millis(50);

/// Consecutive command timeouts before the connection is declared
/// dead (the server stopped answering, not just one slow command).
const TIMEOUT_STRIKES: u32 = 2;

pub(crate) struct PendingRequest {
    pub command: String,
    /// Array responses may span frames; keep reading until the tab
    /// array parses complete.
    pub multipart: bool,
    pub reply: oneshot::Sender<Result<String, RconError>>,
}

pub(crate) type CommandTx = mpsc::UnboundedSender<PendingRequest>;
pub(crate) type CommandRx = mpsc::UnboundedReceiver<PendingRequest>;

/// Queue a command and wait for its slot in the FIFO to resolve.
///
/// Dropping the returned future abandons interest in the result; the
/// queued request still runs to completion so the FIFO stays aligned.
pub(crate) async fn submit(
    tx: &CommandTx,
    command: String,
    multipart: bool,
) -> Result<String, RconError> {
    let (reply_tx, reply_rx) = oneshot::channel();
    tx.send(PendingRequest {
        command,
        multipart,
        reply: reply_tx,
    })
    .map_err(|_| RconError::NotReady)?;

    // The worker dropping our slot without answering means the
    // session died between enqueue and dispatch.
    reply_rx.await.map_err(|_| RconError::ConnectionLost)?
}

/// Serve queued requests over `conn` until the connection fails or
/// shutdown is requested. Returns the error that ended the session.
pub(crate) async fn serve(
    conn: &mut Connection,
    key: &XorKey,
    rx: &mut CommandRx,
    shutdown: &mut watch::Receiver<bool>,
    cfg: &EngineConfig,
) -> RconError {
    let mut strikes = 0u32;
    let mut drain_before_send = false;

    loop {
        let req = tokio::select! {
            _ = shutdown.wait_for(|stop| *stop) => return RconError::Shutdown,
            req = rx.recv() => match req {
                Some(req) => req,
                // The engine itself was dropped.
                None => return RconError::Shutdown,
            },
        };

        if drain_before_send {
            // A previous exchange timed out; its response may still
            // arrive. Discard it so this exchange reads its own.
            if let Ok(stale) = conn.recv_frame(LATE_DRAIN).await {
                debug!(len = stale.len(), "discarded late response frame");
            }
            drain_before_send = false;
        }

        debug!(command = %req.command, "dispatching");
        if let Err(err) = conn.send_frame(&key.apply(req.command.as_bytes())).await {
            let _ = req.reply.send(Err(RconError::ConnectionLost));
            fail_pending(rx);
            return err;
        }

        match recv_response(conn, key, req.multipart, cfg).await {
            Ok(text) => {
                strikes = 0;
                // A dropped receiver is a caller that stopped waiting.
                let _ = req.reply.send(Ok(text));
            }
            Err(RconError::Timeout) => {
                strikes += 1;
                let _ = req.reply.send(Err(RconError::CommandTimeout));
                if strikes >= TIMEOUT_STRIKES {
                    warn!("{} consecutive command timeouts, dropping connection", strikes);
                    fail_pending(rx);
                    return RconError::ConnectionLost;
                }
                drain_before_send = true;
            }
            Err(err) => {
                let _ = req.reply.send(Err(RconError::ConnectionLost));
                fail_pending(rx);
                return err;
            }
        }
    }
}

/// Read one response, following continuation frames for array
/// responses whose declared count is not yet satisfied.
async fn recv_response(
    conn: &mut Connection,
    key: &XorKey,
    multipart: bool,
    cfg: &EngineConfig,
) -> Result<String, RconError> {
    let payload = conn.recv_frame(cfg.response_timeout()).await?;
    let mut text = key.apply_str(&payload)?;

    if multipart {
        for _ in 0..MAX_MULTIPART_CYCLES {
            match unpack_array(&text) {
                Err(CodecError::IncompleteArray { .. }) => {}
                // Complete, or not actually an array; the caller
                // unpacks and judges.
                _ => break,
            }
            match conn.recv_frame(cfg.array_grace()).await {
                Ok(more) => text.push_str(&key.apply_str(&more)?),
                Err(RconError::Timeout) => break,
                Err(err) => return Err(err),
            }
        }
    }

    Ok(text)
}

/// Fail everything still queued. Called exactly when the connection
/// is declared dead, so no response can be delivered afterwards.
fn fail_pending(rx: &mut CommandRx) {
    let mut failed = 0usize;
    while let Ok(req) = rx.try_recv() {
        let _ = req.reply.send(Err(RconError::ConnectionLost));
        failed += 1;
    }
    if failed > 0 {
        warn!(failed, "failed queued requests after connection loss");
    }
}
