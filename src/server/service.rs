use std::sync::Arc;

use tracing::{debug, info_span};

use super::channel::{Frame, MessageChannel};
use super::codec::{decode_message, encode_message};
use crate::dispatcher::Dispatcher;
use crate::ids::RequestId;

/// Per-connection service: decodes each inbound message, dispatches it, and
/// encodes the reply under the same framing flag.
///
/// One request produces exactly one response, in order, on the same channel.
/// The loop is strictly sequential - a message runs to completion (or to a
/// recovered error) before the next one is read. Concurrency lives across
/// connections, never inside one.
#[derive(Clone)]
pub struct ConnectionService {
    dispatcher: Arc<Dispatcher>,
}

impl ConnectionService {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        ConnectionService { dispatcher }
    }

    /// Handle a single frame: decode, dispatch, encode.
    ///
    /// Recoverable API failures come back as a normal reply frame (the
    /// dispatcher already folded them into an error body). An `Err` here -
    /// an undecodable payload or an unrecognized dispatch failure - is
    /// connection-fatal.
    pub fn handle_message(&self, frame: &Frame) -> anyhow::Result<Frame> {
        let request = decode_message(&frame.payload, frame.is_binary)?;
        let payload = self.dispatcher.process_request(request)?;
        Ok(Frame {
            payload: encode_message(payload, frame.is_binary),
            is_binary: frame.is_binary,
        })
    }

    /// Serve a channel until the peer closes it or a fatal error occurs.
    pub fn serve<C: MessageChannel>(&self, channel: &mut C) -> anyhow::Result<()> {
        while let Some(frame) = channel.recv()? {
            let request_id = RequestId::new();
            let span = info_span!("message", request_id = %request_id);
            let _guard = span.enter();

            let reply = self.handle_message(&frame)?;
            channel.send(reply)?;
        }
        debug!("Channel closed by peer");
        Ok(())
    }
}
