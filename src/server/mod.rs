//! Transport adapter boundary.
//!
//! The engine treats the connection transport as an opaque bidirectional
//! channel that delivers and accepts discrete payloads; everything
//! transport-specific lives behind the [`MessageChannel`] contract.
//!
//! - [`codec`] - the envelope layer: JSON request envelopes, optionally
//!   base64-wrapped when the channel signals binary framing
//! - [`channel`] - the channel contract plus a concrete length-prefixed
//!   framing over any `Read + Write` stream
//! - [`service`] - the per-connection serve loop: one message at a time,
//!   exactly one reply per request, in order
//! - [`server`] - a `may`-coroutine TCP server, one coroutine per connection

pub mod channel;
pub mod codec;
pub mod server;
pub mod service;

pub use channel::{Frame, FramedChannel, MessageChannel};
pub use codec::{decode_message, encode_message};
pub use server::{ServerHandle, WireServer};
pub use service::ConnectionService;
