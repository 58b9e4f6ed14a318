//! The message channel contract and a concrete stream framing.

use std::io::{self, Read, Write};

/// Refuse length prefixes beyond this; a larger frame is a corrupt stream or
/// a hostile peer, not a request.
const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// One discrete payload on the channel. The binary flag records the framing
/// the peer chose for this message; replies echo it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub payload: Vec<u8>,
    pub is_binary: bool,
}

impl Frame {
    #[must_use]
    pub fn text(payload: Vec<u8>) -> Self {
        Frame {
            payload,
            is_binary: false,
        }
    }

    #[must_use]
    pub fn binary(payload: Vec<u8>) -> Self {
        Frame {
            payload,
            is_binary: true,
        }
    }
}

/// An opaque bidirectional message channel delivering discrete payloads.
///
/// The engine never sees handshakes, fragmentation, or keep-alives - only
/// whole frames. Implementations decide what a frame is on their transport.
pub trait MessageChannel {
    /// Next inbound frame, or `None` once the peer has closed the channel.
    fn recv(&mut self) -> io::Result<Option<Frame>>;

    /// Send one frame to the peer.
    fn send(&mut self, frame: Frame) -> io::Result<()>;
}

/// Minimal framing for stream transports: a 1-byte binary flag, a big-endian
/// `u32` payload length, then the payload.
pub struct FramedChannel<S> {
    stream: S,
}

impl<S: Read + Write> FramedChannel<S> {
    pub fn new(stream: S) -> Self {
        FramedChannel { stream }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> MessageChannel for FramedChannel<S> {
    fn recv(&mut self) -> io::Result<Option<Frame>> {
        let mut flag = [0u8; 1];
        // EOF before the first header byte is a clean close; EOF anywhere
        // later is a truncated frame.
        match self.stream.read_exact(&mut flag) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(err) => return Err(err),
        }
        let is_binary = match flag[0] {
            0 => false,
            1 => true,
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unknown frame flag {other}"),
                ))
            }
        };

        let mut len_bytes = [0u8; 4];
        self.stream.read_exact(&mut len_bytes)?;
        let len = u32::from_be_bytes(len_bytes) as usize;
        if len > MAX_FRAME_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("frame length {len} exceeds limit"),
            ));
        }

        let mut payload = vec![0u8; len];
        self.stream.read_exact(&mut payload)?;
        Ok(Some(Frame { payload, is_binary }))
    }

    fn send(&mut self, frame: Frame) -> io::Result<()> {
        let len = u32::try_from(frame.payload.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame too large"))?;
        self.stream.write_all(&[u8::from(frame.is_binary)])?;
        self.stream.write_all(&len.to_be_bytes())?;
        self.stream.write_all(&frame.payload)?;
        self.stream.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// In-memory stream: reads from a scripted buffer, collects writes.
    struct Duplex {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn raw_frame(flag: u8, payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![flag];
        bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_recv_then_clean_close() {
        let mut input = raw_frame(0, b"hello");
        input.extend(raw_frame(1, b"world"));
        let mut channel = FramedChannel::new(Duplex {
            input: Cursor::new(input),
            output: Vec::new(),
        });

        assert_eq!(channel.recv().unwrap(), Some(Frame::text(b"hello".to_vec())));
        assert_eq!(
            channel.recv().unwrap(),
            Some(Frame::binary(b"world".to_vec()))
        );
        assert_eq!(channel.recv().unwrap(), None);
    }

    #[test]
    fn test_send_writes_header_and_payload() {
        let mut channel = FramedChannel::new(Duplex {
            input: Cursor::new(Vec::new()),
            output: Vec::new(),
        });
        channel.send(Frame::binary(b"abc".to_vec())).unwrap();
        assert_eq!(channel.into_inner().output, raw_frame(1, b"abc"));
    }

    #[test]
    fn test_truncated_frame_is_an_error() {
        let mut input = raw_frame(0, b"hello");
        input.truncate(input.len() - 2);
        let mut channel = FramedChannel::new(Duplex {
            input: Cursor::new(input),
            output: Vec::new(),
        });
        assert!(channel.recv().is_err());
    }

    #[test]
    fn test_unknown_flag_is_an_error() {
        let mut channel = FramedChannel::new(Duplex {
            input: Cursor::new(raw_frame(7, b"x")),
            output: Vec::new(),
        });
        assert!(channel.recv().is_err());
    }
}
