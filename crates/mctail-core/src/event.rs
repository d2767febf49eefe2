//! Decoded message events and the pipeline's input seam.
//!
//! A [`MessageEvent`] is the render input contract: whatever owns the event
//! loop hands fully decoded events, one at a time, to a [`TraceSink`]. The
//! pipeline implements the trait; tests can implement it with a capture
//! buffer.

use anyhow::Result;

/// Operation kind of a decoded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Get,
    Gets,
    Set,
    Add,
    Replace,
    Append,
    Prepend,
    Cas,
    Delete,
    Incr,
    Decr,
    Touch,
    /// Channel lifecycle marker terminating a reply batch. Not data; the
    /// renderer produces nothing for it.
    End,
}

impl Op {
    /// The protocol name, as printed in the message header.
    pub fn wire_name(self) -> &'static str {
        match self {
            Op::Get => "get",
            Op::Gets => "gets",
            Op::Set => "set",
            Op::Add => "add",
            Op::Replace => "replace",
            Op::Append => "append",
            Op::Prepend => "prepend",
            Op::Cas => "cas",
            Op::Delete => "delete",
            Op::Incr => "incr",
            Op::Decr => "decr",
            Op::Touch => "touch",
            Op::End => "end",
        }
    }
}

/// Result kind of a decoded reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    Found,
    Stored,
    NotStored,
    Exists,
    NotFound,
    Deleted,
    Touched,
    Error,
    ClientError,
    ServerError,
}

impl ReplyStatus {
    /// The name printed in the message header.
    pub fn wire_name(self) -> &'static str {
        match self {
            ReplyStatus::Found => "found",
            ReplyStatus::Stored => "stored",
            ReplyStatus::NotStored => "not_stored",
            ReplyStatus::Exists => "exists",
            ReplyStatus::NotFound => "not_found",
            ReplyStatus::Deleted => "deleted",
            ReplyStatus::Touched => "touched",
            ReplyStatus::Error => "error",
            ReplyStatus::ClientError => "client_error",
            ReplyStatus::ServerError => "server_error",
        }
    }
}

/// One decoded protocol event.
///
/// Optional fields that are absent are simply omitted from rendering; they
/// are never errors. `exptime == 0` means "no expiration".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageEvent {
    /// Operation kind; `None` when unknown (e.g. a bare reply line).
    pub op: Option<Op>,
    /// Result kind; `None` when unknown (e.g. a request).
    pub reply: Option<ReplyStatus>,
    /// Key bytes, if the message carries a key.
    pub key: Option<Vec<u8>>,
    /// Numeric request identifier.
    pub reqid: u64,
    /// Bit-flag field from the wire.
    pub flags: u64,
    /// Expiration; zero means absent.
    pub exptime: u32,
    /// Value bytes, if the message carries a payload.
    pub value: Option<Vec<u8>>,
}

impl MessageEvent {
    /// Whether this is the end-of-stream lifecycle marker.
    pub fn is_end_marker(&self) -> bool {
        matches!(self.op, Some(Op::End))
    }
}

/// Accepts one decoded event at a time.
///
/// The external driver guarantees no concurrent invocation; each event is
/// processed to completion (or dropped) before the next is accepted.
pub trait TraceSink {
    fn accept(&mut self, event: &MessageEvent) -> Result<()>;
}
