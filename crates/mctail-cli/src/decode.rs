//! Incremental memcached ASCII protocol decoder.
//!
//! Turns the raw byte stream of one debug channel into decoded
//! [`MessageEvent`]s. Framing is line-based, except after storage commands
//! and `VALUE` replies, which announce a fixed-size data block. Lines that
//! do not parse are skipped: a trace tail must keep going when it attaches
//! mid-stream, so decoding is best-effort per line.

use mctail_core::event::{MessageEvent, Op, ReplyStatus};

/// Lines longer than this without a newline are assumed to be garbage from
/// attaching mid-value and are dropped to bound memory.
const MAX_LINE_LEN: usize = 64 * 1024;

/// Stateful decoder for one channel's byte stream.
#[derive(Default)]
pub struct Decoder {
    buf: Vec<u8>,
    pending: Option<Pending>,
    next_reqid: u64,
}

/// An event waiting for its announced data block.
struct Pending {
    event: MessageEvent,
    needed: usize,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds raw bytes, appending every completed event to `out`.
    pub fn feed(&mut self, bytes: &[u8], out: &mut Vec<MessageEvent>) {
        self.buf.extend_from_slice(bytes);
        loop {
            if let Some(pending) = self.pending.take() {
                if self.buf.len() < pending.needed {
                    self.pending = Some(pending);
                    return;
                }
                let mut event = pending.event;
                event.value = Some(self.buf[..pending.needed].to_vec());
                self.consume(pending.needed);
                self.skip_line_ending();
                out.push(event);
                continue;
            }

            let Some(newline) = self.buf.iter().position(|&b| b == b'\n') else {
                if self.buf.len() > MAX_LINE_LEN {
                    tracing::debug!(len = self.buf.len(), "dropping oversized partial line");
                    self.buf.clear();
                }
                return;
            };
            let mut line = self.buf[..newline].to_vec();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            self.consume(newline + 1);
            self.parse_line(&line, out);
        }
    }

    fn consume(&mut self, n: usize) {
        self.buf.drain(..n);
    }

    /// Eats the `\r\n` terminating a data block, tolerating a bare `\n`.
    fn skip_line_ending(&mut self) {
        if self.buf.first() == Some(&b'\r') {
            self.buf.remove(0);
        }
        if self.buf.first() == Some(&b'\n') {
            self.buf.remove(0);
        }
    }

    fn next_event(&mut self) -> MessageEvent {
        self.next_reqid += 1;
        MessageEvent {
            reqid: self.next_reqid,
            ..Default::default()
        }
    }

    fn parse_line(&mut self, line: &[u8], out: &mut Vec<MessageEvent>) {
        let Ok(line) = std::str::from_utf8(line) else {
            tracing::debug!("skipping non-utf8 line");
            return;
        };
        let mut tokens = line.split_ascii_whitespace();
        let Some(first) = tokens.next() else {
            return;
        };
        let rest: Vec<&str> = tokens.collect();

        match first {
            "set" => self.parse_storage(Op::Set, &rest),
            "add" => self.parse_storage(Op::Add, &rest),
            "replace" => self.parse_storage(Op::Replace, &rest),
            "append" => self.parse_storage(Op::Append, &rest),
            "prepend" => self.parse_storage(Op::Prepend, &rest),
            "cas" => self.parse_storage(Op::Cas, &rest),
            "get" | "gets" => {
                let op = if first == "get" { Op::Get } else { Op::Gets };
                for key in &rest {
                    let mut event = self.next_event();
                    event.op = Some(op);
                    event.key = Some(key.as_bytes().to_vec());
                    out.push(event);
                }
            }
            "delete" | "incr" | "decr" => {
                let Some(key) = rest.first() else {
                    tracing::debug!(line, "missing key");
                    return;
                };
                let mut event = self.next_event();
                event.op = Some(match first {
                    "delete" => Op::Delete,
                    "incr" => Op::Incr,
                    _ => Op::Decr,
                });
                event.key = Some(key.as_bytes().to_vec());
                out.push(event);
            }
            "touch" => {
                let (Some(key), Some(exptime)) = (rest.first(), rest.get(1)) else {
                    tracing::debug!(line, "malformed touch");
                    return;
                };
                let Ok(exptime) = exptime.parse() else {
                    tracing::debug!(line, "malformed touch exptime");
                    return;
                };
                let mut event = self.next_event();
                event.op = Some(Op::Touch);
                event.key = Some(key.as_bytes().to_vec());
                event.exptime = exptime;
                out.push(event);
            }
            "VALUE" => self.parse_value_reply(&rest),
            "END" => {
                let mut event = self.next_event();
                event.op = Some(Op::End);
                out.push(event);
            }
            "STORED" => out.push(self.reply(ReplyStatus::Stored)),
            "NOT_STORED" => out.push(self.reply(ReplyStatus::NotStored)),
            "EXISTS" => out.push(self.reply(ReplyStatus::Exists)),
            "NOT_FOUND" => out.push(self.reply(ReplyStatus::NotFound)),
            "DELETED" => out.push(self.reply(ReplyStatus::Deleted)),
            "TOUCHED" => out.push(self.reply(ReplyStatus::Touched)),
            "ERROR" => out.push(self.reply(ReplyStatus::Error)),
            "CLIENT_ERROR" => out.push(self.reply(ReplyStatus::ClientError)),
            "SERVER_ERROR" => out.push(self.reply(ReplyStatus::ServerError)),
            _ => tracing::debug!(line, "unrecognized line"),
        }
    }

    fn reply(&mut self, status: ReplyStatus) -> MessageEvent {
        let mut event = self.next_event();
        event.reply = Some(status);
        event
    }

    /// `<op> <key> <flags> <exptime> <bytes> [casid] [noreply]`
    fn parse_storage(&mut self, op: Op, rest: &[&str]) {
        let (Some(key), Some(flags), Some(exptime), Some(bytes)) =
            (rest.first(), rest.get(1), rest.get(2), rest.get(3))
        else {
            tracing::debug!(op = op.wire_name(), "malformed storage command");
            return;
        };
        let (Ok(flags), Ok(exptime), Ok(needed)) =
            (flags.parse(), exptime.parse(), bytes.parse::<usize>())
        else {
            tracing::debug!(op = op.wire_name(), "malformed storage fields");
            return;
        };
        let mut event = self.next_event();
        event.op = Some(op);
        event.key = Some(key.as_bytes().to_vec());
        event.flags = flags;
        event.exptime = exptime;
        self.pending = Some(Pending { event, needed });
    }

    /// `VALUE <key> <flags> <bytes> [casid]`
    fn parse_value_reply(&mut self, rest: &[&str]) {
        let (Some(key), Some(flags), Some(bytes)) = (rest.first(), rest.get(1), rest.get(2)) else {
            tracing::debug!("malformed VALUE reply");
            return;
        };
        let (Ok(flags), Ok(needed)) = (flags.parse(), bytes.parse::<usize>()) else {
            tracing::debug!("malformed VALUE fields");
            return;
        };
        let mut event = self.next_event();
        event.reply = Some(ReplyStatus::Found);
        event.key = Some(key.as_bytes().to_vec());
        event.flags = flags;
        self.pending = Some(Pending { event, needed });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &[u8]) -> Vec<MessageEvent> {
        let mut out = Vec::new();
        Decoder::new().feed(input, &mut out);
        out
    }

    /// Storage command with its data block.
    #[test]
    fn test_set_with_value() {
        let events = decode(b"set user:1 2 120 5\r\nhello\r\n");
        assert_eq!(events.len(), 1);
        let e = &events[0];
        assert_eq!(e.op, Some(Op::Set));
        assert_eq!(e.key.as_deref(), Some(b"user:1".as_slice()));
        assert_eq!(e.flags, 2);
        assert_eq!(e.exptime, 120);
        assert_eq!(e.value.as_deref(), Some(b"hello".as_slice()));
    }

    /// Value bytes may contain newlines; only the byte count frames them.
    #[test]
    fn test_value_with_embedded_newline() {
        let events = decode(b"set k 0 0 7\r\nab\r\ncd\r\n");
        assert_eq!(events[0].value.as_deref(), Some(b"ab\r\ncd".as_slice()));
    }

    /// Multi-key get produces one event per key.
    #[test]
    fn test_get_multi_key() {
        let events = decode(b"get a b c\r\n");
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.op == Some(Op::Get)));
        assert_eq!(events[2].key.as_deref(), Some(b"c".as_slice()));
    }

    /// VALUE reply carries key, flags and the payload.
    #[test]
    fn test_value_reply_and_end() {
        let events = decode(b"VALUE user:1 2 5\r\nworld\r\nEND\r\n");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].reply, Some(ReplyStatus::Found));
        assert_eq!(events[0].flags, 2);
        assert_eq!(events[0].value.as_deref(), Some(b"world".as_slice()));
        assert!(events[1].is_end_marker());
    }

    /// Bare reply lines decode to result-only events.
    #[test]
    fn test_bare_replies() {
        let events = decode(b"STORED\r\nNOT_FOUND\r\n");
        assert_eq!(events[0].reply, Some(ReplyStatus::Stored));
        assert_eq!(events[0].op, None);
        assert_eq!(events[1].reply, Some(ReplyStatus::NotFound));
    }

    /// touch parses its exptime.
    #[test]
    fn test_touch() {
        let events = decode(b"touch k 300\r\n");
        assert_eq!(events[0].op, Some(Op::Touch));
        assert_eq!(events[0].exptime, 300);
    }

    /// cas carries an extra token after bytes; it is tolerated.
    #[test]
    fn test_cas_extra_token() {
        let events = decode(b"cas k 0 0 2 99\r\nhi\r\n");
        assert_eq!(events[0].op, Some(Op::Cas));
        assert_eq!(events[0].value.as_deref(), Some(b"hi".as_slice()));
    }

    /// Unparseable lines are skipped, later lines still decode.
    #[test]
    fn test_garbage_skipped() {
        let events = decode(b"wat?\r\nset k 0 0 1\r\nx\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].op, Some(Op::Set));
    }

    /// Events complete across arbitrarily split feeds.
    #[test]
    fn test_incremental_feeds() {
        let mut decoder = Decoder::new();
        let mut out = Vec::new();
        for chunk in [b"set k 0 0 5\r".as_slice(), b"\nhel", b"lo\r\n"] {
            decoder.feed(chunk, &mut out);
        }
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value.as_deref(), Some(b"hello".as_slice()));
    }

    /// reqids increase monotonically within a channel.
    #[test]
    fn test_reqids_monotonic() {
        let events = decode(b"get a\r\nget b\r\n");
        assert!(events[0].reqid < events[1].reqid);
    }

    /// Bare LF line endings are accepted.
    #[test]
    fn test_bare_lf() {
        let events = decode(b"set k 0 0 2\nhi\nSTORED\n");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].value.as_deref(), Some(b"hi".as_slice()));
        assert_eq!(events[1].reply, Some(ReplyStatus::Stored));
    }
}
