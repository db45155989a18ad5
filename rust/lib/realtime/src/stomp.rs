//! STOMP 1.2 frame codec.
//!
//! A frame on the wire:
//!
//! ```text
//! COMMAND\n
//! key:value\n
//! ...\n
//! \n
//! body\0
//! ```
//!
//! A bare EOL between frames is a heart-beat. Header values are escaped
//! (`\\`, `\n`, `\r`, `\c`) in every frame except CONNECT and CONNECTED.

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum StompError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("malformed frame: {0}")]
    Malformed(String),
}

// ── Command ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect,
    Stomp,
    Connected,
    Send,
    Subscribe,
    Unsubscribe,
    Ack,
    Nack,
    Disconnect,
    Message,
    Receipt,
    Error,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Stomp => "STOMP",
            Command::Connected => "CONNECTED",
            Command::Send => "SEND",
            Command::Subscribe => "SUBSCRIBE",
            Command::Unsubscribe => "UNSUBSCRIBE",
            Command::Ack => "ACK",
            Command::Nack => "NACK",
            Command::Disconnect => "DISCONNECT",
            Command::Message => "MESSAGE",
            Command::Receipt => "RECEIPT",
            Command::Error => "ERROR",
        }
    }

    pub fn parse(s: &str) -> Result<Self, StompError> {
        Ok(match s {
            "CONNECT" => Command::Connect,
            "STOMP" => Command::Stomp,
            "CONNECTED" => Command::Connected,
            "SEND" => Command::Send,
            "SUBSCRIBE" => Command::Subscribe,
            "UNSUBSCRIBE" => Command::Unsubscribe,
            "ACK" => Command::Ack,
            "NACK" => Command::Nack,
            "DISCONNECT" => Command::Disconnect,
            "MESSAGE" => Command::Message,
            "RECEIPT" => Command::Receipt,
            "ERROR" => Command::Error,
            other => return Err(StompError::UnknownCommand(other.to_string())),
        })
    }

    fn escapes_headers(&self) -> bool {
        !matches!(self, Command::Connect | Command::Stomp | Command::Connected)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── HeartBeat ───────────────────────────────────────────────────────

/// `heart-beat` header value, in milliseconds. Zero disables a direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeartBeat {
    /// How often this side sends.
    pub outgoing: u64,
    /// How often this side wants to hear from the peer.
    pub incoming: u64,
}

impl HeartBeat {
    pub fn new(outgoing: u64, incoming: u64) -> Self {
        Self { outgoing, incoming }
    }

    pub fn parse(value: &str) -> Result<Self, StompError> {
        let (out, inc) = value
            .split_once(',')
            .ok_or_else(|| StompError::Malformed(format!("heart-beat: {}", value)))?;
        let parse = |s: &str| {
            s.trim()
                .parse::<u64>()
                .map_err(|_| StompError::Malformed(format!("heart-beat: {}", value)))
        };
        Ok(Self::new(parse(out)?, parse(inc)?))
    }

    pub fn to_header(&self) -> String {
        format!("{},{}", self.outgoing, self.incoming)
    }

    /// Effective intervals for this (client) side given the server's
    /// CONNECTED header: each direction uses the larger of the two values,
    /// or is disabled if either side disables it.
    pub fn negotiate(&self, server: HeartBeat) -> HeartBeat {
        let pick = |ours: u64, theirs: u64| {
            if ours == 0 || theirs == 0 {
                0
            } else {
                ours.max(theirs)
            }
        };
        HeartBeat {
            outgoing: pick(self.outgoing, server.incoming),
            incoming: pick(self.incoming, server.outgoing),
        }
    }
}

// ── Frame ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub command: Command,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of a header. Repeated headers: the first one wins.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// CONNECT frame. The bearer token, if any, rides in an
    /// `Authorization` header since the WebSocket upgrade can't carry one.
    pub fn connect(host: &str, heart_beat: HeartBeat, bearer: Option<&str>) -> Self {
        let mut frame = Frame::new(Command::Connect)
            .with_header("accept-version", "1.2")
            .with_header("host", host)
            .with_header("heart-beat", heart_beat.to_header());
        if let Some(token) = bearer {
            frame = frame.with_header("Authorization", format!("Bearer {}", token));
        }
        frame
    }

    pub fn subscribe(id: &str, destination: &str) -> Self {
        Frame::new(Command::Subscribe)
            .with_header("id", id)
            .with_header("destination", destination)
            .with_header("ack", "auto")
    }

    pub fn disconnect() -> Self {
        Frame::new(Command::Disconnect)
    }

    /// Wire encoding, NUL-terminated. Adds `content-length` for non-empty
    /// bodies.
    pub fn encode(&self) -> Vec<u8> {
        let escape = self.command.escapes_headers();
        let mut out = Vec::with_capacity(64 + self.body.len());
        out.extend_from_slice(self.command.as_str().as_bytes());
        out.push(b'\n');
        for (k, v) in &self.headers {
            if escape {
                out.extend_from_slice(escape_header(k).as_bytes());
                out.push(b':');
                out.extend_from_slice(escape_header(v).as_bytes());
            } else {
                out.extend_from_slice(k.as_bytes());
                out.push(b':');
                out.extend_from_slice(v.as_bytes());
            }
            out.push(b'\n');
        }
        if !self.body.is_empty() && self.header("content-length").is_none() {
            out.extend_from_slice(format!("content-length:{}\n", self.body.len()).as_bytes());
        }
        out.push(b'\n');
        out.extend_from_slice(&self.body);
        out.push(0);
        out
    }
}

fn escape_header(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            c => out.push(c),
        }
    }
    out
}

fn unescape_header(s: &str) -> Result<String, StompError> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            other => {
                return Err(StompError::Malformed(format!(
                    "invalid header escape \\{}",
                    other.map(String::from).unwrap_or_default()
                )))
            }
        }
    }
    Ok(out)
}

// ── Decoder ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Frame(Frame),
    HeartBeat,
}

/// Largest frame the decoder will buffer, header block and body included.
pub const MAX_FRAME_LEN: usize = 1 << 20;

fn too_large() -> StompError {
    StompError::Malformed(format!("frame exceeds {} bytes", MAX_FRAME_LEN))
}

/// Incremental decoder. Feed it whatever the socket delivers; frames may
/// span several WebSocket messages and one message may hold several frames.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes received but not yet part of a complete frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    pub fn feed(&mut self, data: &[u8]) -> Result<Vec<Inbound>, StompError> {
        self.buf.extend_from_slice(data);
        let mut out = Vec::new();

        loop {
            if self.buf.first() == Some(&b'\n') {
                self.buf.drain(..1);
                out.push(Inbound::HeartBeat);
                continue;
            }
            if self.buf.starts_with(b"\r\n") {
                self.buf.drain(..2);
                out.push(Inbound::HeartBeat);
                continue;
            }
            if self.buf.is_empty() || self.buf == b"\r" {
                break;
            }

            let Some((head_end, body_start)) = find_blank_line(&self.buf) else {
                if self.buf.len() > MAX_FRAME_LEN {
                    return Err(too_large());
                }
                break;
            };
            let head = std::str::from_utf8(&self.buf[..head_end])
                .map_err(|_| StompError::Malformed("header block is not UTF-8".into()))?;
            let (command, headers) = parse_head(head)?;

            let length = headers
                .iter()
                .find(|(k, _)| k == "content-length")
                .map(|(_, v)| {
                    v.trim()
                        .parse::<usize>()
                        .map_err(|_| StompError::Malformed(format!("content-length: {}", v)))
                })
                .transpose()?;

            let body_end = match length {
                Some(n) => {
                    let end = body_start
                        .checked_add(n)
                        .filter(|end| *end < MAX_FRAME_LEN)
                        .ok_or_else(too_large)?;
                    if self.buf.len() <= end {
                        break;
                    }
                    if self.buf[end] != 0 {
                        return Err(StompError::Malformed(
                            "body longer than content-length".into(),
                        ));
                    }
                    end
                }
                None => match self.buf[body_start..].iter().position(|b| *b == 0) {
                    Some(pos) => body_start + pos,
                    None if self.buf.len() > MAX_FRAME_LEN => return Err(too_large()),
                    None => break,
                },
            };

            let body = self.buf[body_start..body_end].to_vec();
            self.buf.drain(..=body_end);
            out.push(Inbound::Frame(Frame {
                command,
                headers,
                body,
            }));
        }

        Ok(out)
    }
}

/// Locate the empty line ending the header block. Returns
/// `(end of header text, start of body)`.
fn find_blank_line(buf: &[u8]) -> Option<(usize, usize)> {
    for i in 0..buf.len() {
        if buf[i] != b'\n' {
            continue;
        }
        match (buf.get(i + 1), buf.get(i + 2)) {
            (Some(b'\n'), _) => return Some((i, i + 2)),
            (Some(b'\r'), Some(b'\n')) => return Some((i, i + 3)),
            _ => {}
        }
    }
    None
}

fn parse_head(head: &str) -> Result<(Command, Vec<(String, String)>), StompError> {
    let mut lines = head.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));
    let command = Command::parse(lines.next().unwrap_or_default())?;
    let escaped = command.escapes_headers();

    let mut headers = Vec::new();
    for line in lines {
        let (k, v) = line
            .split_once(':')
            .ok_or_else(|| StompError::Malformed(format!("header line: {}", line)))?;
        if escaped {
            headers.push((unescape_header(k)?, unescape_header(v)?));
        } else {
            headers.push((k.to_string(), v.to_string()));
        }
    }
    Ok((command, headers))
}
