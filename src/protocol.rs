//! Binary messages exchanged with the R host process.
//!
//! A frame is laid out as
//!
//! ```text
//! u64 id (LE) | u64 request id (LE) | ASCII name | 0x00 | UTF-8 JSON array | 0x00 | blob
//! ```
//!
//! The blob has no length prefix: it is every byte left in the frame. The transport must
//! therefore deliver exactly one message per [decode] call. A transport that can split or
//! coalesce frames needs its own length framing around these bytes.
//!
//! Decoding untrusted bytes never panics. Anything that does not fit the layout is reported as
//! [MalformedData].

use std::fmt;

use serde_json::Value;
use tracing::warn;

const HEADER_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    pub id: u64,
    /// Id of the request this message answers, or 0 for requests and notifications.
    pub request_id: u64,
    pub name: String,
    pub args: Vec<Value>,
    pub blob: Vec<u8>,
}

/// What [decode] found wrong, and roughly where.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed message at byte {offset}: {kind}")]
pub struct MalformedData {
    pub kind: MalformedKind,
    /// Byte offset in the frame where the problem was found.
    pub offset: usize,
}

impl MalformedData {
    pub fn new(kind: MalformedKind, offset: usize) -> Self {
        MalformedData { kind, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedKind {
    /// Fewer than 16 bytes for the id and request id.
    TruncatedHeader,
    MissingNameTerminator,
    EmptyName,
    NonAsciiName,
    MissingArgsTerminator,
    InvalidUtf8Args,
    InvalidJson(String),
    /// Valid JSON, but not an array.
    ArgsNotArray,
    ArgumentMissing { index: usize },
    ArgumentType { index: usize, expected: &'static str },
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use MalformedKind::*;
        match self {
            TruncatedHeader => write!(f, "truncated header"),
            MissingNameTerminator => write!(f, "name is not NUL terminated"),
            EmptyName => write!(f, "empty name"),
            NonAsciiName => write!(f, "name is not ASCII"),
            MissingArgsTerminator => write!(f, "arguments are not NUL terminated"),
            InvalidUtf8Args => write!(f, "arguments are not valid UTF-8"),
            InvalidJson(error) => write!(f, "arguments are not valid JSON: {error}"),
            ArgsNotArray => write!(f, "arguments are not a JSON array"),
            ArgumentMissing { index } => write!(f, "argument {index} is missing"),
            ArgumentType { index, expected } => write!(f, "argument {index} is not {expected}"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    /// Names must be non-empty ASCII without NUL.
    #[error("invalid message name {0:?}")]
    InvalidName(String),
    #[error("cannot serialize arguments: {0}")]
    Json(#[from] serde_json::Error),
}

impl Message {
    pub fn new(id: u64, name: impl Into<String>, args: Vec<Value>) -> Self {
        Message {
            id,
            request_id: 0,
            name: name.into(),
            args,
            blob: Vec::new(),
        }
    }

    /// A message answering `request`.
    pub fn response_to(
        request: &Message,
        id: u64,
        name: impl Into<String>,
        args: Vec<Value>,
    ) -> Self {
        Message {
            request_id: request.id,
            ..Message::new(id, name, args)
        }
    }

    pub fn with_blob(mut self, blob: Vec<u8>) -> Self {
        self.blob = blob;
        self
    }

    pub fn is_response(&self) -> bool {
        self.request_id != 0
    }

    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        if !is_valid_name(&self.name) {
            return Err(EncodeError::InvalidName(self.name.clone()));
        }
        let args = serde_json::to_string(&self.args)?;

        let mut bytes =
            Vec::with_capacity(HEADER_LEN + self.name.len() + args.len() + 2 + self.blob.len());
        bytes.extend_from_slice(&self.id.to_le_bytes());
        bytes.extend_from_slice(&self.request_id.to_le_bytes());
        bytes.extend_from_slice(self.name.as_bytes());
        bytes.push(0);
        bytes.extend_from_slice(args.as_bytes());
        bytes.push(0);
        bytes.extend_from_slice(&self.blob);
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Message, MalformedData> {
        let result = read_message(bytes);
        if let Err(error) = &result {
            warn!(len = bytes.len(), %error, "rejected message frame");
        }
        result
    }

    pub fn arg(&self, index: usize) -> Result<&Value, MalformedData> {
        self.args
            .get(index)
            .ok_or_else(|| self.argument_error(MalformedKind::ArgumentMissing { index }))
    }

    pub fn arg_str(&self, index: usize) -> Result<&str, MalformedData> {
        self.arg(index)?
            .as_str()
            .ok_or_else(|| self.type_error(index, "a string"))
    }

    pub fn arg_i64(&self, index: usize) -> Result<i64, MalformedData> {
        self.arg(index)?
            .as_i64()
            .ok_or_else(|| self.type_error(index, "an integer"))
    }

    pub fn arg_u64(&self, index: usize) -> Result<u64, MalformedData> {
        self.arg(index)?
            .as_u64()
            .ok_or_else(|| self.type_error(index, "an unsigned integer"))
    }

    pub fn arg_f64(&self, index: usize) -> Result<f64, MalformedData> {
        self.arg(index)?
            .as_f64()
            .ok_or_else(|| self.type_error(index, "a number"))
    }

    pub fn arg_bool(&self, index: usize) -> Result<bool, MalformedData> {
        self.arg(index)?
            .as_bool()
            .ok_or_else(|| self.type_error(index, "a boolean"))
    }

    fn type_error(&self, index: usize, expected: &'static str) -> MalformedData {
        self.argument_error(MalformedKind::ArgumentType { index, expected })
    }

    /// Argument errors point at the start of the arguments in the encoded frame.
    fn argument_error(&self, kind: MalformedKind) -> MalformedData {
        MalformedData::new(kind, HEADER_LEN + self.name.len() + 1)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)?;
        if self.is_response() {
            write!(f, " (re #{})", self.request_id)?;
        }
        write!(f, " {} [{} args]", self.name, self.args.len())?;
        if !self.blob.is_empty() {
            write!(f, " +{} bytes", self.blob.len())?;
        }
        Ok(())
    }
}

pub fn encode(message: &Message) -> Result<Vec<u8>, EncodeError> {
    message.encode()
}

pub fn decode(bytes: &[u8]) -> Result<Message, MalformedData> {
    Message::decode(bytes)
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.is_ascii() && !name.contains('\0')
}

fn read_message(bytes: &[u8]) -> Result<Message, MalformedData> {
    let mut reader = Reader { bytes, offset: 0 };

    let id = reader.read_u64()?;
    let request_id = reader.read_u64()?;

    let name_start = reader.offset;
    let name = reader.read_until_nul(MalformedKind::MissingNameTerminator)?;
    if name.is_empty() {
        return Err(MalformedData::new(MalformedKind::EmptyName, name_start));
    }
    if !name.is_ascii() {
        return Err(MalformedData::new(MalformedKind::NonAsciiName, name_start));
    }
    let name = String::from_utf8_lossy(name).into_owned();

    let args_start = reader.offset;
    let args = reader.read_until_nul(MalformedKind::MissingArgsTerminator)?;
    let args = std::str::from_utf8(args)
        .map_err(|_| MalformedData::new(MalformedKind::InvalidUtf8Args, args_start))?;
    let args = match serde_json::from_str::<Value>(args) {
        Ok(Value::Array(args)) => args,
        Ok(_) => return Err(MalformedData::new(MalformedKind::ArgsNotArray, args_start)),
        Err(error) => {
            return Err(MalformedData::new(
                MalformedKind::InvalidJson(error.to_string()),
                args_start,
            ));
        }
    };

    Ok(Message {
        id,
        request_id,
        name,
        args,
        blob: reader.rest().to_vec(),
    })
}

struct Reader<'b> {
    bytes: &'b [u8],
    offset: usize,
}

impl<'b> Reader<'b> {
    fn read_u64(&mut self) -> Result<u64, MalformedData> {
        let field = self
            .bytes
            .get(self.offset..self.offset + 8)
            .and_then(|b| <[u8; 8]>::try_from(b).ok())
            .ok_or(MalformedData::new(MalformedKind::TruncatedHeader, self.offset))?;
        self.offset += 8;
        Ok(u64::from_le_bytes(field))
    }

    /// Bytes up to the next NUL. The NUL is consumed but not returned.
    fn read_until_nul(&mut self, missing: MalformedKind) -> Result<&'b [u8], MalformedData> {
        let rest = self.rest();
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(MalformedData::new(missing, self.bytes.len()))?;
        self.offset += len + 1;
        Ok(&rest[..len])
    }

    fn rest(&self) -> &'b [u8] {
        self.bytes.get(self.offset..).unwrap_or_default()
    }
}
