//! Response envelope validation and extraction
//!
//! Every daemon reply is wrapped in `{"result": <string>, "arguments":
//! <object>}`. `unwrap` checks the `result` marker, then pulls out the
//! subtree the caller asked for.

use serde_json::Value;

use crate::error::{Result, TransmissionError};

/// The literal success marker in the `result` field
pub const SUCCESS: &str = "success";

/// What to pull out of a validated envelope.
#[derive(Debug, Clone, Copy)]
pub enum Select<'a> {
    /// Only confirm success; no payload wanted
    Ack,
    /// Extract the subtree at a dotted path, e.g. `arguments.torrents`
    Path(&'a str),
}

/// Outcome of an unwrapped daemon reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The daemon sent no envelope, or the requested subtree was absent.
    /// Fire-and-forget callers treat this as a benign no-op.
    Empty,
    /// The call succeeded and no payload was requested
    Done,
    /// The extracted payload subtree
    Data(Value),
}

impl Reply {
    /// Payload subtree, if any.
    pub fn into_data(self) -> Option<Value> {
        match self {
            Reply::Data(value) => Some(value),
            Reply::Empty | Reply::Done => None,
        }
    }

    /// Whether the reply carried no payload at all.
    pub fn is_empty(&self) -> bool {
        matches!(self, Reply::Empty)
    }
}

/// Validate an envelope and extract the selected portion.
///
/// An absent or empty envelope is not an error. A `result` other than
/// [`SUCCESS`] fails with the daemon's own message verbatim. Navigating
/// through a missing path segment yields [`Reply::Empty`]. A non-empty
/// `needed` set projects the extracted mapping onto exactly those keys.
pub fn unwrap(body: Option<Value>, select: Select<'_>, needed: &[&str]) -> Result<Reply> {
    let envelope = match body {
        None | Some(Value::Null) => return Ok(Reply::Empty),
        Some(Value::Object(map)) if map.is_empty() => return Ok(Reply::Empty),
        Some(envelope) => envelope,
    };

    let result = envelope
        .get("result")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if result != SUCCESS {
        return Err(TransmissionError::Daemon(result.to_string()));
    }

    match select {
        Select::Ack => Ok(Reply::Done),
        Select::Path(path) => match dig(envelope, path) {
            None | Some(Value::Null) => Ok(Reply::Empty),
            Some(mut tree) => {
                if !needed.is_empty() {
                    project(&mut tree, needed);
                }
                Ok(Reply::Data(tree))
            }
        },
    }
}

/// Navigate a dotted path by ownership, consuming the envelope.
fn dig(mut node: Value, path: &str) -> Option<Value> {
    for segment in path.split('.') {
        node = match node {
            Value::Object(mut map) => map.remove(segment)?,
            _ => return None,
        };
    }
    Some(node)
}

fn project(tree: &mut Value, needed: &[&str]) {
    if let Value::Object(map) = tree {
        map.retain(|key, _| needed.contains(&key.as_str()));
    }
}
