//! Commands and responses
//!
//! In-process they travel as typed values. The `(tag, payload)` wire form
//! matches what scripting front ends send:
//!
//! | command              | response                                              |
//! |----------------------|-------------------------------------------------------|
//! | `("fwd", {dist})`    | `("fwd", {s, d, e?: "collision"|"Already moving", c?})` |
//! | `("turn", {angle})`  | `("turn", {s, d, e?: "Already moving"})`               |
//! | `("pick", {})`       | `("pick", {n})`                                        |

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MoveError, ProtocolError};
use crate::sim::{ColliderKind, MoveResult};

pub const TAG_FORWARD: &str = "fwd";
pub const TAG_TURN: &str = "turn";
pub const TAG_PICK: &str = "pick";

/// A request from the control thread
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Forward { dist: f32 },
    Turn { angle: f32 },
    Pick,
}

#[derive(Debug, Serialize, Deserialize)]
struct ForwardParams {
    dist: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct TurnParams {
    angle: f32,
}

fn decode<T: serde::de::DeserializeOwned>(tag: &str, payload: &Value) -> Result<T, ProtocolError> {
    T::deserialize(payload).map_err(|e| ProtocolError::MalformedPayload {
        tag: tag.to_string(),
        reason: e.to_string(),
    })
}

fn encode<T: Serialize>(value: &T) -> Value {
    // The reply structs only hold bools, numbers and plain enums, all of
    // which serialize without error
    serde_json::to_value(value).unwrap_or(Value::Null)
}

impl Command {
    pub fn tag(&self) -> &'static str {
        match self {
            Command::Forward { .. } => TAG_FORWARD,
            Command::Turn { .. } => TAG_TURN,
            Command::Pick => TAG_PICK,
        }
    }

    pub fn to_wire(&self) -> (&'static str, Value) {
        let payload = match *self {
            Command::Forward { dist } => encode(&ForwardParams { dist }),
            Command::Turn { angle } => encode(&TurnParams { angle }),
            Command::Pick => Value::Object(Default::default()),
        };
        (self.tag(), payload)
    }

    /// Decode a wire command. Unknown tags are a protocol error, not a recoverable one.
    pub fn from_wire(tag: &str, payload: &Value) -> Result<Self, ProtocolError> {
        match tag {
            TAG_FORWARD => {
                let ForwardParams { dist } = decode(tag, payload)?;
                Ok(Command::Forward { dist })
            }
            TAG_TURN => {
                let TurnParams { angle } = decode(tag, payload)?;
                Ok(Command::Turn { angle })
            }
            TAG_PICK => Ok(Command::Pick),
            other => Err(ProtocolError::InvalidCommand(other.to_string())),
        }
    }
}

/// Error strings carried in the `e` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorTag {
    #[serde(rename = "collision")]
    Collision,
    #[serde(rename = "Already moving")]
    AlreadyMoving,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForwardReply {
    pub s: bool,
    /// Distance moved
    pub d: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<ErrorTag>,
    /// What the robot ran into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<ColliderKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnReply {
    pub s: bool,
    /// Angle turned (radians)
    pub d: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<ErrorTag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickReply {
    /// Rocks picked up
    pub n: usize,
}

/// A reply to the control thread. Exactly one per accepted or rejected command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Response {
    Forward(ForwardReply),
    Turn(TurnReply),
    Pick(PickReply),
}

impl Response {
    /// Reply for a move command the robot refused to start
    pub fn rejected(command: &Command, err: MoveError) -> Self {
        log::debug!("Rejected {}: {}", command.tag(), err);
        match command {
            Command::Forward { .. } => Response::Forward(ForwardReply {
                s: false,
                d: 0.0,
                e: Some(ErrorTag::AlreadyMoving),
                c: None,
            }),
            Command::Turn { .. } => Response::Turn(TurnReply {
                s: false,
                d: 0.0,
                e: Some(ErrorTag::AlreadyMoving),
            }),
            Command::Pick => Response::Pick(PickReply { n: 0 }),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Response::Forward(_) => TAG_FORWARD,
            Response::Turn(_) => TAG_TURN,
            Response::Pick(_) => TAG_PICK,
        }
    }

    /// Did the command do what was asked? Picks always count as successful.
    pub fn success(&self) -> bool {
        match self {
            Response::Forward(reply) => reply.s,
            Response::Turn(reply) => reply.s,
            Response::Pick(_) => true,
        }
    }

    pub fn to_wire(&self) -> (&'static str, Value) {
        let payload = match self {
            Response::Forward(reply) => encode(reply),
            Response::Turn(reply) => encode(reply),
            Response::Pick(reply) => encode(reply),
        };
        (self.tag(), payload)
    }

    pub fn from_wire(tag: &str, payload: &Value) -> Result<Self, ProtocolError> {
        match tag {
            TAG_FORWARD => decode(tag, payload).map(Response::Forward),
            TAG_TURN => decode(tag, payload).map(Response::Turn),
            TAG_PICK => decode(tag, payload).map(Response::Pick),
            other => Err(ProtocolError::InvalidCommand(other.to_string())),
        }
    }
}

impl From<MoveResult> for Response {
    fn from(result: MoveResult) -> Self {
        match result {
            MoveResult::Forward {
                distance_moved,
                collision,
            } => Response::Forward(ForwardReply {
                s: collision.is_none(),
                d: distance_moved,
                e: collision.map(|_| ErrorTag::Collision),
                c: collision.map(|hit| hit.kind),
            }),
            MoveResult::Turn { angle_moved } => Response::Turn(TurnReply {
                s: true,
                d: angle_moved,
                e: None,
            }),
        }
    }
}
