//! Engine.IO v4 / Socket.IO v4 text codec.
//!
//! Only the websocket transport and text frames are supported. A frame is
//! one Engine.IO packet: a single type digit followed by its payload. An
//! Engine.IO `message` (type `4`) carries one Socket.IO packet:
//!
//! ```text
//! <type>[<namespace>,][<ack id>][<json data>]
//! ```
//!
//! e.g. `40` (connect to `/`), `42["new_message",{...}]` (event).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::{RealtimeError, RealtimeResult};

/// Engine.IO protocol revision spoken by this client.
pub const ENGINE_IO_VERSION: &str = "4";

/// Default Socket.IO namespace.
pub const DEFAULT_NAMESPACE: &str = "/";

/// Payload of the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

/// One Engine.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Message(SocketPacket),
    Upgrade,
    Noop,
}

/// One Socket.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        ack_id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        ack_id: u64,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        data: Value,
    },
}

impl SocketPacket {
    /// Connect request for the default namespace.
    pub fn connect() -> Self {
        SocketPacket::Connect {
            namespace: DEFAULT_NAMESPACE.to_string(),
            data: None,
        }
    }

    /// Disconnect from the default namespace.
    pub fn disconnect() -> Self {
        SocketPacket::Disconnect {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Event with a single payload argument on the default namespace.
    pub fn event(name: impl Into<String>, payload: Value) -> Self {
        SocketPacket::Event {
            namespace: DEFAULT_NAMESPACE.to_string(),
            ack_id: None,
            name: name.into(),
            args: vec![payload],
        }
    }
}

impl From<SocketPacket> for EnginePacket {
    fn from(packet: SocketPacket) -> Self {
        EnginePacket::Message(packet)
    }
}

fn protocol_error(message: impl Into<String>) -> RealtimeError {
    RealtimeError::Protocol(message.into())
}

/// Split off the leading type digit.
fn split_type(text: &str) -> RealtimeResult<(u8, &str)> {
    let first = *text
        .as_bytes()
        .first()
        .ok_or_else(|| protocol_error("empty packet"))?;
    if !first.is_ascii_digit() {
        return Err(protocol_error(format!(
            "invalid packet type {:?}",
            first as char
        )));
    }
    Ok((first - b'0', &text[1..]))
}

/// Decode one websocket text frame.
pub fn decode(text: &str) -> RealtimeResult<EnginePacket> {
    let (kind, payload) = split_type(text)?;
    match kind {
        0 => Ok(EnginePacket::Open(serde_json::from_str(payload)?)),
        1 => Ok(EnginePacket::Close),
        2 => Ok(EnginePacket::Ping),
        3 => Ok(EnginePacket::Pong),
        4 => Ok(EnginePacket::Message(decode_socket(payload)?)),
        5 => Ok(EnginePacket::Upgrade),
        6 => Ok(EnginePacket::Noop),
        other => Err(protocol_error(format!("unknown engine packet type {other}"))),
    }
}

fn decode_socket(text: &str) -> RealtimeResult<SocketPacket> {
    let (kind, mut rest) = split_type(text)?;
    if kind == 5 || kind == 6 {
        return Err(protocol_error("binary packets are not supported"));
    }

    let namespace = if rest.starts_with('/') {
        let end = rest.find(',').unwrap_or(rest.len());
        let namespace = &rest[..end];
        rest = rest.get(end + 1..).unwrap_or("");
        namespace
    } else {
        DEFAULT_NAMESPACE
    }
    .to_string();

    let digits = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let ack_id = if digits > 0 {
        Some(
            rest[..digits]
                .parse::<u64>()
                .map_err(|e| protocol_error(format!("invalid ack id: {e}")))?,
        )
    } else {
        None
    };
    rest = &rest[digits..];

    let data: Option<Value> = if rest.is_empty() {
        None
    } else {
        Some(serde_json::from_str(rest)?)
    };

    match kind {
        0 => Ok(SocketPacket::Connect { namespace, data }),
        1 => Ok(SocketPacket::Disconnect { namespace }),
        2 => {
            let mut args = into_args(data)?;
            if args.is_empty() {
                return Err(protocol_error("event without a name"));
            }
            let name = match args.remove(0) {
                Value::String(name) => name,
                other => return Err(protocol_error(format!("event name is not a string: {other}"))),
            };
            Ok(SocketPacket::Event {
                namespace,
                ack_id,
                name,
                args,
            })
        }
        3 => Ok(SocketPacket::Ack {
            namespace,
            ack_id: ack_id.ok_or_else(|| protocol_error("ack without id"))?,
            args: into_args(data)?,
        }),
        4 => Ok(SocketPacket::ConnectError {
            namespace,
            data: data.unwrap_or(Value::Null),
        }),
        other => Err(protocol_error(format!("unknown socket packet type {other}"))),
    }
}

fn into_args(data: Option<Value>) -> RealtimeResult<Vec<Value>> {
    match data {
        Some(Value::Array(args)) => Ok(args),
        Some(other) => Err(protocol_error(format!("expected an array, got {other}"))),
        None => Ok(Vec::new()),
    }
}

/// Encode one packet as a websocket text frame.
pub fn encode(packet: &EnginePacket) -> RealtimeResult<String> {
    Ok(match packet {
        EnginePacket::Open(handshake) => format!("0{}", serde_json::to_string(handshake)?),
        EnginePacket::Close => "1".to_string(),
        EnginePacket::Ping => "2".to_string(),
        EnginePacket::Pong => "3".to_string(),
        EnginePacket::Message(packet) => format!("4{}", encode_socket(packet)?),
        EnginePacket::Upgrade => "5".to_string(),
        EnginePacket::Noop => "6".to_string(),
    })
}

fn encode_socket(packet: &SocketPacket) -> RealtimeResult<String> {
    fn header(kind: u8, namespace: &str, ack_id: Option<u64>) -> String {
        let mut out = kind.to_string();
        if namespace != DEFAULT_NAMESPACE {
            out.push_str(namespace);
            out.push(',');
        }
        if let Some(id) = ack_id {
            out.push_str(&id.to_string());
        }
        out
    }

    Ok(match packet {
        SocketPacket::Connect { namespace, data } => {
            let mut out = header(0, namespace, None);
            if let Some(data) = data {
                out.push_str(&serde_json::to_string(data)?);
            }
            out
        }
        SocketPacket::Disconnect { namespace } => header(1, namespace, None),
        SocketPacket::Event {
            namespace,
            ack_id,
            name,
            args,
        } => {
            let mut array = Vec::with_capacity(args.len() + 1);
            array.push(Value::String(name.clone()));
            array.extend(args.iter().cloned());
            header(2, namespace, *ack_id) + &serde_json::to_string(&array)?
        }
        SocketPacket::Ack {
            namespace,
            ack_id,
            args,
        } => header(3, namespace, Some(*ack_id)) + &serde_json::to_string(args)?,
        SocketPacket::ConnectError { namespace, data } => {
            header(4, namespace, None) + &serde_json::to_string(data)?
        }
    })
}

/// Turn a configured server URL into the websocket endpoint.
///
/// `http`/`https` become `ws`/`wss`; a bare host gets the `/socket.io/`
/// path; the Engine.IO query parameters are always appended.
pub fn socket_io_url(base: &str) -> RealtimeResult<Url> {
    let mut url =
        Url::parse(base).map_err(|e| RealtimeError::InvalidUrl(format!("{base}: {e}")))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(RealtimeError::InvalidUrl(format!(
                "{base}: unsupported scheme {other}"
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| RealtimeError::InvalidUrl(format!("{base}: cannot switch scheme")))?;

    if url.host_str().is_none() {
        return Err(RealtimeError::InvalidUrl(format!("{base}: missing host")));
    }
    if url.path() == "/" || url.path().is_empty() {
        url.set_path("/socket.io/");
    }

    url.query_pairs_mut()
        .append_pair("EIO", ENGINE_IO_VERSION)
        .append_pair("transport", "websocket");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_open_handshake() {
        let packet = decode(
            r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#,
        )
        .unwrap();
        match packet {
            EnginePacket::Open(handshake) => {
                assert_eq!(handshake.sid, "lv_VI97HAXpY6yYWAAAC");
                assert_eq!(handshake.ping_interval, 25000);
                assert_eq!(handshake.max_payload, Some(1_000_000));
            }
            other => panic!("unexpected packet {other:?}"),
        }
    }

    #[test]
    fn decodes_heartbeat_and_control_packets() {
        assert_eq!(decode("2").unwrap(), EnginePacket::Ping);
        assert_eq!(decode("3").unwrap(), EnginePacket::Pong);
        assert_eq!(decode("1").unwrap(), EnginePacket::Close);
        assert_eq!(decode("6").unwrap(), EnginePacket::Noop);
    }

    #[test]
    fn decodes_connect_ack() {
        assert_eq!(
            decode(r#"40{"sid":"abc"}"#).unwrap(),
            EnginePacket::Message(SocketPacket::Connect {
                namespace: "/".to_string(),
                data: Some(json!({"sid": "abc"})),
            })
        );
    }

    #[test]
    fn decodes_event() {
        let packet = decode(r#"42["new_message",{"id":"m1","content":"hi"}]"#).unwrap();
        assert_eq!(
            packet,
            EnginePacket::Message(SocketPacket::Event {
                namespace: "/".to_string(),
                ack_id: None,
                name: "new_message".to_string(),
                args: vec![json!({"id": "m1", "content": "hi"})],
            })
        );
    }

    #[test]
    fn decodes_namespace_and_ack_id() {
        let packet = decode(r#"42/chat,17["typing",true]"#).unwrap();
        assert_eq!(
            packet,
            EnginePacket::Message(SocketPacket::Event {
                namespace: "/chat".to_string(),
                ack_id: Some(17),
                name: "typing".to_string(),
                args: vec![json!(true)],
            })
        );

        assert_eq!(
            decode("41/chat,").unwrap(),
            EnginePacket::Message(SocketPacket::Disconnect {
                namespace: "/chat".to_string()
            })
        );
    }

    #[test]
    fn decodes_connect_error() {
        let packet = decode(r#"44{"message":"Not authorized"}"#).unwrap();
        assert_eq!(
            packet,
            EnginePacket::Message(SocketPacket::ConnectError {
                namespace: "/".to_string(),
                data: json!({"message": "Not authorized"}),
            })
        );
    }

    #[test]
    fn rejects_malformed_frames() {
        assert!(matches!(decode(""), Err(RealtimeError::Protocol(_))));
        assert!(matches!(decode("x"), Err(RealtimeError::Protocol(_))));
        assert!(matches!(decode("9"), Err(RealtimeError::Protocol(_))));
        assert!(matches!(decode("42[]"), Err(RealtimeError::Protocol(_))));
        assert!(matches!(decode("42[1,2]"), Err(RealtimeError::Protocol(_))));
        assert!(matches!(decode("42{\"a\":1}"), Err(RealtimeError::Protocol(_))));
        assert!(matches!(decode("451-[\"x\"]"), Err(RealtimeError::Protocol(_))));
        assert!(matches!(decode("42[\"x\""), Err(RealtimeError::Json(_))));
    }

    #[test]
    fn encodes_client_packets() {
        assert_eq!(encode(&SocketPacket::connect().into()).unwrap(), "40");
        assert_eq!(encode(&SocketPacket::disconnect().into()).unwrap(), "41");
        assert_eq!(encode(&EnginePacket::Pong).unwrap(), "3");
        assert_eq!(
            encode(&SocketPacket::event("join_channel", json!({"channelId": "c1"})).into())
                .unwrap(),
            r#"42["join_channel",{"channelId":"c1"}]"#
        );
    }

    #[test]
    fn encodes_namespaced_ack() {
        let packet = SocketPacket::Ack {
            namespace: "/chat".to_string(),
            ack_id: 3,
            args: vec![json!("ok")],
        };
        assert_eq!(
            encode(&packet.clone().into()).unwrap(),
            r#"43/chat,3["ok"]"#
        );
        assert_eq!(
            decode(r#"43/chat,3["ok"]"#).unwrap(),
            EnginePacket::from(packet)
        );
    }

    #[test]
    fn builds_websocket_url() {
        assert_eq!(
            socket_io_url("https://realtime.agora.social").unwrap().as_str(),
            "wss://realtime.agora.social/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            socket_io_url("http://localhost:3000").unwrap().as_str(),
            "ws://localhost:3000/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            socket_io_url("wss://rt.example.com/custom/path").unwrap().as_str(),
            "wss://rt.example.com/custom/path?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn rejects_unusable_urls() {
        assert!(matches!(
            socket_io_url("not a uri"),
            Err(RealtimeError::InvalidUrl(_))
        ));
        assert!(matches!(
            socket_io_url("ftp://realtime.agora.social"),
            Err(RealtimeError::InvalidUrl(_))
        ));
    }
}
