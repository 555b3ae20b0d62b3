//! App message framing.
//!
//! App message payloads start with a command byte and a transaction id.
//! Pushes additionally carry the owning application's uuid and a key/value
//! dictionary:
//!
//! ```text
//! +---------+------+------------+----------------+
//! | command | txid | uuid[0..16]| dict           |   (PUSH / REQUEST)
//! +---------+------+------------+----------------+
//! | command | txid |                                  (ACK / NACK)
//! +---------+------+
//! ```

use uuid::Uuid;

use crate::constants::*;
use crate::dict::{decode_dict, encode_dict, Tuple, TupleValue};
use crate::error::ProtocolError;

/// A decoded app message frame.
#[derive(Debug, Clone, PartialEq)]
pub enum AppMessageFrame {
    /// A key/value dictionary pushed by the peer.
    Push {
        /// Transaction id, echoed in the acknowledgement.
        transaction_id: u8,
        /// Owning application uuid.
        uuid: Uuid,
        /// Dictionary tuples, in wire order.
        tuples: Vec<Tuple>,
    },

    /// A request for the peer's current state.
    Request {
        /// Transaction id.
        transaction_id: u8,
        /// Owning application uuid.
        uuid: Uuid,
    },

    /// Positive acknowledgement of a previous push.
    Ack {
        /// Transaction id of the acknowledged push.
        transaction_id: u8,
    },

    /// Negative acknowledgement of a previous push.
    Nack {
        /// Transaction id of the rejected push.
        transaction_id: u8,
    },
}

impl AppMessageFrame {
    /// Decode an app message payload.
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        if payload.len() < 2 {
            return Err(ProtocolError::FrameTooShort {
                expected: 2,
                actual: payload.len(),
            });
        }

        let command = payload[0];
        let transaction_id = payload[1];

        match command {
            APPMSG_ACK => Ok(AppMessageFrame::Ack { transaction_id }),
            APPMSG_NACK => Ok(AppMessageFrame::Nack { transaction_id }),
            APPMSG_PUSH | APPMSG_REQUEST => {
                if payload.len() < 18 {
                    return Err(ProtocolError::FrameTooShort {
                        expected: 18,
                        actual: payload.len(),
                    });
                }
                let uuid = Uuid::from_slice(&payload[2..18])
                    .map_err(|e| ProtocolError::InvalidData(e.to_string()))?;

                if command == APPMSG_REQUEST {
                    Ok(AppMessageFrame::Request {
                        transaction_id,
                        uuid,
                    })
                } else {
                    let tuples = decode_dict(&payload[18..])?;
                    Ok(AppMessageFrame::Push {
                        transaction_id,
                        uuid,
                        tuples,
                    })
                }
            }
            other => Err(ProtocolError::UnknownCommand(other)),
        }
    }
}

/// Encode a dictionary push for `ENDPOINT_APP_MESSAGE`.
pub fn encode_push(
    transaction_id: u8,
    uuid: Uuid,
    tuples: &[Tuple],
) -> Result<Vec<u8>, ProtocolError> {
    let dict = encode_dict(tuples)?;
    let mut buf = Vec::with_capacity(18 + dict.len());
    buf.push(APPMSG_PUSH);
    buf.push(transaction_id);
    buf.extend_from_slice(uuid.as_bytes());
    buf.extend_from_slice(&dict);
    Ok(buf)
}

/// Encode a positive acknowledgement of a push.
pub fn encode_ack(transaction_id: u8) -> Vec<u8> {
    vec![APPMSG_ACK, transaction_id]
}

/// Encode a negative acknowledgement of a push.
pub fn encode_nack(transaction_id: u8) -> Vec<u8> {
    vec![APPMSG_NACK, transaction_id]
}

/// Encode a launch request for `ENDPOINT_APP_LAUNCH`.
///
/// The launch endpoint speaks the app message push format with a one-entry
/// dictionary setting the run state.
pub fn encode_app_launch(uuid: Uuid) -> Vec<u8> {
    let tuples = [Tuple::new(
        LAUNCH_KEY_RUN_STATE,
        TupleValue::Uint(LAUNCH_STATE_RUNNING),
    )];
    // A one-entry uint dictionary cannot exceed the size limits.
    encode_push(0, uuid, &tuples).expect("launch dictionary is statically valid")
}
