//! Wire protocol for Getaway.
//!
//! - **Types** ([`GameMessage`], [`Event`], [`RoomResponse`],
//!   [`DealResponse`], ...): the JSON shapes exchanged with browser
//!   clients. Field names follow the existing client, not Rust naming.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes to messages and back.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (GameMessage) → Room (typed requests)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    DealResponse, Event, GameMessage, PlayerCard, PlayerId, Response, RoomCreationRequest,
    RoomId, RoomResponse, TurnRequest,
};
