//! A seat in a room.

use getaway_cards::{Card, Suit};
use getaway_protocol::{GameMessage, PlayerId};
use getaway_transport::ConnectionId;
use tokio::sync::mpsc;

/// Channel for delivering outbound messages to a player's connection.
///
/// Unbounded so that a broadcast made under a room lock never waits on a
/// slow client. The connection's writer task drains it.
pub type PlayerSender = mpsc::UnboundedSender<GameMessage>;

/// The live connection currently sitting in a seat.
#[derive(Debug, Clone)]
pub struct ClientLink {
    pub conn_id: ConnectionId,
    pub sender: PlayerSender,
}

impl ClientLink {
    pub fn new(conn_id: ConnectionId, sender: PlayerSender) -> Self {
        Self { conn_id, sender }
    }
}

/// One seated player.
///
/// The seat index never changes once assigned. A player who disconnects
/// keeps the seat (and the hand) with `has_left` set, so the seat can be
/// taken over later.
#[derive(Debug, Clone)]
pub struct Player {
    pub(crate) id: PlayerId,
    pub(crate) seat: usize,
    pub(crate) hand: Vec<Card>,
    pub(crate) is_dealer: bool,
    pub(crate) has_left: bool,
    pub(crate) has_exited: bool,
    pub(crate) requested_restart: bool,
    pub(crate) link: Option<ClientLink>,
}

impl Player {
    pub(crate) fn new(id: PlayerId, seat: usize, link: Option<ClientLink>) -> Self {
        Self {
            id,
            seat,
            hand: Vec::new(),
            is_dealer: false,
            has_left: false,
            has_exited: false,
            requested_restart: false,
            link,
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn seat(&self) -> usize {
        self.seat
    }

    /// The cards in hand. Order carries no meaning, except that penalty
    /// cards sit at the front right after a deal.
    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn is_dealer(&self) -> bool {
        self.is_dealer
    }

    /// Disconnected; the seat is up for takeover.
    pub fn has_left(&self) -> bool {
        self.has_left
    }

    /// Emptied their hand this game.
    pub fn has_exited(&self) -> bool {
        self.has_exited
    }

    pub fn requested_restart(&self) -> bool {
        self.requested_restart
    }

    pub fn is_holding_cards(&self) -> bool {
        !self.hand.is_empty()
    }

    pub(crate) fn position_of(&self, card: Card) -> Option<usize> {
        self.hand.iter().position(|c| *c == card)
    }

    pub(crate) fn card_of_suit(&self, suit: Suit) -> Option<Card> {
        self.hand.iter().copied().find(|c| c.suit == suit)
    }

    pub(crate) fn conn_id(&self) -> Option<ConnectionId> {
        self.link.as_ref().map(|link| link.conn_id)
    }

    /// Best-effort delivery. A closed channel means the connection is
    /// already gone and the disconnect path will mark the seat.
    pub(crate) fn send(&self, msg: GameMessage) {
        if let Some(link) = &self.link {
            if link.sender.send(msg).is_err() {
                tracing::debug!(
                    player_id = %self.id,
                    conn_id = %link.conn_id,
                    "dropping message for closed connection"
                );
            }
        }
    }
}
