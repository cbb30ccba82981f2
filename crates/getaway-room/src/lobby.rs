//! Lobby: the operations a connection handler performs.
//!
//! Each operation resolves the room through the registry, takes the room
//! lock, mutates, and broadcasts before releasing it. Registry calls are
//! never made while waiting on a room lock, only while holding one, and
//! the registry itself never touches room locks, so the two can't
//! deadlock.

use std::sync::Arc;

use getaway_cards::Card;
use getaway_protocol::{Event, GameMessage, PlayerId, ProtocolError, RoomCreationRequest, RoomId};
use getaway_transport::ConnectionId;
use rand::Rng;
use rand::distr::Alphanumeric;
use tokio::sync::Mutex;

use crate::{
    ClientLink, GamePhase, JoinOutcome, LobbyConfig, Registry, RegistryHandle, RestartVote, Room,
    RoomError, SharedRoom, TurnOutcome,
};

/// Entry point for room operations from the connection handlers.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct Lobby {
    registry: RegistryHandle,
    config: LobbyConfig,
}

impl Lobby {
    /// Creates a lobby with its own registry task. Must be called inside a
    /// Tokio runtime.
    pub fn new(config: LobbyConfig) -> Self {
        let registry = Registry::spawn(config.registry_channel_size);
        Self { registry, config }
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    /// Creates a room and seats its host.
    ///
    /// An empty `room_id` gets a generated one, regenerated until it is
    /// free. Naming a room that already exists joins it instead and
    /// ignores `request`. Returns the id of the room the host ended up in.
    pub async fn create_room(
        &self,
        link: ClientLink,
        player_id: PlayerId,
        room_id: RoomId,
        request: Option<RoomCreationRequest>,
    ) -> Result<RoomId, RoomError> {
        let generated = room_id.is_empty();
        if !generated && self.registry.get_room(&room_id).await?.is_some() {
            self.join_room(link, player_id, room_id.clone()).await?;
            return Ok(room_id);
        }

        let request = request.ok_or_else(|| {
            ProtocolError::InvalidMessage("RoomCreate requires a player count".to_string())
        })?;
        if !self.config.allows_player_count(request.player_count) {
            return Err(RoomError::InvalidPlayerCount {
                requested: request.player_count,
                min: self.config.min_players,
                max: self.config.max_players,
            });
        }

        let room_id = loop {
            let candidate = if generated {
                self.generate_room_id()
            } else {
                room_id.clone()
            };
            let room: SharedRoom = Arc::new(Mutex::new(Room::new(
                candidate.clone(),
                request.player_count,
            )));
            if self.registry.insert_room(candidate.clone(), room).await? {
                break candidate;
            }
            if !generated {
                // Someone created it between the lookup and the insert.
                self.join_room(link, player_id, room_id.clone()).await?;
                return Ok(room_id);
            }
        };

        if let Err(e) = self.join_room(link, player_id, room_id.clone()).await {
            self.discard_if_empty(&room_id).await?;
            return Err(e);
        }
        Ok(room_id)
    }

    /// Removes a room nobody ever sat in. Such a room has no seat whose
    /// departure would remove it later.
    async fn discard_if_empty(&self, room_id: &RoomId) -> Result<(), RoomError> {
        let Some(shared) = self.registry.get_room(room_id).await? else {
            return Ok(());
        };
        let mut room = shared.lock().await;
        if room.players().is_empty() && !room.is_closed() {
            room.close();
            self.registry.delete_room(room_id).await?;
            tracing::debug!(%room_id, "discarded room whose host never sat down");
        }
        Ok(())
    }

    /// Seats a player and broadcasts the new membership.
    ///
    /// Filling the room deals the first game. Coming back to a seat (own
    /// or taken over) re-sends the deal so the newcomer sees the game in
    /// progress.
    pub async fn join_room(
        &self,
        link: ClientLink,
        player_id: PlayerId,
        room_id: RoomId,
    ) -> Result<JoinOutcome, RoomError> {
        let shared = self.find_room(&room_id).await?;
        let conn_id = link.conn_id;

        let mut room = shared.lock().await;
        let outcome = room.join(player_id.clone(), link)?;
        match &outcome {
            JoinOutcome::TookOver { replaced, .. } => {
                tracing::info!(%room_id, %player_id, %replaced, "player took over seat");
            }
            _ => tracing::info!(%room_id, %player_id, seat = outcome.seat(), "player joined"),
        }

        room.broadcast_membership(Event::PlayerJoin, &player_id);
        match outcome {
            JoinOutcome::Seated { .. } if room.is_full() => {
                room.start_game();
                room.broadcast_deal();
            }
            JoinOutcome::Seated { .. } => {}
            JoinOutcome::Reclaimed { .. } | JoinOutcome::TookOver { .. } => {
                if room.phase() != GamePhase::Idle {
                    room.broadcast_deal();
                }
            }
        }
        drop(room);

        // A connection plays in one room at a time; its old seat is freed.
        if let Some(previous) = self.registry.associate(conn_id, room_id.clone()).await? {
            if previous != room_id {
                self.leave_room(conn_id, &previous).await?;
            }
        }
        Ok(outcome)
    }

    /// Plays a card and broadcasts the result: everyone's deal view, a
    /// `PlayerWin` per player who ran out of cards, and `GameOver` naming
    /// the loser when the game ends.
    pub async fn play_turn(
        &self,
        conn_id: ConnectionId,
        player_id: PlayerId,
        room_id: RoomId,
        card: Card,
    ) -> Result<TurnOutcome, RoomError> {
        let shared = self.find_room(&room_id).await?;
        let mut room = shared.lock().await;
        check_seat(&room, &player_id, conn_id)?;

        let outcome = room.apply_turn(&player_id, card).inspect_err(|e| {
            tracing::debug!(%room_id, %player_id, %card, error = %e, "turn rejected");
        })?;

        room.broadcast_deal();
        for winner in outcome.exited() {
            tracing::info!(%room_id, player_id = %winner, "player got away");
            room.announce(Event::PlayerWin, winner);
        }
        if let TurnOutcome::GameEnds { loser, .. } = &outcome {
            let msg = GameMessage::new(Event::GameOver, loser.clone().unwrap_or_default(), room_id)
                .with_response(room.membership());
            room.broadcast(&msg);
        }
        Ok(outcome)
    }

    /// Votes for a new game. The vote is echoed to the room as
    /// `NewGameRequest`; the deciding vote also broadcasts `GameRestart`
    /// and the new deal.
    pub async fn request_restart(
        &self,
        conn_id: ConnectionId,
        player_id: PlayerId,
        room_id: RoomId,
    ) -> Result<RestartVote, RoomError> {
        let shared = self.find_room(&room_id).await?;
        let mut room = shared.lock().await;
        check_seat(&room, &player_id, conn_id)?;

        let vote = room.request_restart(&player_id)?;
        let echo = GameMessage::new(Event::NewGameRequest, player_id.clone(), room_id.clone())
            .with_data(&vote)?;
        room.broadcast(&echo);

        if vote.restarted {
            tracing::info!(%room_id, votes = vote.votes, "restarting game");
            room.broadcast_membership(Event::GameRestart, &player_id);
            room.broadcast_deal();
        }
        Ok(vote)
    }

    /// Relays a chat line to everyone in the room.
    pub async fn chat(
        &self,
        conn_id: ConnectionId,
        player_id: PlayerId,
        room_id: RoomId,
        text: String,
    ) -> Result<(), RoomError> {
        let shared = self.find_room(&room_id).await?;
        let room = shared.lock().await;
        check_seat(&room, &player_id, conn_id)?;

        let msg = GameMessage::new(Event::PlayerMessage, player_id, room_id).with_message(text);
        room.broadcast(&msg);
        Ok(())
    }

    /// Called when a connection's read fails. Marks its seat as left and
    /// removes the room once nobody is left in it.
    pub async fn disconnect(&self, conn_id: ConnectionId) -> Result<(), RoomError> {
        let Some(room_id) = self.registry.dissociate(conn_id).await? else {
            return Ok(());
        };
        self.leave_room(conn_id, &room_id).await
    }

    async fn leave_room(&self, conn_id: ConnectionId, room_id: &RoomId) -> Result<(), RoomError> {
        let Some(shared) = self.registry.get_room(room_id).await? else {
            return Ok(());
        };
        let mut room = shared.lock().await;

        for player_id in room.mark_left(conn_id) {
            tracing::info!(%room_id, %player_id, %conn_id, "player left");
        }

        if room.all_left() && !room.is_closed() {
            room.close();
            self.registry.delete_room(room_id).await?;
            tracing::info!(%room_id, "all players left, room closed");
        }
        Ok(())
    }

    async fn find_room(&self, room_id: &RoomId) -> Result<SharedRoom, RoomError> {
        self.registry
            .get_room(room_id)
            .await?
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    fn generate_room_id(&self) -> RoomId {
        let id: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(self.config.room_id_len)
            .map(char::from)
            .collect();
        RoomId::from(id)
    }
}

/// Only the connection sitting in a seat may act for it.
fn check_seat(room: &Room, player_id: &PlayerId, conn_id: ConnectionId) -> Result<(), RoomError> {
    if room.player(player_id).is_none() {
        return Err(RoomError::NotSeated(player_id.clone(), room.id().clone()));
    }
    if !room.is_seat_held_by(player_id, conn_id) {
        return Err(RoomError::SeatHeldElsewhere(player_id.clone()));
    }
    Ok(())
}
