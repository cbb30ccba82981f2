//! The room state machine: seats, dealing, and the turn engine.
//!
//! A `Room` is plain synchronous state. Callers reach it through a
//! [`SharedRoom`](crate::SharedRoom) and hold its lock for the whole
//! operation, including the broadcasts at the end, so every change a
//! client can observe happens atomically.

use getaway_cards::{Card, PenaltyTracker, Suit};
use getaway_protocol::{
    DealResponse, Event, GameMessage, PlayerCard, PlayerId, RoomId, RoomResponse,
};
use getaway_transport::ConnectionId;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::{ClientLink, Player, RoomError, TurnError};

/// The state of the game, derived from seats, table and hands.
///
/// ```text
/// Idle → AwaitingLead ⇄ MidTrick → GameOver
///              ↑            │
///              └─ RoundComplete (players emptied their hands)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Seats are still open, or no cards were ever dealt.
    Idle,
    /// The table is empty and the dealer is due to lead.
    AwaitingLead,
    /// Cards are on the table and the led suit must be followed.
    MidTrick,
    /// The table is empty and some players emptied their hands without
    /// being marked as exited yet.
    RoundComplete,
    /// Fewer than two players hold cards.
    GameOver,
}

impl GamePhase {
    pub fn accepts_turns(self) -> bool {
        matches!(self, Self::AwaitingLead | Self::MidTrick | Self::RoundComplete)
    }
}

/// What an accepted card did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The card went on the table and the turn moved on.
    Applied,

    /// The player couldn't follow suit. `dealer` played the highest card,
    /// took the whole pile and leads next.
    PileAbsorbed {
        dealer: PlayerId,
        exited: Vec<PlayerId>,
    },

    /// Every player holding cards has played to the trick. The table is
    /// cleared and `dealer` leads next.
    TrickFull {
        dealer: PlayerId,
        exited: Vec<PlayerId>,
    },

    /// No further play is possible. `loser` is the one player still
    /// holding cards, if there is one.
    GameEnds {
        loser: Option<PlayerId>,
        exited: Vec<PlayerId>,
    },
}

impl TurnOutcome {
    /// Players who emptied their hands as a result of this turn.
    pub fn exited(&self) -> &[PlayerId] {
        match self {
            Self::Applied => &[],
            Self::PileAbsorbed { exited, .. }
            | Self::TrickFull { exited, .. }
            | Self::GameEnds { exited, .. } => exited,
        }
    }
}

/// How a join request was placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A fresh seat with an empty hand.
    Seated { seat: usize },
    /// The player came back to their own seat after disconnecting.
    Reclaimed { seat: usize },
    /// The room was full and the player took over the seat of `replaced`,
    /// who had left. Hand and dealer status carry over.
    TookOver { seat: usize, replaced: PlayerId },
}

impl JoinOutcome {
    pub fn seat(&self) -> usize {
        match self {
            Self::Seated { seat } | Self::Reclaimed { seat } | Self::TookOver { seat, .. } => *seat,
        }
    }
}

/// Tally after a restart request. Sent to clients as the `data` of the
/// echoed `NewGameRequest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RestartVote {
    pub votes: usize,
    pub needed: usize,
    #[serde(skip)]
    pub restarted: bool,
}

/// A card on the table, kept by seat so a takeover mid-trick still
/// credits the right seat.
#[derive(Debug, Clone, Copy)]
struct TableCard {
    seat: usize,
    card: Card,
}

/// One match: up to `limit` seats, their hands and the current trick.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    limit: u8,
    /// Indexed by seat.
    players: Vec<Player>,
    current_turn: usize,
    table: Vec<TableCard>,
    penalty: PenaltyTracker,
    rng: StdRng,
    /// Set once the room is dropped from the registry.
    closed: bool,
}

impl Room {
    pub fn new(id: RoomId, limit: u8) -> Self {
        Self::with_rng(id, limit, StdRng::from_os_rng())
    }

    /// Creates a room that shuffles with the given generator, for
    /// reproducible deals.
    pub fn with_rng(id: RoomId, limit: u8, rng: StdRng) -> Self {
        Self {
            id,
            limit,
            players: Vec::with_capacity(limit as usize),
            current_turn: 0,
            table: Vec::new(),
            penalty: PenaltyTracker::new(),
            rng,
            closed: false,
        }
    }

    // -- Queries ------------------------------------------------------------

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn limit(&self) -> u8 {
        self.limit
    }

    /// Seated players in seat order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_id: &PlayerId) -> Option<&Player> {
        self.seat_of(player_id).map(|seat| &self.players[seat])
    }

    pub fn current_turn(&self) -> usize {
        self.current_turn
    }

    pub fn current_turn_player(&self) -> Option<&PlayerId> {
        self.players.get(self.current_turn).map(|p| &p.id)
    }

    /// The cards of the current trick in the order they were played.
    pub fn table(&self) -> Vec<PlayerCard> {
        self.table
            .iter()
            .map(|t| PlayerCard {
                player: self.players[t.seat].id.clone(),
                card: t.card,
            })
            .collect()
    }

    pub fn penalty(&self) -> &PenaltyTracker {
        &self.penalty
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.limit as usize
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// `true` when every seat is marked left. An empty room counts too.
    pub fn all_left(&self) -> bool {
        self.players.iter().all(|p| p.has_left)
    }

    pub fn phase(&self) -> GamePhase {
        let never_dealt = self.players.iter().all(|p| p.hand.is_empty() && !p.has_exited);
        if !self.is_full() || never_dealt {
            return GamePhase::Idle;
        }
        if !self.table.is_empty() {
            return GamePhase::MidTrick;
        }
        if self.holder_count() < 2 {
            return GamePhase::GameOver;
        }
        if self.players.iter().any(|p| p.hand.is_empty() && !p.has_exited) {
            return GamePhase::RoundComplete;
        }
        GamePhase::AwaitingLead
    }

    fn seat_of(&self, player_id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == player_id)
    }

    fn holder_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_holding_cards()).count()
    }

    /// The first seat after `seat` (wrapping) whose player holds cards.
    fn next_holder_after(&self, seat: usize) -> Option<usize> {
        let n = self.players.len();
        (1..n)
            .map(|offset| (seat + offset) % n)
            .find(|&s| self.players[s].is_holding_cards())
    }

    // -- Membership ---------------------------------------------------------

    /// Seats a player.
    ///
    /// A name whose own seat is marked left reclaims it. A full room with
    /// no left seat is refused before names are compared. A full room
    /// hands its first left seat to the newcomer. Otherwise the next seat
    /// index is allocated.
    pub fn join(
        &mut self,
        player_id: PlayerId,
        link: ClientLink,
    ) -> Result<JoinOutcome, RoomError> {
        if self.closed {
            return Err(RoomError::NotFound(self.id.clone()));
        }

        let existing = self.seat_of(&player_id);
        if let Some(seat) = existing.filter(|&seat| self.players[seat].has_left) {
            let player = &mut self.players[seat];
            player.has_left = false;
            player.link = Some(link);
            return Ok(JoinOutcome::Reclaimed { seat });
        }

        let vacant = self.players.iter().position(|p| p.has_left);
        if self.is_full() && vacant.is_none() {
            return Err(RoomError::RoomFull(self.id.clone()));
        }
        if existing.is_some() {
            return Err(RoomError::PlayerExists(player_id, self.id.clone()));
        }

        if let Some(seat) = vacant.filter(|_| self.is_full()) {
            let player = &mut self.players[seat];
            let replaced = std::mem::replace(&mut player.id, player_id);
            player.has_left = false;
            player.requested_restart = false;
            player.link = Some(link);
            return Ok(JoinOutcome::TookOver { seat, replaced });
        }

        let seat = self.players.len();
        self.players.push(Player::new(player_id, seat, Some(link)));
        Ok(JoinOutcome::Seated { seat })
    }

    /// `true` if `player_id` is seated and its seat is held by `conn_id`.
    pub fn is_seat_held_by(&self, player_id: &PlayerId, conn_id: ConnectionId) -> bool {
        self.player(player_id)
            .is_some_and(|p| p.conn_id() == Some(conn_id))
    }

    /// Marks every seat held by `conn_id` as left and returns their names.
    /// Seats are never removed, so indices stay stable.
    pub fn mark_left(&mut self, conn_id: ConnectionId) -> Vec<PlayerId> {
        self.players
            .iter_mut()
            .filter(|p| p.conn_id() == Some(conn_id))
            .map(|p| {
                p.has_left = true;
                p.link = None;
                p.id.clone()
            })
            .collect()
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    // -- Game lifecycle -----------------------------------------------------

    /// Deals a new game.
    ///
    /// If exactly one player didn't exit last game, the penalty tracker
    /// charges them (see [`PenaltyTracker::begin_game`]) and they receive
    /// the penalty cards at the front of their hand. Whoever holds the ace
    /// of spades becomes dealer and leads.
    pub fn start_game(&mut self) {
        let mut candidates = self.players.iter().filter(|p| !p.has_exited);
        let sole_loser = match (candidates.next(), candidates.next()) {
            (Some(player), None) => Some(player.seat),
            _ => None,
        };

        self.penalty.begin_game(sole_loser);
        let hands = self.penalty.deal(self.players.len(), &mut self.rng);

        self.table.clear();
        for (player, hand) in self.players.iter_mut().zip(hands) {
            player.hand = hand;
            player.is_dealer = false;
            player.has_exited = false;
            player.requested_restart = false;
        }

        if let Some(seat) = self
            .players
            .iter()
            .position(|p| p.hand.contains(&Card::ACE_OF_SPADES))
        {
            self.set_dealer(seat);
        }

        tracing::info!(
            room_id = %self.id,
            dealer = ?self.current_turn_player(),
            penalty = self.penalty.reserved().len(),
            "game started"
        );
    }

    /// Records a restart request. On a strict majority the votes are
    /// cleared and a new game is dealt.
    pub fn request_restart(&mut self, player_id: &PlayerId) -> Result<RestartVote, RoomError> {
        let seat = self
            .seat_of(player_id)
            .ok_or_else(|| RoomError::NotSeated(player_id.clone(), self.id.clone()))?;
        if self.phase() == GamePhase::Idle {
            return Err(RoomError::NotStarted(self.id.clone()));
        }

        self.players[seat].requested_restart = true;
        let votes = self.players.iter().filter(|p| p.requested_restart).count();
        let needed = self.players.len() / 2 + 1;

        let restarted = votes >= needed;
        if restarted {
            self.start_game();
        }
        Ok(RestartVote {
            votes,
            needed,
            restarted,
        })
    }

    // -- Turn engine --------------------------------------------------------

    /// Validates and applies one card from `player_id`.
    ///
    /// Every check runs before anything is touched, so a rejection leaves
    /// the room exactly as it was.
    pub fn apply_turn(
        &mut self,
        player_id: &PlayerId,
        card: Card,
    ) -> Result<TurnOutcome, RoomError> {
        let seat = self
            .seat_of(player_id)
            .ok_or_else(|| RoomError::NotSeated(player_id.clone(), self.id.clone()))?;
        if !self.phase().accepts_turns() {
            return Err(TurnError::GameNotInProgress.into());
        }
        if seat != self.current_turn {
            return Err(TurnError::NotYourTurn.into());
        }

        let player = &self.players[seat];
        let Some(position) = player.position_of(card) else {
            return Err(TurnError::CardNotHeld(card).into());
        };

        let led = self.table.first().copied();
        match led {
            None if !player.is_dealer => return Err(TurnError::OnlyDealerLeads.into()),
            None => {}
            Some(_) if self.table_follows(card.suit) => {}
            Some(led) => {
                if let Some(held) = player.card_of_suit(led.card.suit) {
                    return Err(TurnError::IllegalMove { held }.into());
                }
                let taker = self.highest_on_table(led);
                self.players[seat].hand.swap_remove(position);
                return Ok(self.absorb_pile(card, taker));
            }
        }

        let played = TableCard { seat, card };
        self.players[seat].hand.swap_remove(position);
        self.table.push(played);

        if self.trick_is_full() {
            return Ok(self.close_trick(led.unwrap_or(played)));
        }
        match self.next_holder_after(seat) {
            Some(next) => {
                self.current_turn = next;
                Ok(TurnOutcome::Applied)
            }
            None => {
                let exited = self.mark_exits();
                Ok(self.end_game(exited))
            }
        }
    }

    /// `true` if every card on the table is of `suit`.
    fn table_follows(&self, suit: Suit) -> bool {
        self.table.iter().all(|t| t.card.suit == suit)
    }

    /// Every player still holding cards has a card on the table.
    fn trick_is_full(&self) -> bool {
        self.players
            .iter()
            .filter(|p| p.is_holding_cards())
            .all(|p| self.table.iter().any(|t| t.seat == p.seat))
    }

    /// Seat that played the highest rank, starting from the `led` card.
    /// Ties go to the earlier card.
    fn highest_on_table(&self, led: TableCard) -> usize {
        self.table
            .iter()
            .fold(led, |best, t| if t.card.rank > best.card.rank { *t } else { best })
            .seat
    }

    fn set_dealer(&mut self, seat: usize) {
        for player in &mut self.players {
            player.is_dealer = player.seat == seat;
        }
        self.current_turn = seat;
    }

    /// Marks players whose hands just emptied as exited.
    fn mark_exits(&mut self) -> Vec<PlayerId> {
        self.players
            .iter_mut()
            .filter(|p| p.hand.is_empty() && !p.has_exited)
            .map(|p| {
                p.has_exited = true;
                p.id.clone()
            })
            .collect()
    }

    /// The suit wasn't followed: `taker`, who played the highest card,
    /// picks up the table plus the offending card and leads next.
    fn absorb_pile(&mut self, card: Card, taker: usize) -> TurnOutcome {
        let pile = std::mem::take(&mut self.table);
        let hand = &mut self.players[taker].hand;
        hand.push(card);
        hand.extend(pile.into_iter().map(|t| t.card));
        self.set_dealer(taker);

        let exited = self.mark_exits();
        if self.next_holder_after(taker).is_none() {
            return self.end_game(exited);
        }
        TurnOutcome::PileAbsorbed {
            dealer: self.players[taker].id.clone(),
            exited,
        }
    }

    /// The table is full: the highest card's owner deals next, and anyone
    /// who ran out of cards exits.
    fn close_trick(&mut self, led: TableCard) -> TurnOutcome {
        let highest = self.highest_on_table(led);
        self.table.clear();
        let exited = self.mark_exits();

        if self.holder_count() < 2 {
            self.set_dealer(highest);
            return self.end_game(exited);
        }

        // A dealer who just played their last card hands the lead on.
        let dealer = if self.players[highest].is_holding_cards() {
            Some(highest)
        } else {
            self.next_holder_after(highest)
        };
        let Some(dealer) = dealer else {
            return self.end_game(exited);
        };
        self.set_dealer(dealer);

        TurnOutcome::TrickFull {
            dealer: self.players[dealer].id.clone(),
            exited,
        }
    }

    fn end_game(&mut self, mut exited: Vec<PlayerId>) -> TurnOutcome {
        exited.extend(self.mark_exits());

        let mut holders = self.players.iter().filter(|p| p.is_holding_cards());
        let loser = match (holders.next(), holders.next()) {
            (Some(player), None) => Some(player.id.clone()),
            _ => None,
        };

        tracing::info!(room_id = %self.id, loser = ?loser, "game over");
        TurnOutcome::GameEnds { loser, exited }
    }

    // -- Views and broadcasts -----------------------------------------------

    /// Seated and exited players, capacity and the turn seat.
    pub fn membership(&self) -> RoomResponse {
        RoomResponse {
            seated: self.players.iter().map(|p| p.id.clone()).collect(),
            exited: self
                .players
                .iter()
                .filter(|p| p.has_exited)
                .map(|p| p.id.clone())
                .collect(),
            capacity: self.limit,
            current_turn: self.current_turn,
        }
    }

    /// The game as the player in `seat` sees it.
    pub fn deal_view(&self, seat: usize) -> Option<DealResponse> {
        let player = self.players.get(seat)?;
        Some(DealResponse {
            table: self.table(),
            hand: player.hand.clone(),
            is_dealer: player.is_dealer,
            is_your_turn: self.current_turn == seat,
            turn_player: self.current_turn_player().cloned().unwrap_or_default(),
        })
    }

    /// Sends `msg` to every connected seat.
    pub fn broadcast(&self, msg: &GameMessage) {
        for player in &self.players {
            player.send(msg.clone());
        }
    }

    /// Sends the membership view under `event`, attributed to `player_id`.
    pub fn broadcast_membership(&self, event: Event, player_id: &PlayerId) {
        let msg = GameMessage::new(event, player_id.clone(), self.id.clone())
            .with_response(self.membership());
        self.broadcast(&msg);
    }

    /// Sends each connected seat its own hand and the shared table.
    pub fn broadcast_deal(&self) {
        for player in &self.players {
            if let Some(view) = self.deal_view(player.seat) {
                let msg = GameMessage::new(Event::PlayerTurn, player.id.clone(), self.id.clone())
                    .with_response(view);
                player.send(msg);
            }
        }
    }

    /// Sends a bare `event` naming `player_id`, used for wins and game over.
    pub fn announce(&self, event: Event, player_id: &PlayerId) {
        self.broadcast(&GameMessage::new(event, player_id.clone(), self.id.clone()));
    }
}

#[cfg(test)]
impl Room {
    /// Replaces the dealt hands and gives `dealer` the lead.
    pub(crate) fn script_hands(&mut self, hands: Vec<Vec<Card>>, dealer: usize) {
        self.table.clear();
        for (player, hand) in self.players.iter_mut().zip(hands) {
            player.hand = hand;
            player.has_exited = false;
        }
        self.set_dealer(dealer);
    }
}
