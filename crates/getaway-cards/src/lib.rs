//! Cards and dealing for Getaway.
//!
//! - [`Card`], [`Rank`], [`Suit`]: the 52-card deck, no jokers
//! - [`build_shuffled_hands`]: shuffle and split a deck around a set of
//!   reserved cards
//! - [`PenaltyTracker`]: decides which high cards are force-dealt to a
//!   player who keeps losing
//!
//! Nothing here knows about rooms or connections; seats are plain indices.

mod card;
mod deck;
mod penalty;

pub use card::{Card, Rank, Suit};
pub use deck::{DECK_SIZE, build_shuffled_hands, full_deck};
pub use penalty::PenaltyTracker;
