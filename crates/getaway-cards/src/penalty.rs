//! The sticky-loser penalty.
//!
//! When a game ends with exactly one player still holding cards, that
//! player is dealt the ace of spades at the start of the next game. Losing
//! again from the same seat adds the next card of the escalation
//! (A♠, A♣, A♥, A♦, K♠, ...) on top of what was already being dealt.
//! A different loser resets the penalty to the ace of spades alone.

use rand::Rng;

use crate::{Card, build_shuffled_hands};

/// Per-room record of who lost last and which cards they are owed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PenaltyTracker {
    previous_loser: Option<usize>,
    reserved: Vec<Card>,
}

impl PenaltyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seat of the last sole loser, if any game has produced one.
    pub fn previous_loser(&self) -> Option<usize> {
        self.previous_loser
    }

    /// The penalty cards, in the order they are dealt.
    pub fn reserved(&self) -> &[Card] {
        &self.reserved
    }

    /// Updates the penalty at the start of a game.
    ///
    /// `sole_loser` is the seat of the only player who did not empty their
    /// hand last game, or `None` when there were zero or several such
    /// players. `None` leaves the tracker untouched.
    pub fn begin_game(&mut self, sole_loser: Option<usize>) {
        let Some(seat) = sole_loser else {
            return;
        };

        let repeat = self.previous_loser == Some(seat) && !self.reserved.is_empty();
        if repeat {
            // Past the two of diamonds there is nothing left to add.
            if let Some(next) = self.reserved.last().and_then(|c| c.successor()) {
                self.reserved.push(next);
            }
        } else {
            self.reserved = vec![Card::ACE_OF_SPADES];
        }
        self.previous_loser = Some(seat);
    }

    /// Deals `num_hands` hands with the penalty cards at the front of the
    /// previous loser's hand.
    ///
    /// Without a previous loser (or when that seat is out of range) the
    /// reserved cards stay with hand 0.
    pub fn deal<R: Rng + ?Sized>(&self, num_hands: usize, rng: &mut R) -> Vec<Vec<Card>> {
        let mut hands = build_shuffled_hands(num_hands, &self.reserved, rng);
        if let Some(seat) = self.previous_loser {
            if seat < hands.len() {
                hands.swap(0, seat);
            }
        }
        hands
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::{DECK_SIZE, Rank, Suit};

    #[test]
    fn test_fresh_tracker_without_loser_stays_empty() {
        let mut tracker = PenaltyTracker::new();
        tracker.begin_game(None);
        assert!(tracker.reserved().is_empty());
        assert_eq!(tracker.previous_loser(), None);
    }

    #[test]
    fn test_first_loser_gets_ace_of_spades() {
        let mut tracker = PenaltyTracker::new();
        tracker.begin_game(Some(2));
        assert_eq!(tracker.reserved(), &[Card::ACE_OF_SPADES]);
        assert_eq!(tracker.previous_loser(), Some(2));
    }

    #[test]
    fn test_same_loser_escalates() {
        let mut tracker = PenaltyTracker::new();
        tracker.begin_game(Some(2));
        tracker.begin_game(Some(2));
        assert_eq!(
            tracker.reserved(),
            &[Card::ACE_OF_SPADES, Card::new(Rank::Ace, Suit::Club)]
        );

        tracker.begin_game(Some(2));
        tracker.begin_game(Some(2));
        tracker.begin_game(Some(2));
        assert_eq!(tracker.reserved().len(), 5);
        assert_eq!(
            tracker.reserved().last(),
            Some(&Card::new(Rank::King, Suit::Spade))
        );
    }

    #[test]
    fn test_new_loser_resets() {
        let mut tracker = PenaltyTracker::new();
        tracker.begin_game(Some(2));
        tracker.begin_game(Some(2));
        tracker.begin_game(Some(0));
        assert_eq!(tracker.reserved(), &[Card::ACE_OF_SPADES]);
        assert_eq!(tracker.previous_loser(), Some(0));
    }

    #[test]
    fn test_no_sole_loser_keeps_penalty() {
        let mut tracker = PenaltyTracker::new();
        tracker.begin_game(Some(1));
        tracker.begin_game(Some(1));
        let before = tracker.clone();

        tracker.begin_game(None);
        assert_eq!(tracker, before);
    }

    #[test]
    fn test_escalation_stops_at_two_of_diamonds() {
        let mut tracker = PenaltyTracker::new();
        for _ in 0..60 {
            tracker.begin_game(Some(0));
        }
        assert_eq!(tracker.reserved().len(), DECK_SIZE);
        assert_eq!(
            tracker.reserved().last(),
            Some(&Card::new(Rank::Two, Suit::Diamond))
        );
    }

    #[test]
    fn test_deal_moves_penalty_to_loser_seat() {
        let mut tracker = PenaltyTracker::new();
        tracker.begin_game(Some(2));
        tracker.begin_game(Some(2));

        let hands = tracker.deal(3, &mut StdRng::seed_from_u64(5));
        assert_eq!(hands.len(), 3);
        assert_eq!(&hands[2][..2], tracker.reserved());
        assert!(!hands[0].contains(&Card::ACE_OF_SPADES));
        assert_eq!(hands.iter().map(Vec::len).sum::<usize>(), DECK_SIZE);
    }

    #[test]
    fn test_deal_without_loser_is_plain_shuffle() {
        let tracker = PenaltyTracker::new();
        let hands = tracker.deal(4, &mut StdRng::seed_from_u64(5));
        let sizes: Vec<usize> = hands.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![13, 13, 13, 13]);
    }
}
