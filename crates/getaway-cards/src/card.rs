//! Card values and their ordering tables.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A card suit.
///
/// Declaration order is the cyclic order the penalty escalation walks
/// through: spade, club, heart, diamond.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Suit {
    #[serde(rename = "s")]
    Spade,
    #[serde(rename = "c")]
    Club,
    #[serde(rename = "h")]
    Heart,
    #[serde(rename = "d")]
    Diamond,
}

impl Suit {
    /// Every suit, in escalation order.
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Club, Suit::Heart, Suit::Diamond];

    /// The following suit in escalation order, `None` after diamonds.
    pub fn next(self) -> Option<Suit> {
        match self {
            Suit::Spade => Some(Suit::Club),
            Suit::Club => Some(Suit::Heart),
            Suit::Heart => Some(Suit::Diamond),
            Suit::Diamond => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Suit::Spade => '♠',
            Suit::Club => '♣',
            Suit::Heart => '♥',
            Suit::Diamond => '♦',
        }
    }
}

/// A card rank. The derived `Ord` runs from `Two` (lowest) to `Ace`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Rank {
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "A")]
    Ace,
}

impl Rank {
    /// Every rank, lowest first.
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Numeric value: 2 for `Two` up to 14 for `Ace`.
    pub fn value(self) -> u8 {
        self as u8 + 2
    }

    /// The rank directly below this one, `None` below `Two`.
    pub fn lower(self) -> Option<Rank> {
        let idx = self as usize;
        if idx == 0 { None } else { Some(Rank::ALL[idx - 1]) }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

/// A playing card. Equality is rank plus suit.
///
/// On the wire this is `{"label": "Q", "suite": "h"}`, the shape the
/// browser client already speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    #[serde(rename = "label")]
    pub rank: Rank,
    #[serde(rename = "suite")]
    pub suit: Suit,
}

impl Card {
    /// The card whose holder deals first in a fresh game, and the first
    /// card of every penalty.
    pub const ACE_OF_SPADES: Card = Card::new(Rank::Ace, Suit::Spade);

    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// The next card in the penalty escalation.
    ///
    /// Same rank at the next suit; after diamonds, one rank lower at
    /// spades. `None` once the two of diamonds is reached.
    pub fn successor(self) -> Option<Card> {
        match self.suit.next() {
            Some(suit) => Some(Card::new(self.rank, suit)),
            None => self.rank.lower().map(|rank| Card::new(rank, Suit::Spade)),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.label(), self.suit.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_values_span_two_to_fourteen() {
        assert_eq!(Rank::Two.value(), 2);
        assert_eq!(Rank::Ten.value(), 10);
        assert_eq!(Rank::Ace.value(), 14);
        assert!(Rank::Ace > Rank::King);
        assert!(Rank::Three > Rank::Two);
    }

    #[test]
    fn test_successor_walks_suits_then_drops_rank() {
        let cases = [
            (Card::new(Rank::Ace, Suit::Spade), Card::new(Rank::Ace, Suit::Club)),
            (Card::new(Rank::Ten, Suit::Heart), Card::new(Rank::Ten, Suit::Diamond)),
            (Card::new(Rank::Queen, Suit::Club), Card::new(Rank::Queen, Suit::Heart)),
            (Card::new(Rank::Five, Suit::Diamond), Card::new(Rank::Four, Suit::Spade)),
            (Card::new(Rank::Ace, Suit::Diamond), Card::new(Rank::King, Suit::Spade)),
        ];
        for (card, expected) in cases {
            assert_eq!(card.successor(), Some(expected), "after {card}");
        }
    }

    #[test]
    fn test_successor_stops_at_two_of_diamonds() {
        assert_eq!(Card::new(Rank::Two, Suit::Diamond).successor(), None);
        assert_eq!(
            Card::new(Rank::Two, Suit::Heart).successor(),
            Some(Card::new(Rank::Two, Suit::Diamond))
        );
    }

    #[test]
    fn test_card_json_shape_matches_client() {
        let json = serde_json::to_value(Card::new(Rank::Ten, Suit::Heart)).unwrap();
        assert_eq!(json, serde_json::json!({"label": "10", "suite": "h"}));

        let card: Card = serde_json::from_str(r#"{"label":"Q","suite":"d"}"#).unwrap();
        assert_eq!(card, Card::new(Rank::Queen, Suit::Diamond));
    }

    #[test]
    fn test_card_rejects_unknown_label() {
        let result: Result<Card, _> = serde_json::from_str(r#"{"label":"1","suite":"s"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_card_display() {
        assert_eq!(Card::ACE_OF_SPADES.to_string(), "A♠");
        assert_eq!(Card::new(Rank::Ten, Suit::Diamond).to_string(), "10♦");
    }
}
