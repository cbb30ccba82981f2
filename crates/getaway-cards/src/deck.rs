//! Building and splitting the deck.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::{Card, Rank, Suit};

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 52;

/// Every card once, suit by suit, lowest rank first.
pub fn full_deck() -> Vec<Card> {
    Suit::ALL
        .iter()
        .flat_map(|&suit| Rank::ALL.iter().map(move |&rank| Card::new(rank, suit)))
        .collect()
}

/// Shuffles the deck and splits it into `num_hands` hands.
///
/// The `reserved` cards are taken out before shuffling. The rest is split
/// into near-equal chunks (the first `rest % num_hands` chunks get one extra
/// card), then `reserved` is placed, in its given order, at the front of the
/// first chunk. Every card of the deck appears in exactly one hand.
///
/// `reserved` must not contain duplicates. Returns no hands when
/// `num_hands` is zero.
pub fn build_shuffled_hands<R: Rng + ?Sized>(
    num_hands: usize,
    reserved: &[Card],
    rng: &mut R,
) -> Vec<Vec<Card>> {
    if num_hands == 0 {
        return Vec::new();
    }

    let mut rest: Vec<Card> = full_deck()
        .into_iter()
        .filter(|card| !reserved.contains(card))
        .collect();
    rest.shuffle(rng);

    let per_hand = rest.len() / num_hands;
    let extra = rest.len() % num_hands;

    let mut cards = rest.into_iter();
    let mut hands = Vec::with_capacity(num_hands);
    for i in 0..num_hands {
        let size = per_hand + usize::from(i < extra);
        let mut hand = Vec::with_capacity(size + if i == 0 { reserved.len() } else { 0 });
        if i == 0 {
            hand.extend_from_slice(reserved);
        }
        hand.extend(cards.by_ref().take(size));
        hands.push(hand);
    }
    hands
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn penalty() -> Vec<Card> {
        vec![
            Card::ACE_OF_SPADES,
            Card::new(Rank::Ace, Suit::Club),
            Card::new(Rank::Ace, Suit::Heart),
        ]
    }

    #[test]
    fn test_full_deck_has_52_distinct_cards() {
        let deck = full_deck();
        assert_eq!(deck.len(), DECK_SIZE);
        let unique: HashSet<Card> = deck.iter().copied().collect();
        assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn test_hands_cover_deck_exactly_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let hands = build_shuffled_hands(6, &penalty(), &mut rng);

        assert_eq!(hands.len(), 6);
        let all: Vec<Card> = hands.iter().flatten().copied().collect();
        assert_eq!(all.len(), DECK_SIZE);
        let unique: HashSet<Card> = all.into_iter().collect();
        assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn test_reserved_cards_prefix_first_hand_in_order() {
        let mut rng = StdRng::seed_from_u64(11);
        let reserved = penalty();
        let hands = build_shuffled_hands(6, &reserved, &mut rng);

        assert_eq!(&hands[0][..reserved.len()], reserved.as_slice());
        for hand in &hands[1..] {
            assert!(reserved.iter().all(|c| !hand.contains(c)));
        }
    }

    #[test]
    fn test_chunk_sizes_spread_remainder_over_first_hands() {
        let mut rng = StdRng::seed_from_u64(3);
        // 49 unreserved cards over 6 hands: 9, 8, 8, 8, 8, 8 (+3 reserved).
        let sizes: Vec<usize> = build_shuffled_hands(6, &penalty(), &mut rng)
            .iter()
            .map(Vec::len)
            .collect();
        assert_eq!(sizes, vec![12, 8, 8, 8, 8, 8]);

        let sizes: Vec<usize> = build_shuffled_hands(3, &[], &mut rng)
            .iter()
            .map(Vec::len)
            .collect();
        assert_eq!(sizes, vec![18, 17, 17]);
    }

    #[test]
    fn test_different_seeds_shuffle_differently() {
        let reserved = penalty();
        let a = build_shuffled_hands(6, &reserved, &mut StdRng::seed_from_u64(1));
        let b = build_shuffled_hands(6, &reserved, &mut StdRng::seed_from_u64(2));

        let tail = |hands: &[Vec<Card>]| -> Vec<Card> {
            hands.iter().flatten().skip(reserved.len()).copied().collect()
        };
        assert_ne!(tail(&a), tail(&b));
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let a = build_shuffled_hands(4, &[], &mut StdRng::seed_from_u64(99));
        let b = build_shuffled_hands(4, &[], &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_hands_returns_nothing() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(build_shuffled_hands(0, &[], &mut rng).is_empty());
    }
}
