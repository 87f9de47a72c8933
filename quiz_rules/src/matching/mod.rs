//! Pair-matching board - state machine for the card-matching challenge kind.
//!
//! The board is deliberately clock-driven: a mismatched pair stays face-up
//! until a deadline passes, and the deadline is resolved by [`MatchBoard::tick`]
//! rather than a fire-and-forget timer, so the whole flow is testable without
//! wall-clock waits.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::questions::CardPair;

/// How long a mismatched pair stays revealed before flipping back.
pub const MISMATCH_REVEAL_SECS: f64 = 1.0;

/// Which half of a word pair a card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSide {
    Front,
    Back,
}

/// One card on the board, tagged with its pair identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub content: String,
    pub side: CardSide,
    /// Index of the pair this card belongs to.
    pub pair: usize,
}

/// Result of a single click on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Click on a matched card, an already-selected card, an out-of-range
    /// index, or while a mismatched pair is pending resolution.
    Ignored,
    /// First card of a pair selected.
    Flipped,
    /// Second card completed a pair; both are now matched.
    Matched,
    /// Second card did not match; both stay revealed until the deadline.
    Mismatched,
}

/// A shuffled double deck of `2N` cards with at most two selected at a time.
#[derive(Debug, Clone)]
pub struct MatchBoard {
    cards: Vec<Card>,
    flipped: Vec<usize>,
    matched: HashSet<usize>,
    pending_clear_at: Option<f64>,
}

impl MatchBoard {
    /// Build a freshly shuffled board from the challenge's word pairs.
    /// Callers re-create the board every time the question is opened so the
    /// layout never repeats between attempts.
    pub fn new<R: Rng>(pairs: &[CardPair], rng: &mut R) -> Self {
        let mut cards = Vec::with_capacity(pairs.len() * 2);
        for (pair, entry) in pairs.iter().enumerate() {
            cards.push(Card {
                content: entry.front.clone(),
                side: CardSide::Front,
                pair,
            });
            cards.push(Card {
                content: entry.back.clone(),
                side: CardSide::Back,
                pair,
            });
        }
        cards.shuffle(rng);

        Self {
            cards,
            flipped: Vec::new(),
            matched: HashSet::new(),
            pending_clear_at: None,
        }
    }

    /// Select the card at `index`. `now` is the caller's monotonic clock in
    /// seconds, used to schedule the mismatch-reveal deadline.
    pub fn flip(&mut self, index: usize, now: f64) -> FlipOutcome {
        if self.pending_clear_at.is_some()
            || index >= self.cards.len()
            || self.matched.contains(&index)
            || self.flipped.contains(&index)
        {
            return FlipOutcome::Ignored;
        }

        self.flipped.push(index);
        if self.flipped.len() < 2 {
            return FlipOutcome::Flipped;
        }

        let first = self.flipped[0];
        let second = self.flipped[1];
        if self.cards[first].pair == self.cards[second].pair {
            self.matched.insert(first);
            self.matched.insert(second);
            self.flipped.clear();
            FlipOutcome::Matched
        } else {
            self.pending_clear_at = Some(now + MISMATCH_REVEAL_SECS);
            FlipOutcome::Mismatched
        }
    }

    /// Resolve an expired mismatch: the revealed pair flips back and both
    /// cards become selectable again. Cards are never removed from play.
    pub fn tick(&mut self, now: f64) {
        if let Some(deadline) = self.pending_clear_at {
            if now >= deadline {
                self.flipped.clear();
                self.pending_clear_at = None;
            }
        }
    }

    /// All pairs matched?
    pub fn is_solved(&self) -> bool {
        self.matched.len() == self.cards.len()
    }

    /// Number of cards currently in the matched set.
    pub fn matched_cards(&self) -> usize {
        self.matched.len()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn is_flipped(&self, index: usize) -> bool {
        self.flipped.contains(&index)
    }

    pub fn is_matched(&self, index: usize) -> bool {
        self.matched.contains(&index)
    }

    /// A mismatched pair is revealed and waiting for its deadline.
    pub fn is_pending(&self) -> bool {
        self.pending_clear_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn pairs() -> Vec<CardPair> {
        vec![
            CardPair::new("King", "Kral"),
            CardPair::new("Gold", "Altın"),
            CardPair::new("Gate", "Kapı"),
            CardPair::new("Sun", "Güneş"),
        ]
    }

    /// Indices of the two cards belonging to `pair`, in deck order.
    fn cards_of_pair(board: &MatchBoard, pair: usize) -> (usize, usize) {
        let indices: Vec<usize> = board
            .cards()
            .iter()
            .enumerate()
            .filter(|(_, card)| card.pair == pair)
            .map(|(idx, _)| idx)
            .collect();
        (indices[0], indices[1])
    }

    #[test]
    fn test_board_has_two_cards_per_pair() {
        let mut rng = Pcg32::seed_from_u64(7);
        let board = MatchBoard::new(&pairs(), &mut rng);
        assert_eq!(board.cards().len(), 8);
        for pair in 0..4 {
            let count = board.cards().iter().filter(|c| c.pair == pair).count();
            assert_eq!(count, 2);
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let mut a = Pcg32::seed_from_u64(42);
        let mut b = Pcg32::seed_from_u64(42);
        let first = MatchBoard::new(&pairs(), &mut a);
        let second = MatchBoard::new(&pairs(), &mut b);
        assert_eq!(first.cards(), second.cards());
    }

    #[test]
    fn test_matching_pair_clears_selection_immediately() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut board = MatchBoard::new(&pairs(), &mut rng);
        let (a, b) = cards_of_pair(&board, 0);

        assert_eq!(board.flip(a, 0.0), FlipOutcome::Flipped);
        assert_eq!(board.flip(b, 0.0), FlipOutcome::Matched);
        assert!(board.is_matched(a));
        assert!(board.is_matched(b));
        assert!(!board.is_flipped(a));
        assert_eq!(board.matched_cards(), 2);
    }

    #[test]
    fn test_mismatch_clears_after_deadline_without_penalty() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut board = MatchBoard::new(&pairs(), &mut rng);
        let (a, _) = cards_of_pair(&board, 0);
        let (b, _) = cards_of_pair(&board, 1);

        assert_eq!(board.flip(a, 0.0), FlipOutcome::Flipped);
        assert_eq!(board.flip(b, 0.0), FlipOutcome::Mismatched);
        assert!(board.is_pending());

        // Clicks are ignored while the mismatch is revealed.
        let (c, _) = cards_of_pair(&board, 2);
        assert_eq!(board.flip(c, 0.5), FlipOutcome::Ignored);

        // Not yet expired.
        board.tick(0.5);
        assert!(board.is_pending());

        board.tick(MISMATCH_REVEAL_SECS + 0.1);
        assert!(!board.is_pending());
        assert!(!board.is_flipped(a));
        assert_eq!(board.matched_cards(), 0);

        // Both cards are selectable again.
        assert_eq!(board.flip(a, 2.0), FlipOutcome::Flipped);
    }

    #[test]
    fn test_repeated_and_matched_clicks_ignored() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut board = MatchBoard::new(&pairs(), &mut rng);
        let (a, b) = cards_of_pair(&board, 0);

        assert_eq!(board.flip(a, 0.0), FlipOutcome::Flipped);
        assert_eq!(board.flip(a, 0.0), FlipOutcome::Ignored);
        assert_eq!(board.flip(b, 0.0), FlipOutcome::Matched);
        assert_eq!(board.flip(a, 0.0), FlipOutcome::Ignored);
        assert_eq!(board.flip(99, 0.0), FlipOutcome::Ignored);
    }

    #[test]
    fn test_board_solves_regardless_of_mismatch_count() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut board = MatchBoard::new(&pairs(), &mut rng);
        let mut now = 0.0;

        // One deliberate mismatch first.
        let (a, _) = cards_of_pair(&board, 0);
        let (b, _) = cards_of_pair(&board, 1);
        board.flip(a, now);
        board.flip(b, now);
        now += MISMATCH_REVEAL_SECS + 0.1;
        board.tick(now);

        for pair in 0..4 {
            let (first, second) = cards_of_pair(&board, pair);
            assert_eq!(board.flip(first, now), FlipOutcome::Flipped);
            assert_eq!(board.flip(second, now), FlipOutcome::Matched);
        }

        assert!(board.is_solved());
        assert_eq!(board.matched_cards(), 8);
    }
}
