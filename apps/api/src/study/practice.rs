use crate::models::deck::FlashcardRow;

/// Highest score a card can reach through repeated correct answers.
pub const MAX_SCORE: i32 = 5;

/// Score after one review: a correct answer moves the card up one step, a
/// wrong answer sends it back to zero.
pub fn next_score(score: i32, correct: bool) -> i32 {
    if correct {
        (score + 1).clamp(0, MAX_SCORE)
    } else {
        0
    }
}

/// Orders cards weakest first, keeping deck order among equal scores.
pub fn order_for_practice(cards: &mut [FlashcardRow]) {
    cards.sort_by_key(|card| (card.score, card.position));
}
