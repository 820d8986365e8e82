//! Napoleon card rules evaluated against the declared trump suit.
//!
//! - `special`: Mighty, the trump (front) Jack and the reverse (back) Jack.
//! - `adjutant`: which card the Napoleon names to identify the secret ally.
//! - `legal`: follow-suit obligations.
//! - `winner`: trick resolution.

mod adjutant;
mod legal;
mod special;
mod winner;

pub use adjutant::select_adjutant_card;
pub use legal::{check_play, legal_plays};
pub use special::{SpecialCard, card_power, is_mighty, reverse_jack, reverse_suit, trump_jack};
pub use winner::{trick_winner_index, winning_card_index};
