pub mod engine;
pub mod match_state;
pub mod scoring;
pub mod serialization;
pub mod state;
pub mod view;

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::game::state::GameState;
    use crate::model::card::Card;
    use crate::model::player::{Player, Seat};
    use crate::model::suit::Suit;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    pub fn four_players() -> Vec<Player> {
        Seat::LOOP
            .iter()
            .map(|seat| Player::ai(format!("p{}", seat.index()), format!("Bot {}", seat.number()), *seat))
            .collect()
    }

    /// Seat 0 declares 13 in spades, everyone else passes, the standard adjutant card is
    /// named and the Napoleon discards the first four cards of the combined pool.
    pub fn playing_game(seed: u64) -> GameState {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = GameState::new(format!("game-{seed}"), four_players()).unwrap();
        game.deal(&mut rng).unwrap();
        game.declare("p0", 13, Suit::Spades).unwrap();
        for id in ["p1", "p2", "p3"] {
            game.pass(id).unwrap();
        }
        game.resolve_adjutant().unwrap();
        let discards: Vec<Card> = game.hand(Seat::First).cards()[..4].to_vec();
        game.exchange("p0", &discards).unwrap();
        game
    }

    pub fn seat_holding(game: &GameState, card: Card) -> Option<Seat> {
        Seat::LOOP
            .into_iter()
            .find(|seat| game.hand(*seat).contains(card))
    }
}
