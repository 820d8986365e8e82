use crate::error::GameError;
use crate::game::state::{GameState, PhaseKind};
use crate::model::player::Player;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, event};

/// A run of consecutive games at one table driven by a single seeded RNG.
///
/// The engine itself never caps redeals; `MatchState` applies the caller's cap.
#[derive(Debug, Clone)]
pub struct MatchState {
    game: GameState,
    rng: StdRng,
    seed: u64,
    game_number: u32,
    max_redeals: u32,
}

impl MatchState {
    pub fn new(id: impl Into<String>, players: Vec<Player>) -> Result<Self, GameError> {
        let seed: u64 = rand::random();
        Self::with_seed(id, players, seed)
    }

    pub fn with_seed(
        id: impl Into<String>,
        players: Vec<Player>,
        seed: u64,
    ) -> Result<Self, GameError> {
        Ok(Self {
            game: GameState::new(id, players)?,
            rng: StdRng::seed_from_u64(seed),
            seed,
            game_number: 0,
            max_redeals: u32::MAX,
        })
    }

    pub fn with_max_redeals(mut self, max_redeals: u32) -> Self {
        self.max_redeals = max_redeals;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn game_number(&self) -> u32 {
        self.game_number
    }

    pub fn max_redeals(&self) -> u32 {
        self.max_redeals
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut GameState {
        &mut self.game
    }

    /// Clears the previous game, if any, and deals a new one.
    pub fn start_game(&mut self) -> Result<(), GameError> {
        if self.game.phase_kind() != PhaseKind::Setup {
            self.game.reset();
        }
        self.game.deal(&mut self.rng)?;
        self.game_number += 1;
        Ok(())
    }

    /// Redeals after four passes. Returns `false` once the redeal cap is exhausted.
    pub fn redeal(&mut self) -> Result<bool, GameError> {
        if self.game.reshuffle_count() >= self.max_redeals {
            event!(
                target: "napoleon::engine",
                Level::WARN,
                game = self.game.id(),
                reshuffle_count = self.game.reshuffle_count(),
                max_redeals = self.max_redeals,
                "redeal limit reached"
            );
            return Ok(false);
        }
        self.game.deal(&mut self.rng)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::MatchState;
    use crate::game::fixtures::four_players;
    use crate::game::state::PhaseKind;

    #[test]
    fn same_seed_deals_the_same_hands() {
        let mut a = MatchState::with_seed("a", four_players(), 42).unwrap();
        let mut b = MatchState::with_seed("b", four_players(), 42).unwrap();
        a.start_game().unwrap();
        b.start_game().unwrap();
        assert_eq!(a.game().players(), b.game().players());
        assert_eq!(a.game_number(), 1);
    }

    #[test]
    fn redeal_respects_the_cap() {
        let mut table = MatchState::with_seed("t", four_players(), 9)
            .unwrap()
            .with_max_redeals(1);
        table.start_game().unwrap();
        for id in ["p0", "p1", "p2", "p3"] {
            table.game_mut().pass(id).unwrap();
        }
        assert_eq!(table.game().phase_kind(), PhaseKind::Dealing);
        assert!(table.redeal().unwrap());
        assert_eq!(table.game().reshuffle_count(), 1);

        for id in ["p0", "p1", "p2", "p3"] {
            table.game_mut().pass(id).unwrap();
        }
        assert!(!table.redeal().unwrap());
        assert!(table.game().needs_redeal());
    }
}
