use super::state::GameState;
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_FORMAT: u32 = 1;

/// Persistence-boundary envelope around a complete `GameState`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub format: u32,
    pub state: GameState,
}

impl GameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        GameSnapshot {
            format: SNAPSHOT_FORMAT,
            state: state.clone(),
        }
    }

    pub fn restore(self) -> GameState {
        self.state
    }

    pub fn to_json(state: &GameState) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::GameSnapshot;
    use crate::game::fixtures::{four_players, playing_game};
    use crate::game::state::{GameState, PhaseKind};

    #[test]
    fn snapshot_serializes_to_json() {
        let state = GameState::new("g-1", four_players()).unwrap();
        let json = GameSnapshot::to_json(&state).unwrap();
        assert!(json.contains("\"format\""));
        assert!(json.contains("\"phase\": \"setup\""));
    }

    #[test]
    fn mid_game_snapshot_restores_the_same_state() {
        let mut state = playing_game(21);
        let napoleon = state.napoleon_seat().unwrap();
        let id = state.player(napoleon).id.clone();
        let card = state.legal_plays_for(napoleon)[0];
        state.play_card(id.as_str(), card).unwrap();

        let json = GameSnapshot::to_json(&state).unwrap();
        let restored = GameSnapshot::from_json(&json).unwrap().restore();
        assert_eq!(restored, state);
        assert_eq!(restored.phase_kind(), PhaseKind::Playing);
        assert_eq!(restored.current_trick().unwrap().plays().len(), 1);
    }
}
