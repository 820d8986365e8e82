use crate::model::declaration::{AdjutantRole, NapoleonDeclaration};
use crate::model::player::Seat;
use crate::model::trick::Trick;
use serde::{Deserialize, Serialize};

pub const NAPOLEON_BONUS: i32 = 100;
pub const BASE_POINTS: i32 = 10;
pub const ADJUTANT_BONUS: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub napoleon: Seat,
    pub adjutant: AdjutantRole,
    pub target: u8,
    pub napoleon_won: bool,
    /// Counting cards captured by each seat.
    pub faces_by_seat: [u8; 4],
    pub napoleon_side_faces: u8,
    pub alliance_side_faces: u8,
    pub deltas: [i32; 4],
}

impl GameResult {
    pub fn is_napoleon_side(&self, seat: Seat) -> bool {
        seat == self.napoleon || self.adjutant.ally() == Some(seat)
    }

    pub fn delta(&self, seat: Seat) -> i32 {
        self.deltas[seat.index()]
    }
}

pub fn faces_by_seat(history: &[Trick]) -> [u8; 4] {
    let mut totals = [0u8; 4];
    for trick in history {
        if let Some(winner) = trick.winner() {
            totals[winner.index()] = totals[winner.index()].saturating_add(trick.counting_cards());
        }
    }
    totals
}

/// Scores a finished hand from the tricks each seat captured.
///
/// The Napoleon side wins when it holds at least `target` counting cards. With
/// `margin = |side - target|`, a win pays the Napoleon `NAPOLEON_BONUS + BASE_POINTS * margin`,
/// the adjutant `ADJUTANT_BONUS + BASE_POINTS * margin`, and charges each alliance player
/// `BASE_POINTS * (margin + 1)`. A loss flips those signs, with the alliance collecting
/// `BASE_POINTS * margin` each.
pub fn score_game(
    declaration: &NapoleonDeclaration,
    adjutant: AdjutantRole,
    history: &[Trick],
) -> GameResult {
    let faces = faces_by_seat(history);
    let napoleon = declaration.napoleon;
    let ally = adjutant.ally().filter(|seat| *seat != napoleon);

    let mut napoleon_side = faces[napoleon.index()];
    if let Some(ally) = ally {
        napoleon_side += faces[ally.index()];
    }
    let total: u8 = faces.iter().sum();
    let alliance_side = total - napoleon_side;

    let napoleon_won = napoleon_side >= declaration.target;
    let margin = (napoleon_side as i32 - declaration.target as i32).abs();

    let mut deltas = [0i32; 4];
    for seat in Seat::LOOP {
        let delta = if seat == napoleon {
            NAPOLEON_BONUS + BASE_POINTS * margin
        } else if Some(seat) == ally {
            ADJUTANT_BONUS + BASE_POINTS * margin
        } else if napoleon_won {
            -(BASE_POINTS * (margin + 1))
        } else {
            -(BASE_POINTS * margin)
        };
        let is_napoleon_side = seat == napoleon || Some(seat) == ally;
        deltas[seat.index()] = if is_napoleon_side == napoleon_won {
            delta.abs()
        } else {
            -delta.abs()
        };
    }

    GameResult {
        napoleon,
        adjutant,
        target: declaration.target,
        napoleon_won,
        faces_by_seat: faces,
        napoleon_side_faces: napoleon_side,
        alliance_side_faces: alliance_side,
        deltas,
    }
}
