use crate::error::{DealError, DeclarationError, ExchangeError, GameError, IllegalPlayReason};
use crate::game::scoring::{GameResult, score_game};
use crate::game::view::PlayerView;
use crate::model::card::Card;
use crate::model::declaration::{AdjutantRole, Bid, MAX_TARGET, NapoleonDeclaration};
use crate::model::deck::{HAND_SIZE, HIDDEN_CARD_COUNT, deal_cards};
use crate::model::hand::Hand;
use crate::model::player::{Player, Seat};
use crate::model::suit::Suit;
use crate::model::trick::{Trick, TrickError};
use crate::rules::{check_play, legal_plays, select_adjutant_card};
use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{Level, event};

pub const TOTAL_TRICKS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Setup,
    Dealing,
    Napoleon,
    Adjutant,
    Exchange,
    Playing,
    Finished,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PhaseKind::Setup => "setup",
            PhaseKind::Dealing => "dealing",
            PhaseKind::Napoleon => "napoleon",
            PhaseKind::Adjutant => "adjutant",
            PhaseKind::Exchange => "exchange",
            PhaseKind::Playing => "playing",
            PhaseKind::Finished => "finished",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedealReason {
    AllPlayersPassed,
}

/// Each phase carries only the data that exists during it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Setup,
    /// Waiting for a redeal.
    Dealing(RedealState),
    Napoleon(BiddingState),
    Adjutant(AdjutantState),
    Exchange(ExchangeState),
    Playing(PlayState),
    Finished(FinishedState),
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Setup => PhaseKind::Setup,
            Phase::Dealing(_) => PhaseKind::Dealing,
            Phase::Napoleon(_) => PhaseKind::Napoleon,
            Phase::Adjutant(_) => PhaseKind::Adjutant,
            Phase::Exchange(_) => PhaseKind::Exchange,
            Phase::Playing(_) => PhaseKind::Playing,
            Phase::Finished(_) => PhaseKind::Finished,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedealState {
    pub reason: RedealReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiddingState {
    pub hidden: Vec<Card>,
    pub passed: Vec<Seat>,
    pub declaration_turn: u32,
    pub current_seat: Seat,
    pub standing: Option<Bid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjutantState {
    pub hidden: Vec<Card>,
    pub declaration: NapoleonDeclaration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeState {
    pub hidden: Vec<Card>,
    pub declaration: NapoleonDeclaration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayState {
    pub declaration: NapoleonDeclaration,
    pub adjutant: AdjutantRole,
    pub adjutant_revealed: bool,
    pub exchanged: Vec<Card>,
    pub current_trick: Trick,
    pub history: Vec<Trick>,
    pub current_seat: Seat,
    pub showing_trick_result: bool,
    pub last_completed_trick: Option<Trick>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedState {
    pub declaration: NapoleonDeclaration,
    pub adjutant: AdjutantRole,
    pub exchanged: Vec<Card>,
    pub history: Vec<Trick>,
    pub result: GameResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiddingOutcome {
    Continue { next: Seat },
    Declared(NapoleonDeclaration),
    Redeal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Played { next: Seat },
    TrickCompleted { winner: Seat, counting_cards: u8 },
    GameFinished(GameResult),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    id: String,
    players: [Player; 4],
    phase: Phase,
    version: u64,
    reshuffle_count: u32,
    redeal_reason: Option<RedealReason>,
    original_hidden: Vec<Card>,
    created_at_ms: u64,
    updated_at_ms: u64,
}

impl GameState {
    /// Seats the players in the given order. Exactly four are required.
    pub fn new(id: impl Into<String>, players: Vec<Player>) -> Result<Self, GameError> {
        let found = players.len();
        let mut players: [Player; 4] = players
            .try_into()
            .map_err(|_| GameError::InvalidPlayerCount { found })?;
        for (seat, player) in Seat::LOOP.iter().zip(players.iter_mut()) {
            player.seat = *seat;
            player.clear_for_deal();
        }
        let now = now_ms();
        Ok(Self {
            id: id.into(),
            players,
            phase: Phase::Setup,
            version: 0,
            reshuffle_count: 0,
            redeal_reason: None,
            original_hidden: Vec::new(),
            created_at_ms: now,
            updated_at_ms: now,
        })
    }

    /// Builds a game already in the Playing phase from fixed hands, for puzzles and tooling.
    ///
    /// Hands must hold twelve cards each and `exchanged` the four discards; together they
    /// must be the full 52-card deck. The adjutant is whoever holds the declared card.
    pub fn resume_playing(
        id: impl Into<String>,
        players: Vec<Player>,
        declaration: NapoleonDeclaration,
        exchanged: Vec<Card>,
    ) -> Result<Self, GameError> {
        if exchanged.len() != HIDDEN_CARD_COUNT {
            return Err(ExchangeError::WrongDiscardCount {
                expected: HIDDEN_CARD_COUNT,
                found: exchanged.len(),
            }
            .into());
        }
        let mut seen = HashSet::with_capacity(52);
        for player in &players {
            if player.hand.len() != HAND_SIZE {
                return Err(DealError::WrongHandSize {
                    seat: player.seat,
                    expected: HAND_SIZE,
                    found: player.hand.len(),
                }
                .into());
            }
            for card in player.hand.iter() {
                if !seen.insert(*card) {
                    return Err(DealError::DuplicateCard(*card).into());
                }
            }
        }
        for card in &exchanged {
            if !seen.insert(*card) {
                return Err(DealError::DuplicateCard(*card).into());
            }
        }
        Self::resume_unchecked(id, players, declaration, exchanged)
    }

    /// [`GameState::resume_playing`] without the deck checks, so tests can stage short
    /// endgames.
    #[cfg(any(test, feature = "test-support"))]
    #[doc(hidden)]
    pub fn resume_playing_unchecked(
        id: impl Into<String>,
        players: Vec<Player>,
        declaration: NapoleonDeclaration,
        exchanged: Vec<Card>,
    ) -> Result<Self, GameError> {
        Self::resume_unchecked(id, players, declaration, exchanged)
    }

    fn resume_unchecked(
        id: impl Into<String>,
        players: Vec<Player>,
        declaration: NapoleonDeclaration,
        exchanged: Vec<Card>,
    ) -> Result<Self, GameError> {
        let mut state = Self::new(id, players.clone())?;
        for (slot, source) in state.players.iter_mut().zip(players) {
            slot.hand = source.hand;
        }
        state.players[declaration.napoleon.index()].is_napoleon = true;
        let adjutant = state.assign_adjutant(declaration.napoleon, declaration.adjutant_card);
        state.phase = Phase::Playing(PlayState {
            declaration,
            adjutant,
            adjutant_revealed: false,
            exchanged,
            current_trick: Trick::new(0, declaration.napoleon),
            history: Vec::new(),
            current_seat: declaration.napoleon,
            showing_trick_result: false,
            last_completed_trick: None,
        });
        Ok(state)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    pub fn updated_at_ms(&self) -> u64 {
        self.updated_at_ms
    }

    pub fn players(&self) -> &[Player; 4] {
        &self.players
    }

    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat.index()]
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.players[seat.index()].hand
    }

    pub fn seat_of(&self, player_id: &str) -> Result<Seat, GameError> {
        self.players
            .iter()
            .find(|player| player.id.as_str() == player_id)
            .map(|player| player.seat)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn phase_kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    pub fn reshuffle_count(&self) -> u32 {
        self.reshuffle_count
    }

    pub fn redeal_reason(&self) -> Option<RedealReason> {
        self.redeal_reason
    }

    pub fn needs_redeal(&self) -> bool {
        matches!(self.phase, Phase::Dealing(_))
    }

    /// Whether `card` was one of the four cards set aside at the deal.
    pub fn was_hidden(&self, card: Card) -> bool {
        self.original_hidden.contains(&card)
    }

    pub fn hidden_cards(&self) -> Option<&[Card]> {
        match &self.phase {
            Phase::Napoleon(state) => Some(&state.hidden),
            Phase::Adjutant(state) => Some(&state.hidden),
            Phase::Exchange(state) => Some(&state.hidden),
            _ => None,
        }
    }

    pub fn passed_players(&self) -> &[Seat] {
        match &self.phase {
            Phase::Napoleon(state) => &state.passed,
            _ => &[],
        }
    }

    pub fn declaration_turn(&self) -> u32 {
        match &self.phase {
            Phase::Napoleon(state) => state.declaration_turn,
            _ => 0,
        }
    }

    pub fn standing_bid(&self) -> Option<&Bid> {
        match &self.phase {
            Phase::Napoleon(state) => state.standing.as_ref(),
            _ => None,
        }
    }

    pub fn napoleon_declaration(&self) -> Option<&NapoleonDeclaration> {
        match &self.phase {
            Phase::Adjutant(state) => Some(&state.declaration),
            Phase::Exchange(state) => Some(&state.declaration),
            Phase::Playing(state) => Some(&state.declaration),
            Phase::Finished(state) => Some(&state.declaration),
            _ => None,
        }
    }

    pub fn trump_suit(&self) -> Option<Suit> {
        self.napoleon_declaration().map(|declaration| declaration.trump)
    }

    pub fn napoleon_seat(&self) -> Option<Seat> {
        self.napoleon_declaration()
            .map(|declaration| declaration.napoleon)
    }

    pub fn adjutant_role(&self) -> Option<AdjutantRole> {
        match &self.phase {
            Phase::Playing(state) => Some(state.adjutant),
            Phase::Finished(state) => Some(state.adjutant),
            _ => None,
        }
    }

    pub fn adjutant_revealed(&self) -> bool {
        match &self.phase {
            Phase::Playing(state) => state.adjutant_revealed,
            Phase::Finished(_) => true,
            _ => false,
        }
    }

    pub fn exchanged_cards(&self) -> &[Card] {
        match &self.phase {
            Phase::Playing(state) => &state.exchanged,
            Phase::Finished(state) => &state.exchanged,
            _ => &[],
        }
    }

    pub fn current_trick(&self) -> Option<&Trick> {
        match &self.phase {
            Phase::Playing(state) => Some(&state.current_trick),
            _ => None,
        }
    }

    pub fn trick_history(&self) -> &[Trick] {
        match &self.phase {
            Phase::Playing(state) => &state.history,
            Phase::Finished(state) => &state.history,
            _ => &[],
        }
    }

    pub fn tricks_completed(&self) -> usize {
        self.trick_history().len()
    }

    pub fn leading_suit(&self) -> Option<Suit> {
        self.current_trick().and_then(Trick::leading_suit)
    }

    /// Seat expected to act in the bidding or play phases.
    pub fn current_seat(&self) -> Option<Seat> {
        match &self.phase {
            Phase::Napoleon(state) => Some(state.current_seat),
            Phase::Adjutant(state) => Some(state.declaration.napoleon),
            Phase::Exchange(state) => Some(state.declaration.napoleon),
            Phase::Playing(state) => Some(state.current_seat),
            _ => None,
        }
    }

    pub fn showing_trick_result(&self) -> bool {
        matches!(&self.phase, Phase::Playing(state) if state.showing_trick_result)
    }

    pub fn last_completed_trick(&self) -> Option<&Trick> {
        match &self.phase {
            Phase::Playing(state) => state.last_completed_trick.as_ref(),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&GameResult> {
        match &self.phase {
            Phase::Finished(state) => Some(&state.result),
            _ => None,
        }
    }

    pub fn legal_plays_for(&self, seat: Seat) -> Vec<Card> {
        match &self.phase {
            Phase::Playing(_) => legal_plays(self.hand(seat).cards(), self.leading_suit()),
            _ => Vec::new(),
        }
    }

    /// Projection of the state as `seat` is allowed to see it.
    pub fn view_for(&self, seat: Seat) -> PlayerView {
        PlayerView::project(self, seat)
    }

    /// Every card in hands, tricks, hidden cards and discards.
    pub fn card_census(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = self
            .players
            .iter()
            .flat_map(|player| player.hand.iter().copied())
            .collect();
        if let Some(hidden) = self.hidden_cards() {
            cards.extend_from_slice(hidden);
        }
        cards.extend_from_slice(self.exchanged_cards());
        for trick in self.trick_history() {
            cards.extend(trick.cards());
        }
        if let Some(trick) = self.current_trick() {
            cards.extend(trick.cards());
        }
        cards
    }

    /// Shuffles and deals. Valid from Setup and from a pending redeal.
    pub fn deal<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GameError> {
        let is_redeal = match &self.phase {
            Phase::Setup => false,
            Phase::Dealing(_) => true,
            other => {
                return Err(GameError::WrongPhase {
                    expected: PhaseKind::Dealing,
                    actual: other.kind(),
                });
            }
        };

        let hidden = deal_cards(&mut self.players, rng)?;
        if is_redeal {
            self.reshuffle_count += 1;
        }
        self.original_hidden = hidden.clone();
        self.phase = Phase::Napoleon(BiddingState {
            hidden,
            passed: Vec::new(),
            declaration_turn: 0,
            current_seat: Seat::First,
            standing: None,
        });
        self.touch();
        event!(
            target: "napoleon::engine",
            Level::DEBUG,
            game = %self.id,
            redeal = is_redeal,
            reshuffle_count = self.reshuffle_count,
            "cards dealt"
        );
        Ok(())
    }

    pub fn declare(
        &mut self,
        player_id: &str,
        target: u8,
        trump: Suit,
    ) -> Result<BiddingOutcome, GameError> {
        let seat = self.seat_of(player_id)?;
        let bidding = self.bidding_turn(seat)?;
        Bid::validate(target, bidding.standing.as_ref())?;

        if let Phase::Napoleon(bidding) = &mut self.phase {
            bidding.standing = Some(Bid { seat, target, trump });
            bidding.declaration_turn += 1;
        }
        event!(
            target: "napoleon::engine",
            Level::DEBUG,
            game = %self.id,
            seat = seat.number(),
            target_tricks = target,
            trump = %trump,
            "declaration"
        );
        Ok(self.advance_bidding())
    }

    pub fn pass(&mut self, player_id: &str) -> Result<BiddingOutcome, GameError> {
        let seat = self.seat_of(player_id)?;
        self.bidding_turn(seat)?;

        if let Phase::Napoleon(bidding) = &mut self.phase {
            bidding.passed.push(seat);
            bidding.declaration_turn += 1;
        }
        Ok(self.advance_bidding())
    }

    /// Names the adjutant card by the standard priority for the Napoleon's hand.
    pub fn resolve_adjutant(&mut self) -> Result<Option<Card>, GameError> {
        let declaration = self.adjutant_phase()?.declaration;
        let card = select_adjutant_card(self.hand(declaration.napoleon).cards(), declaration.trump);
        self.apply_adjutant_card(card);
        Ok(card)
    }

    /// Lets the Napoleon name a specific adjutant card, or `None` to play alone.
    pub fn declare_adjutant(
        &mut self,
        player_id: &str,
        card: Option<Card>,
    ) -> Result<(), GameError> {
        let seat = self.seat_of(player_id)?;
        let declaration = self.adjutant_phase()?.declaration;
        if seat != declaration.napoleon {
            return Err(DeclarationError::NotNapoleon.into());
        }
        if let Some(card) = card {
            if self.hand(seat).contains(card) {
                return Err(DeclarationError::AdjutantCardInHand(card).into());
            }
        }
        self.apply_adjutant_card(card);
        Ok(())
    }

    /// The Napoleon takes the hidden cards and discards four from the combined pool.
    pub fn exchange(&mut self, player_id: &str, discards: &[Card]) -> Result<(), GameError> {
        let seat = self.seat_of(player_id)?;
        let (hidden, declaration) = match &self.phase {
            Phase::Exchange(state) => (state.hidden.clone(), state.declaration),
            Phase::Dealing(_) => return Err(GameError::AllPlayersPassed),
            other => {
                return Err(GameError::WrongPhase {
                    expected: PhaseKind::Exchange,
                    actual: other.kind(),
                });
            }
        };
        if seat != declaration.napoleon {
            return Err(IllegalPlayReason::OutOfTurn {
                expected: declaration.napoleon,
                actual: seat,
            }
            .into());
        }
        if discards.len() != HIDDEN_CARD_COUNT {
            return Err(ExchangeError::WrongDiscardCount {
                expected: HIDDEN_CARD_COUNT,
                found: discards.len(),
            }
            .into());
        }
        let mut pool: Vec<Card> = self.hand(seat).cards().to_vec();
        pool.extend_from_slice(&hidden);
        let mut seen = HashSet::new();
        for card in discards {
            if !seen.insert(*card) {
                return Err(ExchangeError::DuplicateCard(*card).into());
            }
            if !pool.contains(card) {
                return Err(ExchangeError::UnknownCard(*card).into());
            }
        }

        pool.retain(|card| !discards.contains(card));
        self.players[seat.index()].hand = Hand::with_cards(pool);
        let adjutant = self.assign_adjutant(seat, declaration.adjutant_card);
        self.phase = Phase::Playing(PlayState {
            declaration,
            adjutant,
            adjutant_revealed: false,
            exchanged: discards.to_vec(),
            current_trick: Trick::new(0, seat),
            history: Vec::new(),
            current_seat: seat,
            showing_trick_result: false,
            last_completed_trick: None,
        });
        self.touch();
        event!(
            target: "napoleon::engine",
            Level::DEBUG,
            game = %self.id,
            napoleon = seat.number(),
            "exchange complete"
        );
        Ok(())
    }

    pub fn play_card(&mut self, player_id: &str, card: Card) -> Result<PlayOutcome, GameError> {
        let seat = self.seat_of(player_id)?;
        let state = match &self.phase {
            Phase::Playing(state) => state,
            Phase::Dealing(_) => return Err(GameError::AllPlayersPassed),
            other => {
                return Err(GameError::WrongPhase {
                    expected: PhaseKind::Playing,
                    actual: other.kind(),
                });
            }
        };
        if state.showing_trick_result {
            return Err(GameError::AwaitingContinuation);
        }
        if state.current_seat != seat {
            return Err(IllegalPlayReason::OutOfTurn {
                expected: state.current_seat,
                actual: seat,
            }
            .into());
        }
        if self.players[seat.index()].hand.is_empty() {
            return Err(GameError::NoLegalMoves { seat });
        }
        check_play(
            self.players[seat.index()].hand.cards(),
            state.current_trick.leading_suit(),
            card,
        )?;

        let Phase::Playing(state) = &mut self.phase else {
            return Err(GameError::WrongPhase {
                expected: PhaseKind::Playing,
                actual: self.phase.kind(),
            });
        };
        let reveals = !state.adjutant_revealed && state.declaration.adjutant_card == Some(card);
        state
            .current_trick
            .play(seat, card, reveals)
            .map_err(|err| match err {
                TrickError::OutOfTurn { expected, actual } => {
                    GameError::from(IllegalPlayReason::OutOfTurn { expected, actual })
                }
                TrickError::TrickComplete | TrickError::AlreadyPlayed(_) => {
                    GameError::AwaitingContinuation
                }
            })?;
        self.players[seat.index()].hand.remove(card);
        if reveals {
            state.adjutant_revealed = true;
            event!(
                target: "napoleon::engine",
                Level::DEBUG,
                game = %self.id,
                seat = seat.number(),
                card = %card,
                "adjutant card revealed"
            );
        }

        let trump = state.declaration.trump;
        let outcome = match state.current_trick.complete(trump) {
            None => {
                state.current_seat = seat.next();
                PlayOutcome::Played {
                    next: state.current_seat,
                }
            }
            Some(winner) => {
                let next_id = state.history.len() as u8 + 1;
                let finished =
                    std::mem::replace(&mut state.current_trick, Trick::new(next_id, winner));
                let counting_cards = finished.counting_cards();
                event!(
                    target: "napoleon::engine",
                    Level::DEBUG,
                    game = %self.id,
                    trick = finished.id(),
                    winner = winner.number(),
                    counting_cards,
                    "trick completed"
                );
                state.history.push(finished.clone());
                state.current_seat = winner;
                if state.history.len() == TOTAL_TRICKS {
                    let history = std::mem::take(&mut state.history);
                    let exchanged = std::mem::take(&mut state.exchanged);
                    let (declaration, adjutant) = (state.declaration, state.adjutant);
                    let result = self.finish(declaration, adjutant, exchanged, history);
                    self.touch();
                    return Ok(PlayOutcome::GameFinished(result));
                }
                state.last_completed_trick = Some(finished);
                state.showing_trick_result = true;
                PlayOutcome::TrickCompleted {
                    winner,
                    counting_cards,
                }
            }
        };
        self.touch();
        Ok(outcome)
    }

    /// Clears the completed-trick summary so the next trick can be played.
    pub fn continue_after_trick(&mut self) -> Result<(), GameError> {
        match &mut self.phase {
            Phase::Playing(state) => {
                if state.showing_trick_result {
                    state.showing_trick_result = false;
                    state.last_completed_trick = None;
                    self.touch();
                }
                Ok(())
            }
            other => Err(GameError::WrongPhase {
                expected: PhaseKind::Playing,
                actual: other.kind(),
            }),
        }
    }

    /// Returns to Setup. Cumulative scores are kept; roles and cards are cleared.
    pub fn reset(&mut self) {
        for player in &mut self.players {
            player.clear_for_deal();
        }
        self.phase = Phase::Setup;
        self.reshuffle_count = 0;
        self.redeal_reason = None;
        self.original_hidden.clear();
        self.touch();
    }

    fn bidding_turn(&self, seat: Seat) -> Result<&BiddingState, GameError> {
        let bidding = match &self.phase {
            Phase::Napoleon(bidding) => bidding,
            Phase::Dealing(_) => return Err(GameError::AllPlayersPassed),
            other => {
                return Err(GameError::WrongPhase {
                    expected: PhaseKind::Napoleon,
                    actual: other.kind(),
                });
            }
        };
        if bidding.passed.contains(&seat) {
            return Err(DeclarationError::AlreadyPassed(seat).into());
        }
        if bidding.current_seat != seat {
            return Err(IllegalPlayReason::OutOfTurn {
                expected: bidding.current_seat,
                actual: seat,
            }
            .into());
        }
        Ok(bidding)
    }

    fn adjutant_phase(&self) -> Result<&AdjutantState, GameError> {
        match &self.phase {
            Phase::Adjutant(state) => Ok(state),
            Phase::Dealing(_) => Err(GameError::AllPlayersPassed),
            other => Err(GameError::WrongPhase {
                expected: PhaseKind::Adjutant,
                actual: other.kind(),
            }),
        }
    }

    fn advance_bidding(&mut self) -> BiddingOutcome {
        let Phase::Napoleon(bidding) = &mut self.phase else {
            return BiddingOutcome::Redeal;
        };

        if bidding.passed.len() == Seat::LOOP.len() {
            self.phase = Phase::Dealing(RedealState {
                reason: RedealReason::AllPlayersPassed,
            });
            self.redeal_reason = Some(RedealReason::AllPlayersPassed);
            self.touch();
            event!(
                target: "napoleon::engine",
                Level::INFO,
                game = %self.id,
                reshuffle_count = self.reshuffle_count,
                "all players passed; redeal required"
            );
            return BiddingOutcome::Redeal;
        }

        if let Some(bid) = bidding.standing {
            let others_passed = bidding.passed.len() == Seat::LOOP.len() - 1;
            if others_passed || bid.target >= MAX_TARGET {
                let hidden = std::mem::take(&mut bidding.hidden);
                let declaration = NapoleonDeclaration::from(bid);
                self.players[bid.seat.index()].is_napoleon = true;
                self.phase = Phase::Adjutant(AdjutantState {
                    hidden,
                    declaration,
                });
                self.touch();
                event!(
                    target: "napoleon::engine",
                    Level::INFO,
                    game = %self.id,
                    napoleon = bid.seat.number(),
                    target_tricks = bid.target,
                    trump = %bid.trump,
                    "napoleon declared"
                );
                return BiddingOutcome::Declared(declaration);
            }
        }

        let standing_seat = bidding.standing.map(|bid| bid.seat);
        let mut next = bidding.current_seat.next();
        while bidding.passed.contains(&next) || Some(next) == standing_seat {
            next = next.next();
        }
        bidding.current_seat = next;
        self.touch();
        BiddingOutcome::Continue { next }
    }

    fn apply_adjutant_card(&mut self, card: Option<Card>) {
        let Phase::Adjutant(state) = &mut self.phase else {
            return;
        };
        let mut declaration = state.declaration;
        declaration.adjutant_card = card;
        let hidden = std::mem::take(&mut state.hidden);
        let provisional = card.and_then(|card| {
            self.players
                .iter()
                .find(|player| player.hand.contains(card))
                .map(|player| player.seat)
        });
        for player in &mut self.players {
            player.is_adjutant = Some(player.seat) == provisional;
        }
        self.phase = Phase::Exchange(ExchangeState {
            hidden,
            declaration,
        });
        self.touch();
        event!(
            target: "napoleon::engine",
            Level::DEBUG,
            game = %self.id,
            adjutant_card = card.map(|c| c.id()).unwrap_or_else(|| "none".to_string()),
            "adjutant card named"
        );
    }

    /// Settles who holds the adjutant card once the Napoleon's hand is final.
    fn assign_adjutant(&mut self, napoleon: Seat, card: Option<Card>) -> AdjutantRole {
        let role = match card {
            None => AdjutantRole::Alone,
            Some(card) => match self
                .players
                .iter()
                .find(|player| player.hand.contains(card))
                .map(|player| player.seat)
            {
                Some(holder) if holder == napoleon => AdjutantRole::SelfAdjutant,
                Some(holder) => AdjutantRole::Ally(holder),
                None => AdjutantRole::Alone,
            },
        };
        for player in &mut self.players {
            player.is_adjutant = match role {
                AdjutantRole::Ally(seat) => player.seat == seat,
                AdjutantRole::SelfAdjutant => player.seat == napoleon,
                AdjutantRole::Alone => false,
            };
        }
        role
    }

    fn finish(
        &mut self,
        declaration: NapoleonDeclaration,
        adjutant: AdjutantRole,
        exchanged: Vec<Card>,
        history: Vec<Trick>,
    ) -> GameResult {
        let result = score_game(&declaration, adjutant, &history);
        for player in &mut self.players {
            player.score += result.delta(player.seat);
        }
        event!(
            target: "napoleon::engine",
            Level::INFO,
            game = %self.id,
            napoleon = declaration.napoleon.number(),
            target_tricks = declaration.target,
            napoleon_side_faces = result.napoleon_side_faces,
            napoleon_won = result.napoleon_won,
            "game finished"
        );
        self.phase = Phase::Finished(FinishedState {
            declaration,
            adjutant,
            exchanged,
            history,
            result,
        });
        result
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at_ms = now_ms().max(self.updated_at_ms);
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
