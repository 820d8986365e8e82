use crate::game::state::PhaseKind;
use crate::model::card::Card;
use crate::model::player::Seat;
use crate::model::suit::Suit;
use thiserror::Error;

/// Every rejected action leaves the game state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("a game needs exactly 4 players, got {found}")]
    InvalidPlayerCount { found: usize },
    #[error("illegal play: {0}")]
    IllegalPlay(IllegalPlayReason),
    #[error("invalid declaration: {0}")]
    InvalidDeclaration(DeclarationError),
    #[error("invalid exchange: {0}")]
    InvalidExchange(ExchangeError),
    #[error("invalid deal: {0}")]
    InvalidDeal(DealError),
    #[error("{seat} has no legal card to play")]
    NoLegalMoves { seat: Seat },
    #[error("all players passed; the cards must be redealt")]
    AllPlayersPassed,
    #[error("action requires the {expected} phase but the game is in {actual}")]
    WrongPhase {
        expected: PhaseKind,
        actual: PhaseKind,
    },
    #[error("unknown player '{0}'")]
    UnknownPlayer(String),
    #[error("the last trick is still on display; continue before playing")]
    AwaitingContinuation,
    #[error("decision was computed for a superseded game state")]
    StaleDecision,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IllegalPlayReason {
    #[error("{0} is not in hand")]
    CardNotInHand(Card),
    #[error("must follow {0}")]
    MustFollowSuit(Suit),
    #[error("expected {expected} to act but got {actual}")]
    OutOfTurn { expected: Seat, actual: Seat },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("target {target} is outside {min}..={max}")]
    TargetOutOfRange { target: u8, min: u8, max: u8 },
    #[error("target {target} does not beat the standing bid of {standing}")]
    NotHigherThanStanding { target: u8, standing: u8 },
    #[error("{0} has already passed")]
    AlreadyPassed(Seat),
    #[error("only the Napoleon may name the adjutant card")]
    NotNapoleon,
    #[error("{0} is in the Napoleon's own hand")]
    AdjutantCardInHand(Card),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("exactly {expected} cards must be discarded, got {found}")]
    WrongDiscardCount { expected: usize, found: usize },
    #[error("{0} is neither in hand nor among the hidden cards")]
    UnknownCard(Card),
    #[error("{0} was listed twice")]
    DuplicateCard(Card),
}

/// Hands supplied from outside that do not form a legal deal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DealError {
    #[error("{seat} holds {found} cards instead of {expected}")]
    WrongHandSize {
        seat: Seat,
        expected: usize,
        found: usize,
    },
    #[error("{0} appears more than once")]
    DuplicateCard(Card),
}

impl From<DealError> for GameError {
    fn from(reason: DealError) -> Self {
        GameError::InvalidDeal(reason)
    }
}

impl From<IllegalPlayReason> for GameError {
    fn from(reason: IllegalPlayReason) -> Self {
        GameError::IllegalPlay(reason)
    }
}

impl From<DeclarationError> for GameError {
    fn from(reason: DeclarationError) -> Self {
        GameError::InvalidDeclaration(reason)
    }
}

impl From<ExchangeError> for GameError {
    fn from(reason: ExchangeError) -> Self {
        GameError::InvalidExchange(reason)
    }
}
