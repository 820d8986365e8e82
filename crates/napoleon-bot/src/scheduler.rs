//! Delayed, cancellable AI turns.
//!
//! A scheduled turn sleeps for the configured delay on a worker thread, computes a card from
//! the seat's view and sends an [`AiDecision`] back. Every schedule and cancel bumps a
//! generation counter; results computed under an older generation are dropped.

use crate::strategy::{DecisionSource, StrategyConfig, select_ai_choice};
use napoleon_core::game::engine::AiMove;
use napoleon_core::game::state::{GameState, PhaseKind};
use napoleon_core::model::player::Seat;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{Level, event};

pub const DEFAULT_AI_DELAY: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiDecision {
    pub ai_move: AiMove,
    pub source: DecisionSource,
    /// Time spent choosing, excluding the delay.
    pub elapsed: Duration,
    generation: u64,
}

pub struct AiTurnScheduler {
    delay: Duration,
    config: StrategyConfig,
    generation: Arc<AtomicU64>,
    sender: Sender<AiDecision>,
    receiver: Receiver<AiDecision>,
}

impl AiTurnScheduler {
    pub fn new(delay: Duration, config: StrategyConfig) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            delay,
            config,
            generation: Arc::new(AtomicU64::new(0)),
            sender,
            receiver,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Starts the current seat's turn if it is an AI seat in the Playing phase. Any turn
    /// still in flight is superseded. Returns the seat that will act.
    pub fn schedule(&self, state: &GameState) -> Option<Seat> {
        let seat = state.current_seat()?;
        if state.phase_kind() != PhaseKind::Playing
            || !state.player(seat).is_ai
            || state.showing_trick_result()
        {
            return None;
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let view = state.view_for(seat);
        let snapshot = state.clone();
        let delay = self.delay;
        let config = self.config;
        let current = Arc::clone(&self.generation);
        let sender = self.sender.clone();

        event!(
            target: "napoleon::ai",
            Level::DEBUG,
            game = state.id(),
            seat = seat.number(),
            generation,
            delay_ms = delay.as_millis() as u64,
            "ai turn scheduled"
        );
        thread::spawn(move || {
            thread::sleep(delay);
            if current.load(Ordering::SeqCst) != generation {
                return;
            }
            let started = Instant::now();
            let Some(choice) = select_ai_choice(&view, &config) else {
                return;
            };
            if current.load(Ordering::SeqCst) != generation {
                event!(
                    target: "napoleon::ai",
                    Level::DEBUG,
                    seat = seat.number(),
                    generation,
                    "discarding superseded ai decision"
                );
                return;
            }
            let decision = AiDecision {
                ai_move: AiMove::for_state(&snapshot, seat, choice.card),
                source: choice.source,
                elapsed: started.elapsed(),
                generation,
            };
            let _ = sender.send(decision);
        });
        Some(seat)
    }

    /// Invalidates any pending turn. A result that arrives later is dropped on receipt.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn try_recv(&self) -> Option<AiDecision> {
        loop {
            let decision = self.receiver.try_recv().ok()?;
            if self.is_current(&decision) {
                return Some(decision);
            }
        }
    }

    /// Waits up to `timeout` for the current turn's decision.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<AiDecision> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(decision) if self.is_current(&decision) => return Some(decision),
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn is_current(&self, decision: &AiDecision) -> bool {
        decision.generation == self.generation.load(Ordering::SeqCst)
    }
}

impl Drop for AiTurnScheduler {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
