use napoleon_core::error::{
    DealError, DeclarationError, ExchangeError, GameError, IllegalPlayReason,
};
use napoleon_core::game::scoring::{ADJUTANT_BONUS, BASE_POINTS, NAPOLEON_BONUS};
use napoleon_core::game::state::{BiddingOutcome, GameState, PhaseKind, PlayOutcome};
use napoleon_core::model::card::Card;
use napoleon_core::model::declaration::{AdjutantRole, NapoleonDeclaration};
use napoleon_core::model::deck::Deck;
use napoleon_core::model::hand::Hand;
use napoleon_core::model::player::{Player, Seat};
use napoleon_core::model::rank::Rank;
use napoleon_core::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;

const IDS: [&str; 4] = ["alice", "bob", "carol", "dave"];

fn new_game(seed: u64) -> (GameState, StdRng) {
    let players = Seat::LOOP
        .iter()
        .zip(IDS)
        .map(|(seat, id)| Player::ai(id, id.to_uppercase(), *seat))
        .collect();
    let game = GameState::new(format!("it-{seed}"), players).unwrap();
    (game, StdRng::seed_from_u64(seed))
}

fn assert_full_deck(game: &GameState) {
    let census = game.card_census();
    assert_eq!(census.len(), 52);
    let unique: HashSet<Card> = census.iter().copied().collect();
    let deck: HashSet<Card> = Deck::standard().cards().iter().copied().collect();
    assert_eq!(unique, deck);
}

fn id_of(game: &GameState, seat: Seat) -> String {
    game.player(seat).id.as_str().to_string()
}

#[test]
fn rejects_wrong_player_count() {
    let players = vec![Player::ai("a", "A", Seat::First)];
    assert_eq!(
        GameState::new("bad", players),
        Err(GameError::InvalidPlayerCount { found: 1 })
    );
}

#[test]
fn full_game_reaches_finished_with_consistent_scores() {
    let (mut game, mut rng) = new_game(2024);
    game.deal(&mut rng).unwrap();
    assert_eq!(game.phase_kind(), PhaseKind::Napoleon);
    for seat in Seat::LOOP {
        assert_eq!(game.hand(seat).len(), 12);
    }
    assert_eq!(game.hidden_cards().unwrap().len(), 4);
    assert_full_deck(&game);

    let outcome = game.declare("alice", 13, Suit::Spades).unwrap();
    assert_eq!(outcome, BiddingOutcome::Continue { next: Seat::Second });
    game.pass("bob").unwrap();
    game.pass("carol").unwrap();
    let outcome = game.pass("dave").unwrap();
    assert!(matches!(outcome, BiddingOutcome::Declared(d) if d.napoleon == Seat::First));
    assert_eq!(game.phase_kind(), PhaseKind::Adjutant);
    assert!(game.player(Seat::First).is_napoleon);

    let named = game.resolve_adjutant().unwrap();
    assert_eq!(game.phase_kind(), PhaseKind::Exchange);
    assert_eq!(game.napoleon_declaration().unwrap().adjutant_card, named);

    let hidden = game.hidden_cards().unwrap().to_vec();
    let discards: Vec<Card> = hidden.clone();
    game.exchange("alice", &discards).unwrap();
    assert_eq!(game.phase_kind(), PhaseKind::Playing);
    assert_eq!(game.exchanged_cards(), hidden.as_slice());
    assert_eq!(game.current_seat(), Some(Seat::First));
    assert!(hidden.iter().all(|card| game.was_hidden(*card)));
    assert_full_deck(&game);

    let mut tricks = 0;
    let result = loop {
        let seat = game.current_seat().unwrap();
        let card = game.legal_plays_for(seat)[0];
        let id = id_of(&game, seat);
        match game.play_card(&id, card).unwrap() {
            PlayOutcome::Played { next } => assert_eq!(next, seat.next()),
            PlayOutcome::TrickCompleted { winner, .. } => {
                tricks += 1;
                assert!(game.showing_trick_result());
                assert_eq!(game.last_completed_trick().unwrap().winner(), Some(winner));
                game.continue_after_trick().unwrap();
                assert_eq!(game.current_seat(), Some(winner));
            }
            PlayOutcome::GameFinished(result) => break result,
        }
    };
    assert_eq!(tricks, 11);
    assert_eq!(game.phase_kind(), PhaseKind::Finished);
    assert_eq!(game.tricks_completed(), 12);
    assert_full_deck(&game);

    let discarded_faces = hidden.iter().filter(|card| card.is_counting()).count() as u8;
    let captured: u8 = result.faces_by_seat.iter().sum();
    assert_eq!(captured + discarded_faces, 20);
    assert_eq!(
        result.napoleon_side_faces + result.alliance_side_faces,
        captured
    );
    assert_eq!(result.napoleon_won, result.napoleon_side_faces >= 13);

    let margin = (result.napoleon_side_faces as i32 - 13).abs();
    let sign = if result.napoleon_won { 1 } else { -1 };
    assert_eq!(result.delta(Seat::First), sign * (NAPOLEON_BONUS + BASE_POINTS * margin));
    if let AdjutantRole::Ally(ally) = result.adjutant {
        assert_eq!(result.delta(ally), sign * (ADJUTANT_BONUS + BASE_POINTS * margin));
    }
    for seat in Seat::LOOP {
        assert_eq!(game.player(seat).score, result.delta(seat));
    }
}

#[test]
fn four_passes_require_a_redeal() {
    let (mut game, mut rng) = new_game(5);
    game.deal(&mut rng).unwrap();
    for id in IDS {
        game.pass(id).unwrap();
    }
    assert!(game.needs_redeal());
    assert_eq!(game.pass("alice"), Err(GameError::AllPlayersPassed));
    assert_eq!(game.reshuffle_count(), 0);

    game.deal(&mut rng).unwrap();
    assert_eq!(game.reshuffle_count(), 1);
    assert_eq!(game.phase_kind(), PhaseKind::Napoleon);
    assert!(game.passed_players().is_empty());
}

#[test]
fn bids_must_climb_and_passed_players_stay_out() {
    let (mut game, mut rng) = new_game(8);
    game.deal(&mut rng).unwrap();
    game.declare("alice", 14, Suit::Hearts).unwrap();
    let version = game.version();
    assert!(matches!(
        game.declare("bob", 14, Suit::Clubs),
        Err(GameError::InvalidDeclaration(
            DeclarationError::NotHigherThanStanding { .. }
        ))
    ));
    assert_eq!(game.version(), version);

    game.pass("bob").unwrap();
    game.declare("carol", 15, Suit::Clubs).unwrap();
    game.pass("dave").unwrap();
    assert_eq!(game.current_seat(), Some(Seat::First));
    assert_eq!(
        game.declare("bob", 16, Suit::Clubs),
        Err(GameError::InvalidDeclaration(DeclarationError::AlreadyPassed(
            Seat::Second
        )))
    );
    let outcome = game.pass("alice").unwrap();
    assert!(matches!(outcome, BiddingOutcome::Declared(d) if d.napoleon == Seat::Third && d.target == 15));
}

#[test]
fn ceiling_bid_resolves_immediately() {
    let (mut game, mut rng) = new_game(10);
    game.deal(&mut rng).unwrap();
    game.pass("alice").unwrap();
    let outcome = game.declare("bob", 20, Suit::Diamonds).unwrap();
    assert!(matches!(outcome, BiddingOutcome::Declared(d) if d.napoleon == Seat::Second));
    assert_eq!(game.trump_suit(), Some(Suit::Diamonds));
}

#[test]
fn exchange_validates_before_mutating() {
    let (mut game, mut rng) = new_game(12);
    game.deal(&mut rng).unwrap();
    game.declare("alice", 12, Suit::Clubs).unwrap();
    for id in ["bob", "carol", "dave"] {
        game.pass(id).unwrap();
    }
    game.resolve_adjutant().unwrap();
    let hand = game.hand(Seat::First).cards().to_vec();

    assert!(matches!(
        game.exchange("bob", &hand[..4]),
        Err(GameError::IllegalPlay(IllegalPlayReason::OutOfTurn { .. }))
    ));
    assert!(matches!(
        game.exchange("alice", &hand[..3]),
        Err(GameError::InvalidExchange(ExchangeError::WrongDiscardCount { .. }))
    ));
    let duplicated = [hand[0], hand[0], hand[1], hand[2]];
    assert_eq!(
        game.exchange("alice", &duplicated),
        Err(GameError::InvalidExchange(ExchangeError::DuplicateCard(hand[0])))
    );
    let foreign = game.hand(Seat::Second).cards()[0];
    assert_eq!(
        game.exchange("alice", &[hand[0], hand[1], hand[2], foreign]),
        Err(GameError::InvalidExchange(ExchangeError::UnknownCard(foreign)))
    );
    assert_eq!(game.phase_kind(), PhaseKind::Exchange);
    assert_eq!(game.hand(Seat::First).cards(), hand.as_slice());
}

#[test]
fn plays_wait_for_continuation_after_a_trick() {
    let (mut game, mut rng) = new_game(31);
    game.deal(&mut rng).unwrap();
    game.declare("alice", 11, Suit::Hearts).unwrap();
    for id in ["bob", "carol", "dave"] {
        game.pass(id).unwrap();
    }
    game.resolve_adjutant().unwrap();
    let discards = game.hidden_cards().unwrap().to_vec();
    game.exchange("alice", &discards).unwrap();

    for _ in 0..4 {
        let seat = game.current_seat().unwrap();
        let card = game.legal_plays_for(seat)[0];
        let id = id_of(&game, seat);
        game.play_card(&id, card).unwrap();
    }
    let seat = game.current_seat().unwrap();
    let id = id_of(&game, seat);
    let card = game.hand(seat).cards()[0];
    assert_eq!(game.play_card(&id, card), Err(GameError::AwaitingContinuation));
    game.continue_after_trick().unwrap();
    let card = game.legal_plays_for(seat)[0];
    assert!(game.play_card(&id, card).is_ok());
}

#[test]
fn must_follow_the_leading_suit() {
    let (mut game, mut rng) = new_game(44);
    game.deal(&mut rng).unwrap();
    game.declare("alice", 11, Suit::Spades).unwrap();
    for id in ["bob", "carol", "dave"] {
        game.pass(id).unwrap();
    }
    game.resolve_adjutant().unwrap();
    let discards = game.hidden_cards().unwrap().to_vec();
    game.exchange("alice", &discards).unwrap();

    let lead = game.hand(Seat::First).cards()[0];
    game.play_card("alice", lead).unwrap();
    let bob = game.hand(Seat::Second);
    if bob.has_suit(lead.suit) {
        let off_suit = bob.iter().copied().find(|card| card.suit != lead.suit);
        if let Some(off_suit) = off_suit {
            assert_eq!(
                game.play_card("bob", off_suit),
                Err(GameError::IllegalPlay(IllegalPlayReason::MustFollowSuit(
                    lead.suit
                )))
            );
        }
    }
    let missing = Card::new(Rank::Two, lead.suit);
    if !game.hand(Seat::Second).contains(missing) && lead != missing {
        assert_eq!(
            game.play_card("bob", missing),
            Err(GameError::IllegalPlay(IllegalPlayReason::CardNotInHand(missing)))
        );
    }
}

/// Deck order: the first four cards are the discards, then twelve per seat.
fn fixed_deal() -> ([Vec<Card>; 4], Vec<Card>) {
    let cards = Deck::standard().cards().to_vec();
    let exchanged = cards[..4].to_vec();
    let hands = std::array::from_fn(|seat| cards[4 + seat * 12..4 + (seat + 1) * 12].to_vec());
    (hands, exchanged)
}

fn resume(hands: [Vec<Card>; 4], exchanged: Vec<Card>) -> Result<GameState, GameError> {
    let players = Seat::LOOP
        .iter()
        .zip(IDS)
        .zip(hands)
        .map(|((seat, id), cards)| {
            let mut player = Player::ai(id, id.to_uppercase(), *seat);
            player.hand = Hand::with_cards(cards);
            player
        })
        .collect();
    let declaration = NapoleonDeclaration {
        napoleon: Seat::First,
        target: 13,
        trump: Suit::Spades,
        adjutant_card: Some(Card::MIGHTY),
    };
    GameState::resume_playing("resumed", players, declaration, exchanged)
}

#[test]
fn resuming_a_full_deal_keeps_the_census() {
    let (hands, exchanged) = fixed_deal();
    let game = resume(hands, exchanged).unwrap();
    assert_eq!(game.phase_kind(), PhaseKind::Playing);
    assert_full_deck(&game);
}

#[test]
fn resuming_rejects_short_hands() {
    let (mut hands, exchanged) = fixed_deal();
    hands[2].truncate(1);
    assert_eq!(
        resume(hands, exchanged),
        Err(GameError::InvalidDeal(DealError::WrongHandSize {
            seat: Seat::Third,
            expected: 12,
            found: 1,
        }))
    );
}

#[test]
fn resuming_rejects_duplicate_cards() {
    let (mut hands, exchanged) = fixed_deal();
    let copied = hands[0][0];
    hands[1][0] = copied;
    assert_eq!(
        resume(hands, exchanged),
        Err(GameError::InvalidDeal(DealError::DuplicateCard(copied)))
    );

    let (hands, _) = fixed_deal();
    let ace = Card::new(Rank::Ace, Suit::Hearts);
    assert_eq!(
        resume(hands, vec![ace; 4]),
        Err(GameError::InvalidDeal(DealError::DuplicateCard(ace)))
    );
}
