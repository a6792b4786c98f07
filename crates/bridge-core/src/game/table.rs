use crate::game::error::{GameError, invariant};
use crate::game::state::{GameOptions, GameState, PassOutcome, RoundEndReason, RoundOutcome};
use crate::model::card::Card;
use crate::model::moves::{Move, PlayerMove};
use crate::model::player::{Player, next_seat};
use crate::model::rank::Rank;
use crate::model::rules;
use crate::model::stack::CardStack;
use crate::model::suit::Suit;
use crate::random::{RandomIndexSource, RngIndexSource};
use core::fmt;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, error, info};

/// Who plays after the current turn, and who suffers its penalties.
/// Lives for the whole turn so skips accumulate across continued moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TurnCursor {
    actor: usize,
    next_player: usize,
    victim: usize,
    seats: usize,
}

impl TurnCursor {
    fn start(actor: usize, seats: usize, rank: Rank) -> Self {
        let next_player = if rank == rules::FREE_MOVE_RANK {
            actor
        } else {
            next_seat(actor, seats)
        };
        Self {
            actor,
            next_player,
            victim: next_seat(actor, seats),
            seats,
        }
    }

    fn skip(&mut self) {
        self.next_player = next_seat(self.next_player, self.seats);
        self.victim = next_seat(self.victim, self.seats);
        if self.victim == self.actor {
            self.victim = next_seat(self.victim, self.seats);
        }
    }
}

/// One table: the players, both stacks and the rule state machine.
#[derive(Debug, Clone)]
pub struct Game<R = RngIndexSource> {
    players: Vec<Player>,
    drawing_stack: CardStack,
    active_stack: CardStack,
    dealer_index: usize,
    current_player_index: usize,
    history: Vec<PlayerMove>,
    legal_cards: BTreeSet<Card>,
    points_ratio: u32,
    required_first_card: Option<Card>,
    state: GameState,
    turn: Option<TurnCursor>,
    outcome: Option<RoundOutcome>,
    options: GameOptions,
    source: R,
    poisoned: bool,
}

impl<R: RandomIndexSource> Game<R> {
    pub fn new<I, S>(source: R, player_names: I) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_options(source, player_names, GameOptions::default())
    }

    pub fn with_options<I, S>(
        source: R,
        player_names: I,
        options: GameOptions,
    ) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = player_names.into_iter().map(Into::into).collect();

        if let Some(index) = names.iter().position(|name| name.trim().is_empty()) {
            return Err(GameError::InvalidPlayerName(index));
        }

        if !(rules::MIN_PLAYERS..=rules::MAX_PLAYERS).contains(&names.len()) {
            return Err(GameError::InvalidPlayerCount {
                count: names.len(),
                min: rules::MIN_PLAYERS,
                max: rules::MAX_PLAYERS,
            });
        }

        let mut game = Self {
            players: names.into_iter().map(Player::new).collect(),
            drawing_stack: CardStack::full_deck(options.consistency),
            active_stack: CardStack::empty(options.consistency),
            dealer_index: 0,
            current_player_index: 0,
            history: Vec::new(),
            legal_cards: BTreeSet::new(),
            points_ratio: rules::INITIAL_POINTS_RATIO,
            required_first_card: None,
            state: GameState::DealerFirstMove,
            turn: None,
            outcome: None,
            options,
            source,
            poisoned: false,
        };

        game.deal()?;
        Ok(game)
    }

    /// Plays `mv` for the current player. Rule violations leave the game
    /// unchanged.
    pub fn make_move(&mut self, mv: Move) -> Result<GameState, GameError> {
        self.ensure_usable()?;

        if let Err(err) = self.validate_move(&mv) {
            debug!(player = self.current_player_index, %mv, %err, "move rejected");
            return Err(err);
        }

        let result = self.apply_move(mv);
        self.stop_on_internal_error(result)
    }

    /// Draws a card for a current player who has nothing to play.
    pub fn pass(&mut self) -> Result<PassOutcome, GameError> {
        self.ensure_usable()?;

        let actor = self.current_player_index;
        match self.state {
            GameState::RoundEnded => return Err(GameError::RoundEnded),
            GameState::PlayerTurnStarted => {}
            GameState::DealerFirstMove | GameState::PlayerTurnContinued => {
                return Err(GameError::PassNotAllowed(actor));
            }
        }

        if self.has_playable_card(actor) {
            debug!(player = actor, "pass rejected: a playable card is in hand");
            return Err(GameError::PassNotAllowed(actor));
        }

        let result = self.apply_pass(actor);
        self.stop_on_internal_error(result)
    }

    /// Collects every card, moves the deal to the next seat and deals again.
    /// Scores carry over.
    pub fn start_next_round(&mut self) -> Result<(), GameError> {
        self.ensure_usable()?;

        if self.state != GameState::RoundEnded {
            return Err(GameError::RoundInProgress);
        }

        let result = self.redeal();
        self.stop_on_internal_error(result)
    }

    fn deal(&mut self) -> Result<(), GameError> {
        if !self.active_stack.is_empty() {
            return Err(invariant(format!(
                "the active stack must be empty before dealing but has {} cards",
                self.active_stack.len()
            )));
        }

        self.drawing_stack.shuffle(&mut self.source)?;

        let seats = self.players.len();
        let mut last_dealt = None;
        for _ in 0..rules::CARDS_PER_PLAYER {
            for offset in 1..=seats {
                let seat = (self.dealer_index + offset) % seats;
                let card = self.drawing_stack.withdraw_top_card()?;
                self.players[seat].append_card(card)?;
                last_dealt = Some(card);
            }
        }

        self.required_first_card = last_dealt;
        self.current_player_index = self.dealer_index;
        self.state = GameState::DealerFirstMove;
        self.refresh_legal_cards()?;
        self.verify_card_conservation()?;

        debug!(
            dealer = self.dealer_index,
            required_first_card = ?self.required_first_card,
            drawing = self.drawing_stack.len(),
            "cards dealt"
        );
        Ok(())
    }

    fn redeal(&mut self) -> Result<(), GameError> {
        let mut cards = self.drawing_stack.withdraw_all_cards()?;
        cards.extend(self.active_stack.withdraw_all_cards()?);
        for player in &mut self.players {
            cards.extend(player.take_all_cards());
        }

        if cards.len() != rules::DECK_SIZE {
            return Err(invariant(format!(
                "collected {} cards instead of {}",
                cards.len(),
                rules::DECK_SIZE
            )));
        }
        self.drawing_stack.refill(cards)?;

        self.dealer_index = next_seat(self.dealer_index, self.players.len());
        self.history.clear();
        self.turn = None;
        self.outcome = None;
        self.points_ratio = rules::INITIAL_POINTS_RATIO;

        self.deal()
    }

    fn apply_move(&mut self, mv: Move) -> Result<GameState, GameError> {
        let actor = self.current_player_index;
        let seats = self.players.len();
        let mut turn = self
            .turn
            .take()
            .unwrap_or_else(|| TurnCursor::start(actor, seats, mv.rank()));

        let last_index = mv.cards().len() - 1;
        for (index, &card) in mv.cards().iter().enumerate() {
            self.players[actor].remove_card(card)?;
            self.active_stack.deposit_on_top(card)?;

            match card.rank {
                Rank::Seven => self.draw_cards(turn.victim, rules::SEVEN_PENALTY)?,
                Rank::Eight => {
                    self.draw_cards(turn.victim, rules::EIGHT_PENALTY)?;
                    turn.skip();
                }
                Rank::Queen if card.is_queen_of_spades() && index == last_index => {
                    self.draw_cards(turn.victim, rules::QUEEN_OF_SPADES_PENALTY)?;
                    turn.skip();
                }
                Rank::Ace => turn.skip(),
                Rank::Six | Rank::Nine | Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => {}
            }
        }

        let rank = mv.rank();
        let completed = mv.is_turn_completed();
        let end = if mv.is_bridge_declared() {
            Some(RoundEndReason::BridgeDeclared)
        } else if self.players[actor].hand().is_empty() && rank != rules::FREE_MOVE_RANK {
            Some(RoundEndReason::HandEmptied)
        } else if self.drawing_stack.is_empty() {
            Some(RoundEndReason::DeckExhausted)
        } else {
            None
        };

        debug!(player = actor, %mv, "move applied");
        self.history.push(PlayerMove { player: actor, mv });
        self.required_first_card = None;

        if let Some(reason) = end {
            self.finish_round(actor, reason);
        } else if completed {
            self.current_player_index = turn.next_player;
            self.state = GameState::PlayerTurnStarted;
        } else {
            self.turn = Some(turn);
            self.state = GameState::PlayerTurnContinued;
        }

        self.refresh_legal_cards()?;
        self.verify_card_conservation()?;
        Ok(self.state)
    }

    fn apply_pass(&mut self, actor: usize) -> Result<PassOutcome, GameError> {
        let drawn = self.draw_card()?;
        if let Some(card) = drawn {
            self.players[actor].append_card(card)?;
        }

        let outcome = match drawn {
            Some(card) if !self.drawing_stack.is_empty() => {
                if self.legal_cards.contains(&card) {
                    PassOutcome::Playable(card)
                } else if self.must_cover_own_six(actor) {
                    PassOutcome::MustDrawAgain(card)
                } else {
                    self.current_player_index = next_seat(actor, self.players.len());
                    PassOutcome::TurnPassed(card)
                }
            }
            _ => {
                self.finish_round(actor, RoundEndReason::DeckExhausted);
                self.refresh_legal_cards()?;
                PassOutcome::RoundEnded
            }
        };

        debug!(player = actor, ?outcome, "player passed");
        self.verify_card_conservation()?;
        Ok(outcome)
    }

    fn draw_cards(&mut self, seat: usize, count: usize) -> Result<(), GameError> {
        for _ in 0..count {
            match self.draw_card()? {
                Some(card) => self.players[seat].append_card(card)?,
                None => break,
            }
        }
        Ok(())
    }

    /// Takes the top of the drawing stack. When that empties it, the active
    /// stack below its top run is shuffled back in and the stake rises. An
    /// empty drawing stack afterwards means the deck is exhausted.
    fn draw_card(&mut self) -> Result<Option<Card>, GameError> {
        if self.drawing_stack.is_empty() {
            return Ok(None);
        }

        let card = self.drawing_stack.withdraw_top_card()?;

        if self.drawing_stack.is_empty() {
            let refill = if self.active_stack.is_empty() {
                Vec::new()
            } else {
                self.active_stack.withdraw_all_except_top_run()?
            };

            if refill.is_empty() {
                info!("drawing stack exhausted with nothing to reshuffle");
            } else {
                let count = refill.len();
                self.drawing_stack.refill(refill)?;
                self.drawing_stack.shuffle(&mut self.source)?;
                self.points_ratio += 1;
                info!(
                    cards = count,
                    points_ratio = self.points_ratio,
                    "drawing stack replenished from active stack"
                );
            }
        }

        Ok(Some(card))
    }
}

impl<R> Game<R> {
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    pub fn drawing_stack(&self) -> &CardStack {
        &self.drawing_stack
    }

    pub fn active_stack(&self) -> &CardStack {
        &self.active_stack
    }

    pub fn dealer_index(&self) -> usize {
        self.dealer_index
    }

    pub fn current_dealer(&self) -> &Player {
        &self.players[self.dealer_index]
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_index]
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn legal_cards(&self) -> &BTreeSet<Card> {
        &self.legal_cards
    }

    /// Legal cards the current player actually holds.
    pub fn playable_cards(&self) -> Vec<Card> {
        self.current_player()
            .hand()
            .iter()
            .copied()
            .filter(|card| self.legal_cards.contains(card))
            .collect()
    }

    pub fn points_ratio(&self) -> u32 {
        self.points_ratio
    }

    pub fn required_first_card(&self) -> Option<Card> {
        self.required_first_card
    }

    pub fn history(&self) -> &[PlayerMove] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&PlayerMove> {
        self.history.last()
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        self.outcome
    }

    pub fn options(&self) -> GameOptions {
        self.options
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Whether the same-rank run on top of the active stack plus the cards
    /// of `mv` would reach a bridge.
    pub fn can_declare_bridge_with(&self, mv: &Move) -> bool {
        let run = match self.active_stack.top() {
            Some(top) if top.rank == mv.rank() => self.active_stack.top_run_len(),
            _ => 0,
        };
        run + mv.cards().len() >= rules::BRIDGE_LENGTH
    }

    fn ensure_usable(&self) -> Result<(), GameError> {
        if self.poisoned {
            Err(GameError::Poisoned)
        } else {
            Ok(())
        }
    }

    fn stop_on_internal_error<T>(&mut self, result: Result<T, GameError>) -> Result<T, GameError> {
        if let Err(err @ GameError::Internal(_)) = &result {
            error!(%err, "internal consistency failure, game stopped");
            self.poisoned = true;
        }
        result
    }

    fn validate_move(&self, mv: &Move) -> Result<(), GameError> {
        if self.state == GameState::RoundEnded {
            return Err(GameError::RoundEnded);
        }

        let first = mv.first_card();
        if !self.legal_cards.contains(&first) {
            return Err(GameError::IllegalMove {
                card: first,
                legal: self.legal_cards.iter().copied().collect(),
            });
        }

        if mv.is_bridge_declared() && !self.can_declare_bridge_with(mv) {
            return Err(GameError::IllegalBridge(mv.clone()));
        }

        let actor = self.current_player_index;
        let hand = self.players[actor].hand();
        if let Some(&card) = mv.cards().iter().find(|card| !hand.contains(**card)) {
            return Err(GameError::CardNotInHand {
                player: actor,
                card,
            });
        }

        if !mv.is_turn_completed() && hand.count_rank(mv.rank()) <= mv.cards().len() {
            return Err(GameError::CannotContinueTurn {
                player: actor,
                rank: mv.rank(),
            });
        }

        Ok(())
    }

    fn has_playable_card(&self, seat: usize) -> bool {
        self.players[seat]
            .hand()
            .iter()
            .any(|card| self.legal_cards.contains(card))
    }

    fn must_cover_own_six(&self, seat: usize) -> bool {
        let own_top = self.last_move().is_some_and(|last| last.player == seat);
        own_top
            && self
                .active_stack
                .top()
                .is_some_and(|top| top.rank == rules::FREE_MOVE_RANK)
    }

    fn finish_round(&mut self, player: usize, reason: RoundEndReason) {
        self.state = GameState::RoundEnded;
        self.turn = None;
        self.required_first_card = None;
        self.outcome = Some(RoundOutcome {
            reason,
            player,
            points_ratio: self.points_ratio,
        });
        info!(player, ?reason, points_ratio = self.points_ratio, "round ended");
    }

    fn refresh_legal_cards(&mut self) -> Result<(), GameError> {
        self.legal_cards = self.compute_legal_cards()?;
        Ok(())
    }

    fn compute_legal_cards(&self) -> Result<BTreeSet<Card>, GameError> {
        match self.state {
            GameState::DealerFirstMove => {
                let card = self.required_first_card.ok_or_else(|| {
                    invariant("the dealer's first move has no required card")
                })?;
                Ok(BTreeSet::from([card]))
            }
            GameState::RoundEnded => Ok(BTreeSet::new()),
            GameState::PlayerTurnStarted | GameState::PlayerTurnContinued => {
                let top = self
                    .active_stack
                    .top()
                    .ok_or_else(|| invariant("a move was made but the active stack is empty"))?;
                let last = self
                    .last_move()
                    .ok_or_else(|| invariant("the active stack is not empty but no move was made"))?;
                if last.mv.last_card() != top {
                    return Err(invariant(format!(
                        "top card {top} does not match the last move ({})",
                        last.mv
                    )));
                }

                let cards = if self.state == GameState::PlayerTurnContinued {
                    legal_continuations(top)
                } else {
                    legal_responses(top, last.mv.requested_suit())
                };
                Ok(cards)
            }
        }
    }

    /// With strict checks, every card of the deck must be in exactly one
    /// place.
    fn verify_card_conservation(&self) -> Result<(), GameError> {
        if !self.options.consistency.is_strict() {
            return Ok(());
        }

        let mut seen = HashSet::with_capacity(rules::DECK_SIZE);
        let held = self.players.iter().flat_map(|player| player.hand().iter());
        let stacked = self
            .drawing_stack
            .cards()
            .iter()
            .chain(self.active_stack.cards());
        for &card in held.chain(stacked) {
            if !seen.insert(card) {
                return Err(invariant(format!("card {card} is in play twice")));
            }
        }

        if seen.len() != rules::DECK_SIZE {
            return Err(invariant(format!(
                "{} of {} cards are accounted for",
                seen.len(),
                rules::DECK_SIZE
            )));
        }
        Ok(())
    }
}

fn legal_continuations(top: Card) -> BTreeSet<Card> {
    Card::ALL
        .iter()
        .copied()
        .filter(|card| card.rank == top.rank)
        .collect()
}

fn legal_responses(top: Card, requested_suit: Option<Suit>) -> BTreeSet<Card> {
    let suit = requested_suit.unwrap_or(top.suit);
    Card::ALL
        .iter()
        .copied()
        .filter(|card| card.is_trump() || card.suit == suit || card.rank == top.rank)
        .collect()
}

impl<R> fmt::Display for Game<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} players, dealer {}, current {}, {}, points ratio {}, drawing {}, active {}",
            self.players.len(),
            self.dealer_index,
            self.current_player_index,
            self.state,
            self.points_ratio,
            self.drawing_stack.len(),
            self.active_stack.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Game;
    use crate::game::error::GameError;
    use crate::game::snapshot::GameSnapshot;
    use crate::game::state::{GameOptions, GameState, PassOutcome, RoundEndReason};
    use crate::model::card::Card;
    use crate::model::moves::{Move, PlayerMove};
    use crate::model::stack::{CardStack, ConsistencyChecks};
    use crate::model::suit::Suit;
    use crate::random::{RandomError, RandomIndexSource};

    /// Shuffles become the identity permutation.
    #[derive(Debug, Clone)]
    struct Zero;

    impl RandomIndexSource for Zero {
        fn next_index(&mut self, bound: usize) -> Result<usize, RandomError> {
            if bound == 0 {
                return Err(RandomError::InvalidBound(bound));
            }
            Ok(0)
        }
    }

    fn card(code: &str) -> Card {
        code.parse().unwrap()
    }

    fn cards(codes: &[&str]) -> Vec<Card> {
        codes.iter().map(|code| card(code)).collect()
    }

    fn names(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("Player {i}")).collect()
    }

    fn new_game(players: usize) -> Game<Zero> {
        Game::with_options(Zero, names(players), GameOptions::strict()).unwrap()
    }

    /// A game in `PlayerTurnStarted` right after `previous` played `last`.
    /// Cards not mentioned form the drawing stack, or sit below the active
    /// top when `drawing` is given.
    fn rigged(
        hands: Vec<Vec<Card>>,
        last: Move,
        previous: usize,
        current: usize,
        drawing: Option<Vec<Card>>,
    ) -> Game<Zero> {
        let mut game = new_game(hands.len());
        for player in &mut game.players {
            player.take_all_cards();
        }
        for (player, hand) in game.players.iter_mut().zip(&hands) {
            for &c in hand {
                player.append_card(c).unwrap();
            }
        }

        let top = last.cards().to_vec();
        let mut used: Vec<Card> = hands.iter().flatten().copied().collect();
        used.extend(&top);
        if let Some(drawing) = &drawing {
            used.extend(drawing);
        }
        let leftover: Vec<Card> = Card::ALL
            .iter()
            .copied()
            .filter(|c| !used.contains(c))
            .collect();

        let (drawing, active) = match drawing {
            Some(drawing) => (drawing, leftover.into_iter().chain(top).collect()),
            None => (leftover, top),
        };
        game.drawing_stack = CardStack::with_checks(drawing, ConsistencyChecks::Strict).unwrap();
        game.active_stack = CardStack::with_checks(active, ConsistencyChecks::Strict).unwrap();
        game.history = vec![PlayerMove {
            player: previous,
            mv: last,
        }];
        game.current_player_index = current;
        game.required_first_card = None;
        game.state = GameState::PlayerTurnStarted;
        game.refresh_legal_cards().unwrap();
        game.verify_card_conservation().unwrap();
        game
    }

    fn single(code: &str) -> Move {
        Move::single(card(code)).unwrap()
    }

    #[test]
    fn identity_shuffle_deals_from_the_top() {
        let game = new_game(2);

        assert_eq!(game.dealer_index(), 0);
        assert_eq!(game.current_player_index(), 0);
        assert_eq!(game.points_ratio(), 1);
        assert_eq!(game.state(), GameState::DealerFirstMove);
        assert!(game.active_stack().is_empty());
        assert_eq!(game.drawing_stack().len(), 26);
        assert_eq!(game.required_first_card(), Some(card("QD")));
        assert_eq!(game.legal_cards().len(), 1);

        let dealer: Vec<Card> = game.players()[0].hand().iter().copied().collect();
        assert_eq!(dealer, cards(&["QD", "KS", "KD", "AS", "AD"]));
        let other: Vec<Card> = game.players()[1].hand().iter().copied().collect();
        assert_eq!(other, cards(&["QH", "KC", "KH", "AC", "AH"]));
        assert_eq!(game.drawing_stack().top(), Some(card("QC")));
    }

    #[test]
    fn blank_names_and_bad_counts_are_rejected() {
        assert_eq!(
            Game::new(Zero, ["Ann"]).unwrap_err(),
            GameError::InvalidPlayerCount {
                count: 1,
                min: 2,
                max: 5
            }
        );
        assert!(matches!(
            Game::new(Zero, names(6)).unwrap_err(),
            GameError::InvalidPlayerCount { count: 6, .. }
        ));
        assert_eq!(
            Game::new(Zero, ["Ann", "  "]).unwrap_err(),
            GameError::InvalidPlayerName(1)
        );
        assert_eq!(
            Game::new(Zero, ["", "Bob", "Cid"]).unwrap_err(),
            GameError::InvalidPlayerName(0)
        );
        for count in 2..=5 {
            let game = new_game(count);
            assert_eq!(game.players().len(), count);
            assert_eq!(game.drawing_stack().len(), 36 - 5 * count);
        }
    }

    #[test]
    fn dealer_must_open_with_required_card() {
        let mut game = new_game(2);
        let before = GameSnapshot::capture(&game);

        let err = game.make_move(single("KS")).unwrap_err();
        assert!(matches!(err, GameError::IllegalMove { card, .. } if card == self::card("KS")));
        assert_eq!(GameSnapshot::capture(&game), before);

        let state = game.make_move(single("QD")).unwrap();
        assert_eq!(state, GameState::PlayerTurnStarted);
        assert_eq!(game.required_first_card(), None);
        assert_eq!(game.current_player_index(), 1);
        assert_eq!(game.active_stack().cards(), &[card("QD")]);
        assert!(game.legal_cards().contains(&card("QH")));
        assert!(game.legal_cards().contains(&card("6D")));
        assert!(game.legal_cards().contains(&card("JS")));
        assert!(!game.legal_cards().contains(&card("KH")));
        assert_eq!(game.playable_cards(), vec![card("QH")]);
    }

    #[test]
    fn card_missing_from_hand_is_rejected() {
        let mut game = rigged(
            vec![cards(&["9D"]), cards(&["6H"])],
            single("KS"),
            1,
            0,
            None,
        );
        let before = GameSnapshot::capture(&game);
        assert_eq!(
            game.make_move(single("KH")).unwrap_err(),
            GameError::CardNotInHand {
                player: 0,
                card: card("KH")
            }
        );
        assert_eq!(GameSnapshot::capture(&game), before);
    }

    #[test]
    fn seven_makes_next_player_draw_one() {
        let mut game = rigged(
            vec![cards(&["7S", "9D"]), cards(&["AH"]), cards(&["AC"])],
            single("KS"),
            2,
            0,
            None,
        );
        let drawing_before = game.drawing_stack().len();
        game.make_move(single("7S")).unwrap();
        assert_eq!(game.players()[1].hand().len(), 2);
        assert_eq!(game.players()[2].hand().len(), 1);
        assert_eq!(game.drawing_stack().len(), drawing_before - 1);
        assert_eq!(game.current_player_index(), 1);
    }

    #[test]
    fn eight_refills_drawing_stack_and_raises_ratio() {
        let mut game = rigged(
            vec![cards(&["8S", "9D"]), cards(&["AH"])],
            single("KS"),
            1,
            0,
            Some(cards(&["7C"])),
        );
        let active_before = game.active_stack().len();
        assert_eq!(game.drawing_stack().len(), 1);

        game.make_move(single("8S")).unwrap();

        let victim = game.players()[1].hand();
        assert_eq!(victim.len(), 3);
        assert!(victim.contains(card("7C")));
        assert!(victim.contains(card("KS")));
        assert_eq!(game.points_ratio(), 2);
        assert_eq!(game.active_stack().cards(), &[card("8S")]);
        assert_eq!(game.drawing_stack().len(), active_before - 1);
        // two seats: skipping the victim hands the turn straight back
        assert_eq!(game.current_player_index(), 0);
    }

    #[test]
    fn ace_skips_next_player() {
        let mut game = rigged(
            vec![cards(&["AS", "9D"]), cards(&["6H"]), cards(&["6C"])],
            single("KS"),
            2,
            0,
            None,
        );
        game.make_move(single("AS")).unwrap();
        assert_eq!(game.current_player_index(), 2);
        assert_eq!(game.players()[1].hand().len(), 1);
    }

    #[test]
    fn two_aces_skip_two_players() {
        let mut game = rigged(
            vec![
                cards(&["AS", "AD", "9D"]),
                cards(&["6H"]),
                cards(&["6C"]),
                cards(&["7C"]),
            ],
            single("KS"),
            3,
            0,
            None,
        );
        let mv = Move::new(cards(&["AS", "AD"]), None, false, true).unwrap();
        game.make_move(mv).unwrap();
        assert_eq!(game.current_player_index(), 3);
    }

    #[test]
    fn queen_of_spades_last_makes_victim_draw_five() {
        let mut game = rigged(
            vec![cards(&["QS", "9D"]), cards(&["6H"]), cards(&["6C"])],
            single("KS"),
            2,
            0,
            None,
        );
        game.make_move(single("QS")).unwrap();
        assert_eq!(game.players()[1].hand().len(), 6);
        assert_eq!(game.current_player_index(), 2);
    }

    #[test]
    fn queen_of_spades_covered_by_another_queen_is_harmless() {
        let mut game = rigged(
            vec![cards(&["QS", "QH", "9D"]), cards(&["6H"]), cards(&["6C"])],
            single("KS"),
            2,
            0,
            None,
        );
        let mv = Move::new(cards(&["QS", "QH"]), None, false, true).unwrap();
        game.make_move(mv).unwrap();
        assert_eq!(game.players()[1].hand().len(), 1);
        assert_eq!(game.current_player_index(), 1);
    }

    #[test]
    fn jack_requests_suit_for_next_player() {
        let mut game = rigged(
            vec![cards(&["JC", "9D"]), cards(&["6H", "7D"])],
            single("KS"),
            1,
            0,
            None,
        );
        game.make_move(Move::with_request(card("JC"), Suit::Hearts).unwrap())
            .unwrap();
        assert_eq!(game.current_player_index(), 1);
        let legal = game.legal_cards();
        assert!(legal.contains(&card("6H")));
        assert!(legal.contains(&card("JD")));
        assert!(!legal.contains(&card("7D")));
        assert!(!legal.contains(&card("9C")));
        assert_eq!(game.playable_cards(), vec![card("6H")]);
    }

    #[test]
    fn continued_turn_only_accepts_same_rank() {
        let mut game = rigged(
            vec![cards(&["9S", "9H", "9D", "KD"]), cards(&["6H"])],
            single("KS"),
            1,
            0,
            None,
        );
        let state = game
            .make_move(Move::new(cards(&["9S"]), None, false, false).unwrap())
            .unwrap();
        assert_eq!(state, GameState::PlayerTurnContinued);
        assert_eq!(game.current_player_index(), 0);
        assert_eq!(game.legal_cards().len(), 4);

        assert!(matches!(
            game.make_move(single("KD")),
            Err(GameError::IllegalMove { .. })
        ));
        assert_eq!(
            game.make_move(Move::new(cards(&["9H", "9D"]), None, false, false).unwrap()),
            Err(GameError::CannotContinueTurn {
                player: 0,
                rank: crate::model::rank::Rank::Nine
            })
        );
        assert_eq!(game.pass(), Err(GameError::PassNotAllowed(0)));

        let mv = Move::new(cards(&["9H", "9D"]), None, false, true).unwrap();
        assert_eq!(game.make_move(mv).unwrap(), GameState::PlayerTurnStarted);
        assert_eq!(game.current_player_index(), 1);
        assert_eq!(game.history().len(), 3);
    }

    #[test]
    fn skips_accumulate_across_a_continued_turn() {
        let mut game = rigged(
            vec![
                cards(&["AS", "AD", "9D"]),
                cards(&["6H"]),
                cards(&["6C"]),
                cards(&["7C"]),
            ],
            single("KS"),
            3,
            0,
            None,
        );
        game.make_move(Move::new(cards(&["AS"]), None, false, false).unwrap())
            .unwrap();
        game.make_move(single("AD")).unwrap();
        assert_eq!(game.current_player_index(), 3);
    }

    #[test]
    fn six_keeps_the_turn_until_covered() {
        let mut game = rigged(
            vec![cards(&["6S", "9S", "KD"]), cards(&["6H"])],
            single("KS"),
            1,
            0,
            None,
        );
        assert_eq!(game.make_move(single("6S")).unwrap(), GameState::PlayerTurnStarted);
        assert_eq!(game.current_player_index(), 0);
        game.make_move(single("9S")).unwrap();
        assert_eq!(game.current_player_index(), 1);
    }

    #[test]
    fn bridge_needs_four_of_a_rank() {
        let last = Move::new(cards(&["9C", "9D"]), None, false, true).unwrap();
        let mut game = rigged(
            vec![cards(&["9S", "9H", "KD"]), cards(&["6H"])],
            last,
            1,
            0,
            None,
        );

        let short = Move::new(cards(&["9S"]), None, true, true).unwrap();
        assert!(!game.can_declare_bridge_with(&short));
        let before = GameSnapshot::capture(&game);
        assert_eq!(game.make_move(short.clone()), Err(GameError::IllegalBridge(short)));
        assert_eq!(GameSnapshot::capture(&game), before);
        assert_eq!(game.state(), GameState::PlayerTurnStarted);

        let full = Move::new(cards(&["9S", "9H"]), None, true, true).unwrap();
        assert_eq!(game.make_move(full).unwrap(), GameState::RoundEnded);
        let outcome = game.outcome().unwrap();
        assert_eq!(outcome.reason, RoundEndReason::BridgeDeclared);
        assert_eq!(outcome.player, 0);
        assert!(game.legal_cards().is_empty());
        assert_eq!(game.make_move(single("KD")), Err(GameError::RoundEnded));
    }

    #[test]
    fn emptying_hand_ends_round() {
        let mut game = rigged(
            vec![cards(&["KH"]), cards(&["6H"])],
            single("KS"),
            1,
            0,
            None,
        );
        assert_eq!(game.make_move(single("KH")).unwrap(), GameState::RoundEnded);
        assert_eq!(game.outcome().unwrap().reason, RoundEndReason::HandEmptied);
        assert_eq!(game.pass(), Err(GameError::RoundEnded));
    }

    #[test]
    fn last_card_six_must_still_be_covered() {
        let mut game = rigged(
            vec![cards(&["6S"]), cards(&["7H"])],
            single("KS"),
            1,
            0,
            None,
        );
        assert_eq!(game.make_move(single("6S")).unwrap(), GameState::PlayerTurnStarted);
        assert!(game.players()[0].hand().is_empty());
        assert_eq!(game.current_player_index(), 0);
        assert!(game.pass().is_ok());
        assert_eq!(game.players()[0].hand().len(), 1);
    }

    #[test]
    fn pass_requires_having_nothing_to_play() {
        let mut game = rigged(
            vec![cards(&["KH"]), cards(&["6H"])],
            single("KS"),
            1,
            0,
            None,
        );
        assert_eq!(game.pass(), Err(GameError::PassNotAllowed(0)));

        let mut dealer_turn = new_game(2);
        assert_eq!(dealer_turn.pass(), Err(GameError::PassNotAllowed(0)));
    }

    #[test]
    fn pass_draws_and_hands_over_turn() {
        let mut game = rigged(
            vec![cards(&["9D"]), cards(&["6H"])],
            single("KS"),
            1,
            0,
            None,
        );
        let legal_before = game.legal_cards().clone();
        assert_eq!(game.pass(), Ok(PassOutcome::TurnPassed(card("AH"))));
        assert_eq!(game.current_player_index(), 1);
        assert_eq!(game.players()[0].hand().len(), 2);
        assert_eq!(game.legal_cards(), &legal_before);
    }

    #[test]
    fn pass_keeps_turn_when_drawn_card_is_playable() {
        let mut game = rigged(
            vec![cards(&["9D"]), cards(&["6H"])],
            single("KS"),
            1,
            0,
            Some(cards(&["KC"])),
        );
        assert_eq!(game.pass(), Ok(PassOutcome::Playable(card("KC"))));
        assert_eq!(game.current_player_index(), 0);
        assert_eq!(game.points_ratio(), 2);
        game.make_move(single("KC")).unwrap();
    }

    #[test]
    fn own_six_forces_another_draw() {
        let mut game = rigged(
            vec![cards(&["6S", "9D"]), cards(&["7H"])],
            single("KS"),
            1,
            0,
            None,
        );
        game.make_move(single("6S")).unwrap();
        assert_eq!(game.pass(), Ok(PassOutcome::MustDrawAgain(card("AH"))));
        assert_eq!(game.current_player_index(), 0);
    }

    #[test]
    fn exhausted_deck_ends_round() {
        let excluded = cards(&["7S", "7H", "9D", "7C"]);
        let rest: Vec<Card> = Card::ALL
            .iter()
            .copied()
            .filter(|c| !excluded.contains(c))
            .collect();
        let mut game = rigged(
            vec![cards(&["7H", "9D"]), rest],
            single("7S"),
            1,
            0,
            Some(cards(&["7C"])),
        );

        assert_eq!(game.make_move(single("7H")).unwrap(), GameState::RoundEnded);
        let outcome = game.outcome().unwrap();
        assert_eq!(outcome.reason, RoundEndReason::DeckExhausted);
        assert_eq!(outcome.points_ratio, 1);
        assert!(game.drawing_stack().is_empty());
        assert!(game.players()[1].hand().contains(card("7C")));
    }

    #[test]
    fn next_round_moves_the_deal() {
        let mut game = rigged(
            vec![cards(&["KH"]), cards(&["6H"])],
            single("KS"),
            1,
            0,
            None,
        );
        assert_eq!(game.start_next_round(), Err(GameError::RoundInProgress));
        game.make_move(single("KH")).unwrap();

        game.start_next_round().unwrap();
        assert_eq!(game.dealer_index(), 1);
        assert_eq!(game.current_player_index(), 1);
        assert_eq!(game.state(), GameState::DealerFirstMove);
        assert_eq!(game.points_ratio(), 1);
        assert!(game.history().is_empty());
        assert!(game.outcome().is_none());
        assert!(game.active_stack().is_empty());
        assert_eq!(game.drawing_stack().len(), 26);
        let required = game.required_first_card().unwrap();
        assert!(game.players()[1].hand().contains(required));
        for player in game.players() {
            assert_eq!(player.hand().len(), 5);
        }
    }

    #[test]
    fn internal_failure_poisons_the_game() {
        let mut game = rigged(
            vec![cards(&["9S", "9D"]), cards(&["6H"])],
            single("KS"),
            1,
            0,
            None,
        );
        game.players[1].append_card(card("KS")).unwrap();

        let err = game.make_move(single("9S")).unwrap_err();
        assert!(err.is_internal());
        assert!(game.is_poisoned());
        assert_eq!(game.make_move(single("9D")), Err(GameError::Poisoned));
        assert_eq!(game.pass(), Err(GameError::Poisoned));
    }

    #[test]
    fn display_summarizes_table() {
        let game = new_game(3);
        assert_eq!(
            game.to_string(),
            "3 players, dealer 0, current 0, dealer first move, points ratio 1, drawing 21, active 0"
        );
    }
}
