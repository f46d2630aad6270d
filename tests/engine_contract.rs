use arena::config::GameConfig;
use arena::game_wrapper::{GameKind, GameWrapper, MoveWrapper};
use arena::games::backgammon::{BackgammonState, BgColor, BgMove, Source, Target, CHECKERS_PER_SIDE};
use arena::games::chess::{ChessMove, ChessState};
use arena::games::dama::{DamaColor, DamaMove, DamaPiece, DamaState};
use arena::games::snakes::{SnakesMove, SnakesState};
use arena::games::tris::{TrisMove, TrisState};
use arena::games::uno::{Card, UnoColor, UnoMove, UnoState, DECK_SIZE};
use arena::{seeded_rng, GameState, MoveError, Outcome};

const MAX_PLIES: usize = 600;

/// Plays bots on every side, calling `check` on each snapshot. Returns the last one.
fn play_out(kind: GameKind, seed: u64, mut check: impl FnMut(&GameWrapper)) -> GameWrapper {
    let mut game = kind.new_game(&GameConfig::with_seed(seed));
    let mut rng = seeded_rng(Some(seed));
    check(&game);
    for _ in 0..MAX_PLIES {
        let Some(mv) = game.bot_move(&mut rng) else {
            break;
        };
        game = game.apply_move(&mv).expect("bot moves are legal");
        check(&game);
    }
    game
}

fn foreign_move(kind: GameKind) -> MoveWrapper {
    match kind {
        GameKind::Tris => MoveWrapper::Uno(UnoMove::Draw),
        _ => MoveWrapper::Tris(TrisMove(0)),
    }
}

#[test]
fn legal_moves_are_idempotent_and_belong_to_the_mover() {
    for kind in GameKind::ALL {
        play_out(kind, 3, |game| {
            let player = game.get_current_player();
            assert_eq!(game.legal_moves(player), game.legal_moves(player));
            let other = if game.get_num_players() == 2 && matches!(player, 1 | -1) { -player } else { 0 };
            assert!(game.legal_moves(other).is_empty());
            if game.is_terminal() {
                assert!(game.legal_moves(player).is_empty());
            }
        });
    }
}

/// A move of the right game that is not in the current legal list, when one exists.
fn off_list_move(game: &GameWrapper) -> Option<MoveWrapper> {
    let candidates: Vec<MoveWrapper> = match game {
        GameWrapper::Chess(chess) => (0..8)
            .flat_map(|row| (0..8).map(move |col| (row, col)))
            .find(|&(row, col)| chess.piece_at(row, col).is_none())
            .map(|from| MoveWrapper::Chess(ChessMove::new(from, (from.0, (from.1 + 1) % 8))))
            .into_iter()
            .collect(),
        GameWrapper::Dama(_) => vec![MoveWrapper::Dama(DamaMove::step((0, 0), (1, 1)))],
        GameWrapper::Tris(_) => (0..9).map(|cell| MoveWrapper::Tris(TrisMove(cell))).collect(),
        GameWrapper::Snakes(_) => vec![MoveWrapper::Snakes(SnakesMove::Roll)],
        GameWrapper::Backgammon(_) => vec![
            MoveWrapper::Backgammon(BgMove::Roll),
            MoveWrapper::Backgammon(BgMove::Step { from: Source::Bar, to: Target::Off, die: 0 }),
        ],
        GameWrapper::Uno(_) => vec![
            MoveWrapper::Uno(UnoMove::ChooseColor(UnoColor::Red)),
            MoveWrapper::Uno(UnoMove::Draw),
        ],
    };
    let legal = game.get_possible_moves();
    candidates.into_iter().find(|mv| !legal.contains(mv))
}

#[test]
fn rejected_moves_leave_the_state_untouched() {
    for kind in GameKind::ALL {
        let mut rejected = 0;
        play_out(kind, 9, |game| {
            let before = game.clone();
            let result = game.apply_move(&foreign_move(kind));
            assert_eq!(result, Err(MoveError::MismatchedGame));
            assert_eq!(*game, before);

            if let Some(mv) = off_list_move(game) {
                assert!(game.apply_move(&mv).is_err(), "{} accepted {}", kind, mv);
                assert_eq!(*game, before);
                rejected += 1;
            }
        });
        assert!(rejected > 0, "no off-list move was tried for {}", kind);
    }
}

#[test]
fn finished_games_accept_no_moves() {
    for kind in [GameKind::Tris, GameKind::Snakes, GameKind::Uno, GameKind::Backgammon] {
        for seed in 0..3 {
            let mut seen_outcome: Option<Outcome> = None;
            let last = play_out(kind, seed, |game| {
                if let Some(outcome) = seen_outcome {
                    assert_eq!(game.get_winner(), Some(outcome), "winner changed after the game ended");
                }
                seen_outcome = game.get_winner();
            });
            if last.is_terminal() {
                assert!(last.get_possible_moves().is_empty());
                let mut rng = seeded_rng(Some(seed));
                assert_eq!(last.bot_move(&mut rng), None);
            }
        }
    }
}

#[test]
fn uno_cards_are_conserved() {
    for seed in 0..4 {
        play_out(GameKind::Uno, seed, |game| {
            if let GameWrapper::Uno(uno) = game {
                assert_eq!(uno.total_cards(), DECK_SIZE);
            }
        });
    }
}

#[test]
fn backgammon_checkers_are_conserved() {
    play_out(GameKind::Backgammon, 21, |game| {
        if let GameWrapper::Backgammon(bg) = game {
            assert_eq!(bg.checker_count(BgColor::White), CHECKERS_PER_SIDE);
            assert_eq!(bg.checker_count(BgColor::Black), CHECKERS_PER_SIDE);
        }
    });
}

#[test]
fn tris_line_and_full_board() {
    let line = TrisState::from_squares([1, 1, 1, 0, 0, 0, 0, 0, 0], -1);
    assert_eq!(line.get_winner(), Some(Outcome::Win(1)));
    let full = TrisState::from_squares([1, -1, 1, 1, -1, -1, -1, 1, 1], -1);
    assert_eq!(full.get_winner(), Some(Outcome::Draw));
}

#[test]
fn chess_pawn_double_step_only_from_start() {
    let game = ChessState::new();
    let e2e4: ChessMove = "e2e4".parse().unwrap();
    assert!(game.legal_moves(1).contains(&e2e4));

    let game = game.apply_move(&"e2e3".parse().unwrap()).unwrap();
    let game = game.apply_move(&"a7a6".parse().unwrap()).unwrap();
    let before = game.clone();
    assert_eq!(game.apply_move(&"e3e5".parse().unwrap()), Err(MoveError::IllegalMove));
    assert_eq!(game, before);
}

#[test]
fn dama_capture_is_mandatory() {
    let game = DamaState::from_pieces(
        &[
            ((5, 2), DamaPiece::man(DamaColor::Red)),
            ((5, 6), DamaPiece::man(DamaColor::Red)),
            ((4, 3), DamaPiece::man(DamaColor::Black)),
        ],
        DamaColor::Red,
    );
    let moves = game.get_possible_moves();
    assert!(!moves.is_empty());
    assert!(moves.iter().all(DamaMove::is_capture));
    assert_eq!(
        game.apply_move(&DamaMove::step((5, 6), (4, 7))),
        Err(MoveError::MustCapture)
    );
}

#[test]
fn uno_draw_two_hits_the_next_player() {
    let game = UnoState::from_parts(
        vec![
            vec![Card::DrawTwo(UnoColor::Blue), Card::Number(UnoColor::Red, 2)],
            vec![Card::Number(UnoColor::Green, 3)],
            vec![Card::Number(UnoColor::Yellow, 5)],
        ],
        vec![Card::Wild; 6],
        Card::Number(UnoColor::Blue, 1),
        UnoColor::Blue,
        Some(4),
    );
    let next = game.apply_move(&UnoMove::Play(Card::DrawTwo(UnoColor::Blue))).unwrap();
    assert_eq!(next.hand(2).len(), 3);
    assert_eq!(next.get_current_player(), 3);
}

#[test]
fn backgammon_bar_first_and_doubles() {
    let mut game = BackgammonState::from_position(
        &[(0, BgColor::White, 14), (23, BgColor::Black, 15)],
        [1, 0],
        [0, 0],
        BgColor::White,
        Some(6),
    );
    game.apply_roll(2, 2);
    assert_eq!(game.dice(), &[2, 2, 2, 2]);
    assert_eq!(
        game.get_possible_moves(),
        vec![BgMove::Step { from: Source::Bar, to: Target::Point(1), die: 2 }]
    );
}

#[test]
fn snakes_redirect_is_a_single_hop() {
    let mut game = SnakesState::with_positions(vec![3, 1], Some(8));
    game.advance(6);
    assert_eq!(game.positions()[0], 21);
}
