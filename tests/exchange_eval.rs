extern crate rampart;

use rampart::{Board, Move};

const GOOD: u16 = 0xF0;

fn high_byte(mv: Move) -> u16 {
    mv.score() >> 8
}

fn find(board: &Board, text: &str) -> Move {
    board
        .generate_moves()
        .iter()
        .copied()
        .find(|m| m.stringify() == text)
        .unwrap_or_else(|| panic!("move {} not generated", text))
}

#[test]
fn free_capture_scores_full_gain() {
    // An undefended pawn is a clean +1.
    let board = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
    let mv = find(&board, "e4d5");
    assert_eq!(high_byte(mv) & 0xF0, GOOD);
    assert_eq!(high_byte(mv) & 0x0F, 1);
}

#[test]
fn even_trade_scores_zero_gain() {
    // Pawn takes pawn, pawn recaptures: net zero, still a good move.
    let board = Board::from_fen("4k3/8/2p5/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
    let mv = find(&board, "e4d5");
    assert_eq!(high_byte(mv) & 0xF0, GOOD);
    assert_eq!(high_byte(mv) & 0x0F, 0);
}

#[test]
fn losing_capture_scores_below_neutral() {
    // Rook takes a pawn defended by a pawn: down four.
    let board = Board::from_fen("4k3/8/2p5/3p4/8/3R4/8/4K3 w - - 0 1").unwrap();
    let mv = find(&board, "d3d5");
    assert!(high_byte(mv) < 0x70, "score {:x}", high_byte(mv));
    assert_eq!(high_byte(mv), 0x70 - 4);
}

#[test]
fn queen_takes_defended_queen_is_even() {
    let board = Board::from_fen("3qk3/8/8/8/8/8/3Q4/4K3 w - - 0 1").unwrap();
    let mv = find(&board, "d2d8");
    assert_eq!(high_byte(mv) & 0xF0, GOOD);
    assert_eq!(high_byte(mv) & 0x0F, 0);
}

#[test]
fn guarded_recapture_square_wins_the_queen() {
    // With our rook behind the queen, the king may not legally recapture:
    // the queen grab nets a full queen. The royal packing models exactly
    // this.
    let board = Board::from_fen("3qk3/8/8/8/8/8/3Q4/3RK3 w - - 0 1").unwrap();
    let mv = find(&board, "d2d8");
    assert_eq!(high_byte(mv) & 0xF0, GOOD);
    assert_eq!(high_byte(mv) & 0x0F, 9, "{:x}", high_byte(mv));
}

#[test]
fn xray_support_counts() {
    // Rook takes rook; behind our rook stands a second rook, so the
    // defender's recapture is answered: a clean +5.
    let board = Board::from_fen("3rk3/8/8/8/8/8/3R4/3RK3 w - - 0 1").unwrap();
    let mv = find(&board, "d2d8");
    assert_eq!(high_byte(mv) & 0xF0, GOOD);
    // Rook for rook even if the king recaptures.
    assert_eq!(high_byte(mv) & 0x0F, 5, "score {:x}", high_byte(mv));
}

#[test]
fn quiet_move_to_safe_square_is_neutral() {
    let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
    let mv = find(&board, "a1a4");
    assert_eq!(high_byte(mv), 0x70);
}

#[test]
fn quiet_move_to_attacked_square_biased_down() {
    // a5 is covered by the b6 pawn.
    let board = Board::from_fen("4k3/8/1p6/8/8/8/8/R3K3 w - - 0 1").unwrap();
    let mv = find(&board, "a1a5");
    assert_eq!(high_byte(mv), 0x6F);
}

#[test]
fn promotions_always_carry_good_nibble() {
    let board = Board::from_fen("3n4/4P3/8/8/7k/8/8/4K3 w - - 0 1").unwrap();
    for mv in board.generate_moves().iter().filter(|m| m.is_promotion()) {
        assert_eq!(high_byte(*mv) & 0xF0, GOOD, "{}", mv);
    }
    // The capture-promotion to queen nets the knight plus the promotion.
    let q = find(&board, "e7d8q");
    assert!(high_byte(q) & 0x0F >= 11, "{:x}", high_byte(q));
}

#[test]
fn en_passant_scores_good() {
    let board = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
    let mv = find(&board, "e5d6");
    assert_eq!(high_byte(mv) & 0xF0, GOOD);
}

#[test]
fn pinned_defender_does_not_defend() {
    // The f6 knight "defends" d5 but is pinned to its king by the c3
    // bishop: the pawn grab is clean.
    let board = Board::from_fen("7k/8/5n2/3p4/4P3/2B5/8/4K3 w - - 0 1").unwrap();
    let mv = find(&board, "e4d5");
    assert_eq!(high_byte(mv) & 0xF0, GOOD, "score {:x}", high_byte(mv));
    assert_eq!(high_byte(mv) & 0x0F, 1);
}

#[test]
fn cache_api_is_available() {
    rampart::reset_exchange_cache();
    let board = Board::from_fen("4k3/8/2p5/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
    let _ = board.generate_moves();
    let misses = rampart::exchange_cache_misses();
    // Generating again recomputes nothing for the same inputs.
    let _ = board.generate_moves();
    assert!(rampart::exchange_cache_misses() >= misses);
}
