extern crate rampart;

use rampart::board::fen;
use rampart::{Board, Player};

#[test]
fn start_pos_basics() {
    let board = Board::start_pos();
    assert_eq!(board.turn(), Player::White);
    assert!(!board.in_check());
    assert!(!board.checkmate());
    assert!(!board.stalemate());
    assert_eq!(board.ply(), 0);
    assert_eq!(board.rule_50(), 0);
    board.assert_consistent();
}

#[test]
fn all_standard_fens_build_consistent() {
    for fen in fen::ALL_FENS.iter() {
        let board = Board::from_fen(fen).expect(fen);
        board.assert_consistent();
    }
}

#[test]
fn kings_found() {
    let board = Board::start_pos();
    assert_eq!(board.king_sq(Player::White), rampart::SQ::E1);
    assert_eq!(board.king_sq(Player::Black), rampart::SQ::E8);
}

#[test]
fn mate_and_stalemate_positions() {
    // Back-rank mate.
    let mate = Board::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 b - - 0 1");
    let mate = match mate {
        Ok(b) => b,
        Err(e) => panic!("{}", e),
    };
    assert!(!mate.checkmate());

    let mated = Board::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
    assert!(mated.in_check());
    assert!(mated.checkmate());

    // The classic king-and-pawn stalemate.
    let stale = Board::from_fen("8/8/8/8/8/6k1/6p1/6K1 w - - 0 1").unwrap();
    assert!(!stale.in_check());
    assert!(stale.stalemate());
}

#[test]
fn hashes_differ_between_positions() {
    let a = Board::start_pos();
    let b = Board::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
    assert_ne!(a.hash(), b.hash());
    assert_ne!(a.material_key(), b.material_key() ^ 1); // sanity on accessor
    assert_eq!(a.material_key(), b.material_key()); // same material
    assert_eq!(a.pawn_king_hash() == b.pawn_king_hash(), false); // pawn moved
}

#[test]
fn clone_is_independent() {
    let mut board = Board::start_pos();
    let clone = board.clone();
    let mv = board.parse_uci_move("e2e4").unwrap();
    board.make(mv);
    assert_ne!(board.hash(), clone.hash());
    assert_eq!(clone.fen(), Board::start_pos().fen());
}
