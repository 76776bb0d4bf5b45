extern crate rampart;

use rampart::board::fen;
use rampart::Board;

/// Plays the first legal move repeatedly and checks, at every node, that
/// the incrementally maintained keys equal a from-scratch rebuild through
/// the FEN round trip.
#[test]
fn incremental_keys_match_scratch() {
    for fen in fen::ALL_FENS.iter() {
        let mut board = Board::from_fen(fen).unwrap();
        for _ in 0..12 {
            let moves = board.generate_moves();
            if moves.is_empty() {
                break;
            }
            board.make(moves[moves.len() / 2]);
            board.assert_consistent();

            let rebuilt = Board::from_fen(&board.fen()).unwrap();
            assert_eq!(board.pawn_king_hash(), rebuilt.pawn_king_hash());
            assert_eq!(board.material_key(), rebuilt.material_key());
            assert_eq!(board.hash(), rebuilt.hash());
        }
    }
}

#[test]
fn side_to_move_flips_hash() {
    let a = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let b = Board::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap();
    assert_eq!(a.hash(), !b.hash());
}

#[test]
fn transpositions_agree() {
    // 1. Nf3 Nf6 2. Nc3 against 1. Nc3 Nf6 2. Nf3 reach the same position
    // with the same hash.
    let mut a = Board::start_pos();
    for m in ["g1f3", "g8f6", "b1c3"].iter() {
        let mv = a.parse_uci_move(m).unwrap();
        a.make(mv);
    }
    let mut b = Board::start_pos();
    for m in ["b1c3", "g8f6", "g1f3"].iter() {
        let mv = b.parse_uci_move(m).unwrap();
        b.make(mv);
    }
    assert_eq!(a.hash(), b.hash());
    assert_eq!(a.pawn_king_hash(), b.pawn_king_hash());
    assert_eq!(a.material_key(), b.material_key());
}

#[test]
fn castling_rights_split_hashes() {
    // Identical placements, different castling rights, different hashes.
    let all = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let none = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1").unwrap();
    let some = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1").unwrap();
    assert_ne!(all.hash(), none.hash());
    assert_ne!(all.hash(), some.hash());
    assert_ne!(none.hash(), some.hash());
    // Castling rights involve only kings and rook corners, so the
    // pawn/king hash splits too.
    assert_ne!(all.pawn_king_hash(), none.pawn_king_hash());
    // Material does not care.
    assert_eq!(all.material_key(), none.material_key());
}

#[test]
fn material_key_tracks_captures() {
    let mut board = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
    let before = board.material_key();
    let mv = board.parse_uci_move("e4d5").unwrap();
    board.make(mv);
    assert_ne!(board.material_key(), before);
    board.undo();
    assert_eq!(board.material_key(), before);

    // Equal multisets give equal keys regardless of arrangement.
    let other = Board::from_fen("4k3/8/8/8/8/8/3P4/4K3 w - - 0 1").unwrap();
    let here = Board::from_fen("4k3/8/8/8/8/8/6P1/4K3 w - - 0 1").unwrap();
    assert_eq!(other.material_key(), here.material_key());
}

#[test]
fn ep_square_not_hashed() {
    // The board hash is lazy: it excludes the en-passant square.
    let with_ep = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
    let without = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 1").unwrap();
    assert_eq!(with_ep.hash(), without.hash());
    assert_ne!(with_ep.ep_square(), without.ep_square());
}

#[test]
fn promotion_updates_material() {
    let mut board = Board::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let before = board.material_key();
    let mv = board.parse_uci_move("a7a8q").unwrap();
    board.make(mv);
    board.assert_consistent();
    assert_ne!(board.material_key(), before);
    // The queen-for-pawn swap is visible to a rebuilt board.
    let rebuilt = Board::from_fen(&board.fen()).unwrap();
    assert_eq!(board.material_key(), rebuilt.material_key());
    board.undo();
    assert_eq!(board.material_key(), before);
}
