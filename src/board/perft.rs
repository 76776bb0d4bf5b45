//! perft, or Performance Test, Move Path Enumeration, tests the correctness
//! of move generation.
//!
//! Use these functions on a [`Board`] to check that the correct number of
//! leaf nodes is reached. At depth 1 the count equals the size of the
//! generated move list; at depth 0 it is 1 by convention.
//!
//! [`Board`]: ../struct.Board.html

use rayon::prelude::*;
use tracing::info;

use crate::core::move_list::MoveList;

use super::Board;

/// Holds all information about the number of nodes counted.
pub struct PerftNodes {
    /// Total number of nodes counted.
    pub nodes: u64,
    /// Number of capturing moves, including en-passant moves.
    pub captures: u64,
    /// Number of en-passant moves.
    pub en_passant: u64,
    /// Number of castles.
    pub castles: u64,
    /// Number of promotions.
    pub promotions: u64,
    /// Number of checking moves.
    pub checks: u64,
    /// Number of moves resulting in a checkmate.
    pub checkmates: u64,
}

impl Default for PerftNodes {
    fn default() -> Self {
        PerftNodes {
            nodes: 0,
            captures: 0,
            en_passant: 0,
            castles: 0,
            promotions: 0,
            checks: 0,
            checkmates: 0,
        }
    }
}

/// Returns the number of leaf nodes from generating moves to a certain
/// depth.
pub fn perft(board: &Board, depth: u16) -> u64 {
    if depth == 0 {
        1
    } else {
        let mut pos = board.clone();
        let count = inner_perft(&mut pos, depth);
        info!(depth, count, "perft finished");
        count
    }
}

/// Returns the count of all move types for the leaf nodes up to a certain
/// depth.
pub fn perft_all(board: &Board, depth: u16) -> PerftNodes {
    let mut pos = board.clone();
    let mut perft = PerftNodes::default();
    inner_perft_all(&mut pos, depth, &mut perft);
    perft
}

/// Like [`perft`], splitting the root moves across a rayon thread pool.
/// Each task walks its own clone of the board.
///
/// [`perft`]: fn.perft.html
pub fn perft_parallel(board: &Board, depth: u16) -> u64 {
    if depth == 0 {
        return 1;
    }
    if depth == 1 {
        return board.generate_moves().len() as u64;
    }
    let moves: Vec<_> = board.generate_moves().vec();
    let count = moves
        .par_iter()
        .map(|mv| {
            let mut pos = board.clone();
            pos.make(*mv);
            inner_perft(&mut pos, depth - 1)
        })
        .sum();
    info!(depth, count, "parallel perft finished");
    count
}

fn inner_perft(board: &mut Board, depth: u16) -> u64 {
    let moves: MoveList = board.generate_moves();

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut count: u64 = 0;
    for mv in moves {
        board.make(mv);
        count += inner_perft(board, depth - 1);
        board.undo();
    }
    count
}

fn inner_perft_all(board: &mut Board, depth: u16, perft: &mut PerftNodes) {
    let moves: MoveList = board.generate_moves();

    if depth == 0 {
        perft.nodes += 1;
        if board.in_check() {
            perft.checks += 1;
            if moves.is_empty() {
                perft.checkmates += 1;
            }
        }
    } else {
        for mv in moves {
            if depth == 1 {
                if mv.is_en_passant() {
                    perft.en_passant += 1;
                    perft.captures += 1;
                } else if board.piece_at(mv.to()).is_occupied() {
                    perft.captures += 1;
                }
                if mv.is_castle() {
                    perft.castles += 1;
                }
                if mv.is_promotion() {
                    perft.promotions += 1;
                }
            }
            board.make(mv);
            inner_perft_all(board, depth - 1, perft);
            board.undo();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_pos_perft() {
        let b = Board::start_pos();
        assert_eq!(1, perft(&b, 0));
        assert_eq!(20, perft(&b, 1));
        assert_eq!(400, perft(&b, 2));
        assert_eq!(8902, perft(&b, 3));
        assert_eq!(197_281, perft(&b, 4));
    }

    #[test]
    fn start_pos_perft_all() {
        let b = Board::start_pos();
        let p = perft_all(&b, 3);
        assert_eq!(p.nodes, 8902);
        assert_eq!(p.captures, 34);
        assert_eq!(p.en_passant, 0);
        assert_eq!(p.checks, 12);
    }

    #[test]
    fn perft_kiwipete() {
        let b =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        assert_eq!(48, perft(&b, 1));
        assert_eq!(2039, perft(&b, 2));
        assert_eq!(97862, perft(&b, 3));
    }

    #[test]
    fn perft_kiwipete_deep() {
        let b =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        assert_eq!(4_085_603, perft_parallel(&b, 4));
    }

    #[test]
    fn perft_board_3() {
        let b = Board::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
        assert_eq!(14, perft(&b, 1));
        assert_eq!(191, perft(&b, 2));
        assert_eq!(2812, perft(&b, 3));
        assert_eq!(43_238, perft(&b, 4));
        assert_eq!(674_624, perft(&b, 5));
    }

    #[test]
    fn perft_board_4() {
        let b = Board::from_fen("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1")
            .unwrap();
        assert_eq!(6, perft(&b, 1));
        assert_eq!(264, perft(&b, 2));
        assert_eq!(9467, perft(&b, 3));
        assert_eq!(422_333, perft(&b, 4));
    }

    #[test]
    fn perft_board_5() {
        let b = Board::from_fen("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8").unwrap();
        assert_eq!(44, perft(&b, 1));
        assert_eq!(1_486, perft(&b, 2));
        assert_eq!(62_379, perft(&b, 3));
        assert_eq!(2_103_487, perft(&b, 4));
    }

    #[test]
    fn perft_board_6() {
        let b = Board::from_fen(
            "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        )
        .unwrap();
        assert_eq!(46, perft(&b, 1));
        assert_eq!(2_079, perft(&b, 2));
        assert_eq!(89_890, perft(&b, 3));
    }

    #[test]
    fn parallel_perft_matches_serial() {
        let b = Board::start_pos();
        assert_eq!(perft(&b, 4), perft_parallel(&b, 4));
    }
}
