//! Contains various FEN (Forsyth-Edwards Notation) functions and constants.
//!
//! A FEN string is a way of describing the particular state of a chess game,
//! e.g. `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1`.
//!
//! Parsing is permissive about whitespace and trailing rank emptiness; any
//! other deviation raises a [`FenBuildError`]. A parsed position is
//! validated before use: king counts, pawn ranks, piece counts, the side
//! not to move being in check, and the en-passant configuration.
//!
//! Emission is canonical: castling letters in `KQkq` order, and the
//! en-passant square only written when a legal en-passant capture actually
//! exists.
//!
//! [`FenBuildError`]: enum.FenBuildError.html

use crate::core::masks::*;
use crate::core::sq::SQ;
use crate::core::{Piece, PieceKind, Player, ALL_PLAYERS};

use thiserror::Error;
use tracing::debug;

use super::Board;

/// The fen string for the start position.
pub const OPENING_POS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

bitflags! {
    /// The castling field of a FEN string. Only the textual interface's
    /// currency: inside the board, castling rights live in the piece tags.
    pub struct Castling: u8 {
        const WHITE_K = 0b0001;
        const WHITE_Q = 0b0010;
        const BLACK_K = 0b0100;
        const BLACK_Q = 0b1000;
    }
}

impl Castling {
    /// Renders the field in canonical `KQkq` order.
    pub fn pretty_string(self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        let mut s = String::with_capacity(4);
        if self.contains(Castling::WHITE_K) {
            s.push('K');
        }
        if self.contains(Castling::WHITE_Q) {
            s.push('Q');
        }
        if self.contains(Castling::BLACK_K) {
            s.push('k');
        }
        if self.contains(Castling::BLACK_Q) {
            s.push('q');
        }
        s
    }
}

/// Represents possible errors encountered while building a `Board` from a
/// FEN string.
#[derive(Error, Debug)]
pub enum FenBuildError {
    #[error("invalid EPD: {sections} sections, expected at least 4")]
    NotEnoughSections { sections: usize },
    #[error("invalid EPD placement: unrecognized piece {piece:?}")]
    UnrecognizedPiece { piece: char },
    #[error("invalid EPD placement: more than eight ranks or files")]
    PlacementOverflow,
    #[error("invalid EPD turn: {turn}, expected 'w' or 'b'")]
    UnrecognizedTurn { turn: String },
    #[error("invalid EPD en-passant square: {ep}")]
    EPSquareUnreadable { ep: String },
    #[error("invalid EPD en-passant square: {ep} is impossible here")]
    EPSquareInvalid { ep: String },
    #[error("illegal position: every en-passant capture of {ep} would expose the king")]
    EPSquareExposesKing { ep: String },
    #[error("invalid EPD move counters")]
    UnreadableMoves(#[from] std::num::ParseIntError),
    #[error("illegal position: {player} has {num} kings")]
    WrongKingCount { player: Player, num: u8 },
    #[error("illegal position: pawn on a back rank")]
    PawnOnBackRank,
    #[error("illegal position: {player} has {num} pawns")]
    TooManyPawns { player: Player, num: u8 },
    #[error("illegal position: {player} has more promoted pieces than missing pawns")]
    TooManyPromotions { player: Player },
    #[error("illegal position: the side not to move is in check")]
    WrongSideInCheck,
}

impl Board {
    /// Constructs a board from a FEN string.
    ///
    /// # Examples
    ///
    /// ```
    /// use rampart::Board;
    ///
    /// let board = Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
    /// assert_eq!(board.fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    /// ```
    pub fn from_fen(fen: &str) -> Result<Board, FenBuildError> {
        let sections: Vec<&str> = fen.split_whitespace().collect();
        if sections.len() < 4 {
            return Err(FenBuildError::NotEnoughSections {
                sections: sections.len(),
            });
        }

        let mut board = Board::blank();

        // Placement, ranks 8 down to 1. A short rank or a sloppy trailing
        // '/' is tolerated; running over the board is not.
        let mut rank: i8 = 7;
        let mut file: i8 = 0;
        for ch in sections[0].chars() {
            match ch {
                '/' => {
                    rank -= 1;
                    file = 0;
                    if rank < 0 {
                        return Err(FenBuildError::PlacementOverflow);
                    }
                }
                '1'..='8' => {
                    file += ch as i8 - b'0' as i8;
                    if file > 8 {
                        return Err(FenBuildError::PlacementOverflow);
                    }
                }
                _ => {
                    if file > 7 {
                        return Err(FenBuildError::PlacementOverflow);
                    }
                    let sq = SQ((file * 8 + rank) as u8);
                    let piece = piece_from_char(ch, sq)
                        .ok_or(FenBuildError::UnrecognizedPiece { piece: ch })?;
                    board.cells[sq.0 as usize].piece = piece;
                    file += 1;
                }
            }
        }

        // Side to move.
        let turn = match sections[1] {
            "w" | "W" => Player::White,
            "b" | "B" => Player::Black,
            other => {
                return Err(FenBuildError::UnrecognizedTurn {
                    turn: other.to_string(),
                })
            }
        };

        board.count_checks(turn)?;

        // Castling: a letter is honored only when the implied king and
        // rook actually stand at home; the tags then fold the right in.
        for ch in sections[2].chars() {
            let (player, corner) = match ch {
                'K' => (Player::White, Player::White.rook_home_kingside()),
                'Q' => (Player::White, Player::White.rook_home_queenside()),
                'k' => (Player::Black, Player::Black.rook_home_kingside()),
                'q' => (Player::Black, Player::Black.rook_home_queenside()),
                '-' => continue,
                _ => continue,
            };
            let home = player.king_home();
            let king_ok = board.cells[home.0 as usize].piece.is_king()
                && board.cells[home.0 as usize].piece.player_lossy() == player;
            let rook_ok = board.cells[corner.0 as usize].piece
                == Piece::make(player, PieceKind::Rook)
                || board.cells[corner.0 as usize].piece
                    == Piece::make(player, PieceKind::RookCastle);
            if king_ok && rook_ok {
                board.cells[home.0 as usize].piece = Piece::make(player, PieceKind::KingCastle);
                board.cells[corner.0 as usize].piece =
                    Piece::make(player, PieceKind::RookCastle);
            } else {
                debug!(letter = %ch, "ignoring castling letter without matching pieces");
            }
        }

        board.rebuild(turn);

        // The side that is not on move may not be in check.
        {
            let f = board.frame();
            if f.active.attacks_on(f.passive.king_sq()) != 0 {
                return Err(FenBuildError::WrongSideInCheck);
            }
        }

        // En-passant: correct rank for the mover and a coherent double
        // push behind it, stored lazily.
        if sections[3] != "-" {
            let ep = parse_square(sections[3]).ok_or_else(|| FenBuildError::EPSquareUnreadable {
                ep: sections[3].to_string(),
            })?;
            board.accept_ep(ep, turn, sections[3])?;
        }

        // Optional counters.
        if sections.len() > 4 {
            board.frame_mut().halfmove_clock = sections[4].parse::<u8>()?;
        }
        if sections.len() > 5 {
            let fullmove = sections[5].parse::<u16>()?.max(1);
            board.base_halfmoves = (fullmove - 1) * 2 + (turn == Player::Black) as u16;
        } else {
            board.base_halfmoves = (turn == Player::Black) as u16;
        }

        Ok(board)
    }

    /// King / pawn / promotion census over the parsed cells.
    fn count_checks(&self, _turn: Player) -> Result<(), FenBuildError> {
        for &player in ALL_PLAYERS.iter() {
            let mut kings = 0u8;
            let mut pawns = 0u8;
            let mut knights = 0i32;
            let mut bishops = 0i32;
            let mut rooks = 0i32;
            let mut queens = 0i32;
            for s in 0..SQ_CNT {
                let piece = self.cells[s].piece;
                if piece.is_empty() || piece.player_lossy() != player {
                    continue;
                }
                if piece.is_pawn() {
                    let rank = SQ(s as u8).rank_idx_of_sq();
                    if rank == 0 || rank == 7 {
                        return Err(FenBuildError::PawnOnBackRank);
                    }
                    pawns += 1;
                } else if piece.is_king() {
                    kings += 1;
                } else if piece.is_knight() {
                    knights += 1;
                } else if piece.is_bishop() {
                    bishops += 1;
                } else if piece.is_rook() {
                    rooks += 1;
                } else {
                    queens += 1;
                }
            }
            if kings != 1 {
                return Err(FenBuildError::WrongKingCount { player, num: kings });
            }
            if pawns > 8 {
                return Err(FenBuildError::TooManyPawns { player, num: pawns });
            }
            let extras = (knights - 2).max(0)
                + (bishops - 2).max(0)
                + (rooks - 2).max(0)
                + (queens - 1).max(0);
            if pawns as i32 + extras > 8 {
                return Err(FenBuildError::TooManyPromotions { player });
            }
        }
        Ok(())
    }

    /// Validates and stores a parsed en-passant square.
    fn accept_ep(&mut self, ep: SQ, turn: Player, text: &str) -> Result<(), FenBuildError> {
        let err = || FenBuildError::EPSquareInvalid {
            ep: text.to_string(),
        };
        let (want_rank, origin, victim) = match turn {
            Player::White => (5u8, ep.offset(1), ep.offset(-1)),
            Player::Black => (2u8, ep.offset(-1), ep.offset(1)),
        };
        if ep.rank_idx_of_sq() != want_rank {
            return Err(err());
        }
        if self.cells[ep.0 as usize].piece.is_occupied()
            || self.cells[origin.0 as usize].piece.is_occupied()
        {
            return Err(err());
        }
        let vp = self.cells[victim.0 as usize].piece;
        if !vp.is_pawn() || vp.player_lossy() != turn.other_player() {
            return Err(err());
        }

        // A capture that would uncover the mover's king cannot arise from
        // play. When capturers exist and every one is exposed this way
        // (horizontally through the two vacated squares, or through the
        // removed victim), the flag is impossible.
        let mut capturers = 0u8;
        let mut exposed = 0u8;
        for &delta in [8i8, -8].iter() {
            let from = victim.offset(delta);
            if !from.is_okay() {
                continue;
            }
            let p = self.cells[from.0 as usize].piece;
            if p.is_empty() || !p.is_pawn() || p.player_lossy() != turn {
                continue;
            }
            capturers += 1;
            if self.ep_exposes_king(from, ep, victim) {
                exposed += 1;
            }
        }
        if capturers > 0 && capturers == exposed {
            return Err(FenBuildError::EPSquareExposesKing {
                ep: text.to_string(),
            });
        }

        let f = self.frame_mut();
        f.ep_square = ep;
        let stamp = f.node_counter;
        f.ep_stamp = stamp;
        Ok(())
    }

    /// Creates a FEN string of the given board.
    ///
    /// # Examples
    ///
    /// ```
    /// use rampart::Board;
    ///
    /// let board = Board::start_pos();
    /// assert_eq!(board.fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    /// ```
    pub fn fen(&self) -> String {
        let mut s = String::with_capacity(90);
        for rank in (0..8u8).rev() {
            let mut blanks = 0;
            for file in 0..8u8 {
                let piece = self.cells[(file * 8 + rank) as usize].piece;
                if piece.is_empty() {
                    blanks += 1;
                } else {
                    if blanks != 0 {
                        s.push(std::char::from_digit(blanks, 10).unwrap());
                        blanks = 0;
                    }
                    s.push(piece.character_lossy());
                }
            }
            if blanks != 0 {
                s.push(std::char::from_digit(blanks, 10).unwrap());
            }
            if rank != 0 {
                s.push('/');
            }
        }

        s.push(' ');
        s.push(match self.turn() {
            Player::White => 'w',
            Player::Black => 'b',
        });
        s.push(' ');
        s.push_str(&self.castling_field().pretty_string());
        s.push(' ');

        // The en-passant square is only canonical when some legal
        // en-passant capture exists right now.
        match self.ep_square() {
            Some(ep) if self.legal_ep_exists() => {
                s.push(FILE_DISPLAYS[ep.file_idx_of_sq() as usize]);
                s.push(RANK_DISPLAYS[ep.rank_idx_of_sq() as usize]);
            }
            _ => s.push('-'),
        }

        let total = self.base_halfmoves as usize + self.ply();
        s.push(' ');
        s.push_str(&format!("{}", self.rule_50()));
        s.push(' ');
        s.push_str(&format!("{}", total / 2 + 1));
        s
    }

    /// The castling field implied by the piece tags.
    pub fn castling_field(&self) -> Castling {
        let mut c = Castling::empty();
        let pairs = [
            (Castling::WHITE_K, Player::White, Player::White.rook_home_kingside()),
            (Castling::WHITE_Q, Player::White, Player::White.rook_home_queenside()),
            (Castling::BLACK_K, Player::Black, Player::Black.rook_home_kingside()),
            (Castling::BLACK_Q, Player::Black, Player::Black.rook_home_queenside()),
        ];
        for &(flag, player, corner) in pairs.iter() {
            if self.cells[corner.0 as usize].piece == Piece::make(player, PieceKind::RookCastle) {
                debug_assert_eq!(
                    self.cells[player.king_home().0 as usize].piece,
                    Piece::make(player, PieceKind::KingCastle)
                );
                c |= flag;
            }
        }
        c
    }
}

fn parse_square(text: &str) -> Option<SQ> {
    let bytes = text.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    if !(b'a'..=b'h').contains(&bytes[0]) || !(b'1'..=b'8').contains(&bytes[1]) {
        return None;
    }
    Some(SQ((bytes[0] - b'a') * 8 + (bytes[1] - b'1')))
}

/// The piece tag of a FEN character on a square, start-rank and
/// pre-promotion pawn variants and bishop square colors included.
fn piece_from_char(ch: char, sq: SQ) -> Option<Piece> {
    let player = if ch.is_ascii_uppercase() {
        Player::White
    } else {
        Player::Black
    };
    let rank = sq.rank_idx_of_sq();
    let kind = match ch.to_ascii_uppercase() {
        'K' => PieceKind::King,
        'Q' => PieceKind::Queen,
        'R' => PieceKind::Rook,
        'N' => PieceKind::Knight,
        'B' => {
            if sq.on_light_square() {
                PieceKind::BishopLight
            } else {
                PieceKind::BishopDark
            }
        }
        'P' => {
            if rank == player.pawn_start_rank_idx() {
                PieceKind::PawnStart
            } else if rank == player.seventh_rank_idx() {
                PieceKind::PawnPromo
            } else {
                PieceKind::Pawn
            }
        }
        _ => return None,
    };
    Some(Piece::make(player, kind))
}

#[doc(hidden)]
pub static STANDARD_FENS_MIDDLE_POS: [&str; 12] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 10",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 11",
    "4rrk1/pp1n3p/3q2pQ/2p1pb2/2PP4/2P3N1/P2B2PP/4RRK1 b - - 7 19",
    "r3r1k1/2p2ppp/p1p1bn2/8/1q2P3/2NPQN2/PPP3PP/R4RK1 b - - 2 15",
    "r1bbk1nr/pp3p1p/2n5/1N4p1/2Np1B2/8/PPP2PPP/2KR1B1R w kq - 0 13",
    "r1bq1rk1/ppp1nppp/4n3/3p3Q/3P4/1BP1B3/PP1N2PP/R4RK1 w - - 1 16",
    "4r1k1/r1q2ppp/ppp2n2/4P3/5Rb1/1N1BQ3/PPP3PP/R5K1 w - - 1 17",
    "2rqkb1r/ppp2p2/2npb1p1/1N1Nn2p/2P1PP2/8/PP2B1PP/R1BQK2R b KQ - 0 11",
    "3q2k1/pb3p1p/4pbp1/2r5/PpN2N2/1P2P2P/5PP1/Q2R2K1 b - - 4 26",
    "6k1/6p1/6Pp/ppp5/3pn2P/1P3K2/1PP2P2/3N4 b - - 0 1",
    "8/2p5/8/2kPKp1p/2p4P/2P5/3P4/8 w - - 0 1",
];

#[doc(hidden)]
pub static STANDARD_FENS_ENDGAME_POS: [&str; 6] = [
    "8/8/8/8/5kp1/P7/8/1K1N4 w - - 0 1",
    "8/8/8/5N2/8/p7/8/2NK3k w - - 0 1",
    "8/3k4/8/8/8/4B3/4KB2/2B5 w - - 0 1",
    "8/8/1P6/5pr1/8/4R3/7k/2K5 w - - 0 1",
    "8/2p4P/8/kr6/6R1/8/8/1K6 w - - 0 1",
    "8/8/3P3k/8/1p6/8/1P6/1K3n2 b - - 0 1",
];

#[doc(hidden)]
pub static STANDARD_FEN_MATE_STALEMATE: [&str; 3] = [
    "6k1/3b3r/1p1p4/p1n2p2/1PPNpP1q/P3Q1p1/1R1RB1P1/5K2 b - - 0 1",
    "8/8/8/8/8/6k1/6p1/6K1 w - - 0 1",
    "7k/7P/6K1/8/3B4/8/8/8 b - - 0 1",
];

lazy_static! {
    /// Every standard test FEN, concatenated.
    pub static ref ALL_FENS: Vec<&'static str> = {
        let mut vec = Vec::new();
        vec.push(OPENING_POS_FEN);
        for fen in &STANDARD_FENS_MIDDLE_POS { vec.push(*fen); }
        for fen in &STANDARD_FENS_ENDGAME_POS { vec.push(*fen); }
        for fen in &STANDARD_FEN_MATE_STALEMATE { vec.push(*fen); }
        vec
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fen_round_trip_all_standard() {
        for fen in ALL_FENS.iter() {
            let board = Board::from_fen(fen).unwrap();
            assert_eq!(&board.fen(), fen, "round trip failed");
            board.assert_consistent();
        }
    }

    #[test]
    fn fen_missing_counters_tolerated() {
        let board = Board::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -").unwrap();
        assert_eq!(board.fen(), "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
    }

    #[test]
    fn fen_extra_pawns_rejected() {
        assert!(Board::from_fen("rnbqkbnr/pppppppp/8/8/8/7P/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_err());
    }

    #[test]
    fn fen_two_kings_rejected() {
        assert!(Board::from_fen("rnbqkbnr/pppppppp/8/8/8/4K3/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_err());
    }

    #[test]
    fn fen_pawn_on_back_rank_rejected() {
        assert!(Board::from_fen("P3k3/8/8/8/8/8/8/4K3 w - - 0 1").is_err());
    }

    #[test]
    fn fen_wrong_side_in_check_rejected() {
        // White to move while the black king hangs in check.
        assert!(Board::from_fen("4k3/8/8/8/4R3/8/8/4K3 w - - 0 1").is_err());
    }

    #[test]
    fn fen_castling_letter_without_rook_ignored() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w KQ - 0 1").unwrap();
        assert_eq!(board.castling_field(), Castling::WHITE_K);
        assert_eq!(board.fen(), "4k3/8/8/8/8/8/8/4K2R w K - 0 1");
    }

    #[test]
    fn fen_ep_square_must_be_coherent() {
        // d6 without a black pawn on d5 is impossible.
        assert!(Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - d6 0 1").is_err());
        // The real thing parses, and emits (a legal capture exists).
        let board = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        assert_eq!(board.ep_square(), Some(SQ::D6));
        assert_eq!(board.fen(), "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
    }

    #[test]
    fn fen_ep_square_elided_without_capturer() {
        // No white pawn stands beside d5, so the square is not emitted.
        let board = Board::from_fen("4k3/8/8/3p4/8/8/8/4K3 w - d6 0 1").unwrap();
        assert_eq!(board.ep_square(), Some(SQ::D6));
        assert_eq!(board.fen(), "4k3/8/8/3p4/8/8/8/4K3 w - - 0 1");
    }

    #[test]
    fn fen_fullmove_counter_advances() {
        let mut board = Board::start_pos();
        let mv = board.parse_uci_move("e2e4").unwrap();
        board.make(mv);
        // No black pawn can take on e3, so the canonical form elides it.
        assert!(board.fen().ends_with("b KQkq - 0 1"), "{}", board.fen());
        let mv = board.parse_uci_move("g8f6").unwrap();
        board.make(mv);
        assert!(board.fen().ends_with("w KQkq - 1 2"), "{}", board.fen());
    }
}
