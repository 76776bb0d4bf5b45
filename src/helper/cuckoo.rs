//! Cuckoo-hashed index of reversible moves, for upcoming-repetition
//! detection.
//!
//! For every non-pawn move between two squares reachable on an empty board,
//! the table stores the inverted Zobrist XOR the move applies to the
//! position hash (`!(Z[piece][a] ^ Z[piece][b])`; the inversion folds in the
//! per-ply hash flip). Each entry lives in one of two slots, indexed by bits
//! 32..43 and 48..59 of its key, placed by cuckoo displacement. Repetition
//! probing XORs the current hash against an earlier one and asks whether
//! any single reversible move produces that difference.

use crate::core::dirs::{KNIGHT_JUMP, KNIGHT_JUMP_CNT};
use crate::core::sq::SQ;
use crate::core::{Piece, PieceKind, Player, ALL_PLAYERS};

use super::geometry::GEOMETRY;
use super::zobrist::ZOBRIST;

/// Slots per side.
const CUCKOO_CNT: usize = 4096;

#[inline(always)]
fn slot_one(key: u64) -> usize {
    (key >> 32) as usize & 0xFFF
}

#[inline(always)]
fn slot_two(key: u64) -> usize {
    (key >> 48) as usize & 0xFFF
}

/// The per-side cuckoo tables.
pub struct Cuckoo {
    move_keys: Vec<[u64; CUCKOO_CNT]>,
    move_squares: Vec<[u16; CUCKOO_CNT]>,
}

impl Cuckoo {
    #[cold]
    pub fn new() -> Cuckoo {
        let mut c = Cuckoo {
            move_keys: vec![[0; CUCKOO_CNT]; 2],
            move_squares: vec![[0; CUCKOO_CNT]; 2],
        };
        for &player in ALL_PLAYERS.iter() {
            for &kind in [
                PieceKind::King,
                PieceKind::Queen,
                PieceKind::Rook,
                PieceKind::BishopLight,
                PieceKind::Knight,
            ]
            .iter()
            {
                let tag = Piece::make(player, kind);
                for a in 0..64u8 {
                    for b in (a + 1)..64 {
                        if reaches(tag, SQ(a), SQ(b)) {
                            c.insert(player, tag, SQ(a), SQ(b));
                        }
                    }
                }
            }
        }
        c
    }

    fn insert(&mut self, player: Player, tag: Piece, a: SQ, b: SQ) {
        let z = &*ZOBRIST;
        let mut key = !(z.piece_square(tag, a) ^ z.piece_square(tag, b));
        let mut sqs = ((a.0 as u16) << 6) | b.0 as u16;
        let side = player as usize;
        let mut i = slot_one(key);
        loop {
            std::mem::swap(&mut self.move_keys[side][i], &mut key);
            std::mem::swap(&mut self.move_squares[side][i], &mut sqs);
            if sqs == 0 {
                break;
            }
            // Push the displaced entry to its other slot.
            i = if i == slot_one(key) {
                slot_two(key)
            } else {
                slot_one(key)
            };
        }
    }

    /// Looks up a hash difference in the side's table, returning the move's
    /// square pair on a hit.
    #[inline]
    pub fn probe(&self, player: Player, diff: u64) -> Option<(SQ, SQ)> {
        let side = player as usize;
        for &i in [slot_one(diff), slot_two(diff)].iter() {
            if self.move_keys[side][i] == diff {
                let sqs = self.move_squares[side][i];
                return Some((SQ((sqs >> 6) as u8 & 0x3F), SQ(sqs as u8 & 0x3F)));
            }
        }
        None
    }
}

/// Whether `tag` reaches from `a` to `b` over an empty board.
fn reaches(tag: Piece, a: SQ, b: SQ) -> bool {
    let g = &*GEOMETRY;
    let rel = g.sq2sq(a, b);
    match tag.kind() {
        PieceKind::Knight => rel & crate::core::masks::KNIGHT_UNIT != 0,
        PieceKind::King | PieceKind::KingCastle => rel & crate::core::masks::KING_RING != 0,
        _ => rel & tag.slider_dirs() != 0,
    }
}

lazy_static! {
    /// Statically initialized cuckoo tables, created on first use.
    pub static ref CUCKOO: Cuckoo = Cuckoo::new();
}
