//! Default functions for accessing the statically computed tables.
//!
//! These forward to the lazily initialized aggregates in the sibling
//! modules. Call [`init_statics`] once at startup to force initialization
//! eagerly; otherwise the first access pays it.
//!
//! [`init_statics`]: fn.init_statics.html

use std::sync::Once;

use super::cuckoo::CUCKOO;
use super::geometry::GEOMETRY;
use super::zobrist::ZOBRIST;

use crate::core::sq::SQ;
use crate::core::{Piece, Player};

static INIT: Once = Once::new();

/// Initializes the static tables. Guaranteed to only run once.
#[cold]
pub fn init_statics() {
    INIT.call_once(|| {
        lazy_static::initialize(&GEOMETRY);
        lazy_static::initialize(&ZOBRIST);
        lazy_static::initialize(&CUCKOO);
    });
}

// GEOMETRY FUNCTIONS

/// Directions whose neighbor square stays on the board, as direction bits.
#[inline(always)]
pub fn king_mask(sq: SQ) -> u16 {
    GEOMETRY.king_mask(sq)
}

/// Knight jumps staying on the board, one bit per jump.
#[inline(always)]
pub fn knight_mask(sq: SQ) -> u8 {
    GEOMETRY.knight_mask(sq)
}

/// Distance from `sq` to the board edge along direction `bit`.
#[inline(always)]
pub fn ray_len(sq: SQ, bit: u16) -> u8 {
    GEOMETRY.ray_len(sq, bit)
}

/// The square-to-square relation word.
#[inline(always)]
pub fn sq2sq(from: SQ, to: SQ) -> u16 {
    GEOMETRY.sq2sq(from, to)
}

/// Knight jumps from `knight_sq` whose destination attacks `xking`.
#[inline(always)]
pub fn knight_checks(xking: SQ, knight_sq: SQ) -> u8 {
    GEOMETRY.knight_checks(xking, knight_sq)
}

/// The two-bit diagonal id mask of a square.
#[inline(always)]
pub fn bishop_diagonals(sq: SQ) -> u32 {
    GEOMETRY.bishop_diagonals(sq)
}

// ZOBRIST FUNCTIONS

/// The Zobrist random for a piece tag on a square.
#[inline(always)]
pub fn z_square(piece: Piece, sq: SQ) -> u64 {
    ZOBRIST.piece_square(piece, sq)
}

/// The material-key addend of a piece tag.
#[inline(always)]
pub fn material_add(piece: Piece) -> u64 {
    ZOBRIST.material_add(piece)
}

/// Whether a piece tag participates in the pawn/king hash.
#[inline(always)]
pub fn in_pawn_king_hash(piece: Piece) -> bool {
    ZOBRIST.in_pawn_king_hash(piece)
}

// CUCKOO FUNCTIONS

/// Looks up a hash difference in a side's reversible-move index.
#[inline(always)]
pub fn cuckoo_probe(player: Player, diff: u64) -> Option<(SQ, SQ)> {
    CUCKOO.probe(player, diff)
}
