//! Static exchange evaluation.
//!
//! A side's attackers or defenders of one square pack into a 15-bit word:
//! mixed-radix counts in the low 12 bits (`((royal * 11 + rook) * 12 +
//! minor) * 3 + pawn`), a last-rank flag at bit 12, and the two-bit
//! "upfront" field naming the piece class standing on the contested square,
//! first in line to be captured. The packing makes set addition a plain
//! integer add and XOR of two sets a usable hash.
//!
//! [`see`] computes the material the responding side extracts from the
//! exchange under the weakest-capturer rule with stand-pat, memoized in a
//! process-wide table of 32768 words. The table is read and written with
//! relaxed atomics: a stale word is either recomputed or rewritten with the
//! same value for its key, never misread.
//!
//! [`see`]: fn.see.html

use std::sync::atomic::{AtomicU16, AtomicU64, Ordering};

use crate::core::dirs::{opposite, ALL_DIRS};
use crate::core::masks::*;
use crate::core::piece_move::EXCHANGE_CLIP;
use crate::core::sq::{NO_SQ, SQ};
use crate::core::{ExchangeClass, Player};
use crate::helper::prelude::*;

use super::attacks::{first_piece_along, line_clear};
use super::Board;

/// Packed units per exchange class: pawn, minor, rook, royal.
const UNITS: [u16; 4] = [1, 3, 36, 396];

/// The last-rank flag: the contested square is a promotion square for the
/// set's owner, and a pawn recapture promotes.
pub const EXCHANGE_LAST_RANK: u16 = 0x1000;

const COUNT_MASK: u16 = 0x0FFF;
const UPFRONT_SHIFT: u32 = 13;

/// A packed set of one side's attackers or defenders of one square.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct PieceSet(pub u16);

impl PieceSet {
    pub const EMPTY: PieceSet = PieceSet(0);

    /// The raw 15-bit word.
    #[inline(always)]
    pub fn raw(self) -> u16 {
        self.0
    }

    /// The mixed-radix count field.
    #[inline(always)]
    pub fn counts(self) -> u16 {
        self.0 & COUNT_MASK
    }

    /// Adds one piece of a class.
    #[inline]
    pub fn add(&mut self, cls: ExchangeClass) {
        self.0 += UNITS[cls as usize];
        debug_assert!(self.counts() < 0x0FFF);
    }

    /// Removes one piece of a class.
    #[inline]
    pub fn sub(&mut self, cls: ExchangeClass) {
        debug_assert!(self.count_of(cls) > 0);
        self.0 -= UNITS[cls as usize];
    }

    /// Adds raw packed units (an `extra_defenders` credit).
    #[inline]
    pub fn add_units(&mut self, units: u16) {
        self.0 += units;
    }

    /// Count of one class.
    #[inline]
    pub fn count_of(self, cls: ExchangeClass) -> u16 {
        let c = self.counts();
        match cls {
            ExchangeClass::Pawn => c % 3,
            ExchangeClass::Minor => (c / 3) % 12,
            ExchangeClass::Rook => (c / 36) % 11,
            ExchangeClass::Royal => c / 396,
        }
    }

    /// The weakest class present, if any.
    #[inline]
    pub fn weakest(self) -> Option<ExchangeClass> {
        let c = self.counts();
        if c == 0 {
            None
        } else if c % 3 != 0 {
            Some(ExchangeClass::Pawn)
        } else if (c / 3) % 12 != 0 {
            Some(ExchangeClass::Minor)
        } else if (c / 36) % 11 != 0 {
            Some(ExchangeClass::Rook)
        } else {
            Some(ExchangeClass::Royal)
        }
    }

    /// The upfront field: the class sitting on the contested square.
    #[inline(always)]
    pub fn upfront(self) -> ExchangeClass {
        unsafe { std::mem::transmute((self.0 >> UPFRONT_SHIFT) as u8 & 0b11) }
    }

    /// Returns the set with the upfront field replaced.
    #[inline]
    pub fn with_upfront(self, cls: ExchangeClass) -> PieceSet {
        PieceSet((self.0 & !(0b11 << UPFRONT_SHIFT)) | ((cls as u16) << UPFRONT_SHIFT))
    }

    /// Returns the set with the upfront field cleared.
    #[inline(always)]
    pub fn cleared_upfront(self) -> PieceSet {
        PieceSet(self.0 & !(0b11 << UPFRONT_SHIFT))
    }

    /// The last-rank flag.
    #[inline(always)]
    pub fn last_rank(self) -> bool {
        self.0 & EXCHANGE_LAST_RANK != 0
    }

    #[inline(always)]
    pub fn set_last_rank(&mut self) {
        self.0 |= EXCHANGE_LAST_RANK;
    }

    #[inline(always)]
    pub fn clear_last_rank(&mut self) {
        self.0 &= !EXCHANGE_LAST_RANK;
    }
}

// --- the process-wide cache ----------------------------------------------

const CACHE_CNT: usize = 32768;

lazy_static! {
    static ref SEE_CACHE: Vec<AtomicU16> = (0..CACHE_CNT).map(|_| AtomicU16::new(0)).collect();
}

static SEE_MISSES: AtomicU64 = AtomicU64::new(0);

/// Zeroes the exchange cache and its miss counter.
pub fn reset_exchange_cache() {
    for slot in SEE_CACHE.iter() {
        slot.store(0, Ordering::Relaxed);
    }
    SEE_MISSES.store(0, Ordering::Relaxed);
}

/// Number of cache misses since the last reset. Diagnostics only.
pub fn exchange_cache_misses() -> u64 {
    SEE_MISSES.load(Ordering::Relaxed)
}

// --- evaluation ----------------------------------------------------------

/// The material the defending side recoups from an exchange on a square.
///
/// `attackers.upfront` names the attacking piece now standing on the
/// square; `defenders` responds with its weakest piece (a promoting pawn
/// outranks that rule), roles swap, and either side may stand pat rather
/// than lose material. The result is non-negative and clipped to fit the
/// prescore nibble.
pub fn see(defenders: PieceSet, attackers: PieceSet) -> i32 {
    if defenders.counts() == 0 {
        return 0;
    }
    // A bare flag with no defenders behind it cannot be built by the
    // collectors; kept as a defensive early-return.
    if defenders.raw() == EXCHANGE_LAST_RANK {
        return 0;
    }

    let store = defenders.raw() & COUNT_MASK;
    let idx = ((store << 3) ^ defenders.raw() ^ attackers.raw()) as usize & (CACHE_CNT - 1);
    let slot = SEE_CACHE[idx].load(Ordering::Relaxed);
    if slot & COUNT_MASK == store {
        return (slot >> 12) as i32;
    }
    SEE_MISSES.fetch_add(1, Ordering::Relaxed);

    let mut gain = attackers.upfront().value();
    let mut next_attackers = defenders;
    if defenders.last_rank() && defenders.count_of(ExchangeClass::Pawn) > 0 {
        // The recapture is a pawn that promotes on the spot.
        gain += ExchangeClass::Royal.value() - ExchangeClass::Pawn.value();
        next_attackers.sub(ExchangeClass::Pawn);
        next_attackers.add(ExchangeClass::Royal);
        if next_attackers.count_of(ExchangeClass::Pawn) == 0 {
            next_attackers.clear_last_rank();
        }
        next_attackers = next_attackers.with_upfront(ExchangeClass::Royal);
    } else {
        let weakest = defenders.weakest().unwrap();
        next_attackers.sub(weakest);
        if weakest == ExchangeClass::Pawn && next_attackers.count_of(ExchangeClass::Pawn) == 0 {
            next_attackers.clear_last_rank();
        }
        next_attackers = next_attackers.with_upfront(weakest);
    }
    let next_defenders = attackers.cleared_upfront();

    let r = gain - see(next_defenders, next_attackers);
    let result = if r < 0 { 0 } else { r.min(EXCHANGE_CLIP) };

    SEE_CACHE[idx].store(((result as u16) << 12) | store, Ordering::Relaxed);
    result
}

// --- collection ----------------------------------------------------------

/// Scratch recording the would-be contributions of pinned defenders, keyed
/// by the pinning attacker's square. Consumed while prescoring the pinner's
/// own capture, where the pin no longer holds.
pub(crate) struct ExtraDefenders {
    units: [u16; SQ_CNT],
    touched: [SQ; 8],
    n: usize,
}

impl ExtraDefenders {
    pub fn new() -> ExtraDefenders {
        ExtraDefenders {
            units: [0; SQ_CNT],
            touched: [NO_SQ; 8],
            n: 0,
        }
    }

    #[inline]
    fn credit(&mut self, sq: SQ, units: u16) {
        if self.units[sq.0 as usize] == 0 && self.n < self.touched.len() {
            self.touched[self.n] = sq;
            self.n += 1;
        }
        self.units[sq.0 as usize] += units;
    }

    #[inline]
    pub fn get(&self, sq: SQ) -> u16 {
        self.units[sq.0 as usize]
    }

    /// Clears every credited entry.
    pub fn clear(&mut self) {
        for i in 0..self.n {
            self.units[self.touched[i].0 as usize] = 0;
        }
        self.n = 0;
    }
}

/// How a collected piece may participate: free, or pinned by the enemy
/// piece on the returned square.
enum Standing {
    Free,
    Pinned(SQ),
}

/// Pin state of `from` against its own king, as seen from the opposing
/// side's attack table.
fn standing_of(board: &Board, from: SQ, king: SQ, enemy_attacks: &[u16; SQ_CNT], to: SQ) -> Standing {
    let rel = sq2sq(from, king) & ALL_DIRS;
    if rel == 0 {
        return Standing::Free;
    }
    let threat = enemy_attacks[from.0 as usize] & rel;
    if threat == 0 || !line_clear(&board.cells, from, king) {
        return Standing::Free;
    }
    // Pinned; moving along the pin axis is still fine.
    let axis = threat | opposite(threat);
    if sq2sq(from, to) & axis != 0 {
        return Standing::Free;
    }
    let pinner = first_piece_along(&board.cells, from, opposite(threat));
    debug_assert!(pinner.is_okay());
    Standing::Pinned(pinner)
}

/// Collects one side's attackers or defenders of `to` into a packed set.
///
/// Sliding attackers hidden behind one another along a ray are all
/// collected. For the defending side, a piece pinned by an attacker is
/// dropped from the set and credited to `extra[pinner]` instead, and each
/// slider hidden behind another defender counts as at least the strength of
/// the piece in front of it.
pub(crate) fn collect(
    board: &Board,
    to: SQ,
    for_active: bool,
    mut extra: Option<&mut ExtraDefenders>,
) -> PieceSet {
    let frame = board.frame();
    let (side, other) = if for_active {
        (&frame.active, &frame.passive)
    } else {
        (&frame.passive, &frame.active)
    };
    let color = side.color;
    let king = side.king_sq();
    let bits = side.attacks_on(to);
    let mut set = PieceSet::EMPTY;
    if bits == 0 {
        return set;
    }
    let promo_rank = to.rank_idx_of_sq() == color.promotion_rank_idx();

    if bits & KING_RING != 0 {
        set.add(ExchangeClass::Royal);
    }

    // Pawns.
    let (west_delta, east_delta) = match color {
        Player::White => (-9i8, 7i8),
        Player::Black => (-7, 9),
    };
    for &(bit, delta) in [(PAWN_WEST, west_delta), (PAWN_EAST, east_delta)].iter() {
        if bits & bit == 0 {
            continue;
        }
        let from = to.offset(delta);
        debug_assert!(board.cells[from.0 as usize].piece.is_pawn());
        match standing_of(board, from, king, &other.attacks, to) {
            Standing::Free => {
                set.add(ExchangeClass::Pawn);
                if promo_rank {
                    set.set_last_rank();
                }
            }
            Standing::Pinned(pinner) => {
                if let Some(ref mut e) = extra {
                    e.credit(pinner, UNITS[ExchangeClass::Pawn as usize]);
                }
            }
        }
    }

    // Knights: the contiguous block right after the king.
    if bits & KNIGHT_FIELD != 0 {
        for i in 1..side.nr_pieces as usize {
            let sq = side.pieces[i];
            if !board.cells[sq.0 as usize].piece.is_knight() {
                break;
            }
            if sq2sq(sq, to) & KNIGHT_UNIT == 0 {
                continue;
            }
            match standing_of(board, sq, king, &other.attacks, to) {
                Standing::Free => set.add(ExchangeClass::Minor),
                Standing::Pinned(pinner) => {
                    if let Some(ref mut e) = extra {
                        e.credit(pinner, UNITS[ExchangeClass::Minor as usize]);
                    }
                }
            }
        }
    }

    // Sliders, with the hidden pieces behind them.
    let mut dir_bits = bits & ALL_DIRS;
    while dir_bits != 0 {
        let d = dir_bits & dir_bits.wrapping_neg();
        dir_bits ^= d;
        let back = opposite(d);
        let mut cur = first_piece_along(&board.cells, to, back);
        let mut front_cls: Option<ExchangeClass> = None;
        while cur.is_okay() {
            let piece = board.cells[cur.0 as usize].piece;
            if piece.player_lossy() != color || piece.slider_dirs() & d == 0 {
                break;
            }
            let mut cls = piece.exchange_class();
            if !for_active {
                // Optimistic SEE: a piece hiding behind another defender
                // counts as at least the strength of the one in front.
                if let Some(front) = front_cls {
                    if (front as u8) > (cls as u8) {
                        cls = front;
                    }
                }
            }
            match standing_of(board, cur, king, &other.attacks, to) {
                Standing::Free => set.add(cls),
                Standing::Pinned(pinner) => {
                    if let Some(ref mut e) = extra {
                        e.credit(pinner, UNITS[cls as usize]);
                    }
                }
            }
            front_cls = Some(cls);
            cur = first_piece_along(&board.cells, cur, back);
        }
    }

    set
}

/// Collects the active side's attackers of `to`.
pub(crate) fn collect_attackers(board: &Board, to: SQ) -> PieceSet {
    collect(board, to, true, None)
}

/// Collects the passive side's defenders of `to`, crediting pinned
/// defenders to `extra`.
pub(crate) fn collect_defenders(
    board: &Board,
    to: SQ,
    extra: &mut ExtraDefenders,
) -> PieceSet {
    collect(board, to, false, Some(extra))
}
