//! Module for the implementation and definition of a move to be played.
//!
//! A `Move` packs three fields:
//!
//! ```md,ignore
//! code:  bits 0 - 5   destination square
//!        bits 6 - 11  origin square
//! score: 16-bit prescore, high byte written by the generator, low byte
//!        shared with the butterfly history table
//! maker: tag selecting the routine that applies the move
//! ```
//!
//! # Promotions
//!
//! A promotion reuses the 12-bit from/to code by XOR-ing the destination
//! with one of four fixed constants, one per promotion piece. The constants
//! flip the destination's file by four and move its rank off the promotion
//! rank, so the encoded square is never reachable from the pawn's origin by
//! any piece and the code space stays bijective. The `sq2sq` relation table
//! carries one flag per promotion piece at the encoded index, letting the
//! generator and parser recognize promotions without arithmetic.
//!
//! # Special cases
//!
//! The null move is the all-zero code, impossible for a real move since its
//! origin and destination coincide.

use super::sq::SQ;
use std::fmt;

/// XOR constant encoding a knight promotion's destination.
pub const PROMO_XOR_N: u8 = 0x20;
/// XOR constant encoding a bishop promotion's destination.
pub const PROMO_XOR_B: u8 = 0x22;
/// XOR constant encoding a rook promotion's destination.
pub const PROMO_XOR_R: u8 = 0x23;
/// XOR constant encoding a queen promotion's destination.
pub const PROMO_XOR_Q: u8 = 0x27;

/// The four promotion XOR constants, in knight, bishop, rook, queen order.
pub const PROMO_XORS: [u8; 4] = [PROMO_XOR_N, PROMO_XOR_B, PROMO_XOR_R, PROMO_XOR_Q];

/// Neutral high byte of a prescore: a quiet move to a safe square.
pub const EXCHANGE_NEUTRAL: u16 = 0x70;

/// High-nibble marker of a "good" move: a capture that does not lose
/// material, a promotion, an en-passant capture, or a safe check.
pub const PRESCORE_GOOD: u16 = 0xF0;

/// Largest representable exchange gain in pawn units.
pub const EXCHANGE_CLIP: i32 = 14;

/// Tag selecting the make routine of a move.
#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Maker {
    /// A queen, rook or bishop move, capture or not.
    Slider = 0,
    /// A move by a castling-capable rook, dropping the right.
    CastleRook = 1,
    /// A knight move, capture or not.
    Knight = 2,
    /// A king move, capture or not, dropping any castling rights.
    King = 3,
    /// King-side castling.
    CastleShort = 4,
    /// Queen-side castling.
    CastleLong = 5,
    /// A single pawn push.
    PawnPush = 6,
    /// A double pawn push, setting the en-passant square.
    PawnDouble = 7,
    /// A pawn capture.
    PawnCapture = 8,
    /// An en-passant capture.
    EnPassant = 9,
    /// A promoting pawn push.
    PromotePush = 10,
    /// A promoting pawn capture.
    PromoteCapture = 11,
}

/// Represents a singular move, prescored.
///
/// # Safety
///
/// A `Move` is only guaranteed to be applicable to the position that
/// generated it. Applying a move to any other position is undefined.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Move {
    code: u16,
    score: u16,
    maker: Maker,
}

impl Move {
    /// Builds a move from its origin, (possibly encoded) destination,
    /// prescore and maker tag.
    #[inline(always)]
    pub fn new(from: SQ, to: SQ, score: u16, maker: Maker) -> Move {
        Move {
            code: ((from.0 as u16) << 6) | to.0 as u16,
            score,
            maker,
        }
    }

    /// Creates a null move.
    ///
    /// # Safety
    ///
    /// A null move is never a valid move to play; it exists for search
    /// purposes only.
    #[inline(always)]
    pub const fn null() -> Move {
        Move {
            code: 0,
            score: 0,
            maker: Maker::Slider,
        }
    }

    /// Returns if this is the null move.
    #[inline(always)]
    pub const fn is_null(self) -> bool {
        self.code == 0
    }

    /// The packed 12-bit from/to code.
    #[inline(always)]
    pub const fn code(self) -> u16 {
        self.code
    }

    /// The origin square.
    #[inline(always)]
    pub const fn from(self) -> SQ {
        SQ((self.code >> 6) as u8 & 0x3F)
    }

    /// The destination square as stored. For promotions this is the
    /// XOR-encoded square, not the square the pawn lands on.
    #[inline(always)]
    pub const fn to_encoded(self) -> SQ {
        SQ(self.code as u8 & 0x3F)
    }

    /// The real destination square, decoding promotions.
    #[inline]
    pub fn to(self) -> SQ {
        match self.maker {
            Maker::PromotePush | Maker::PromoteCapture => {
                SQ(self.to_encoded().0 ^ PROMO_XORS[self.promotion_index()])
            }
            _ => self.to_encoded(),
        }
    }

    /// The maker tag.
    #[inline(always)]
    pub const fn maker(self) -> Maker {
        self.maker
    }

    /// The prescore.
    #[inline(always)]
    pub const fn score(self) -> u16 {
        self.score
    }

    /// Returns if the move is a promotion.
    #[inline(always)]
    pub fn is_promotion(self) -> bool {
        matches!(self.maker, Maker::PromotePush | Maker::PromoteCapture)
    }

    /// Returns if the move is castling.
    #[inline(always)]
    pub fn is_castle(self) -> bool {
        matches!(self.maker, Maker::CastleShort | Maker::CastleLong)
    }

    /// Returns if the move is an en-passant capture.
    #[inline(always)]
    pub fn is_en_passant(self) -> bool {
        self.maker == Maker::EnPassant
    }

    /// Index of the promotion piece: 0 knight, 1 bishop, 2 rook, 3 queen.
    ///
    /// # Safety
    ///
    /// Only meaningful if `is_promotion()`.
    #[inline]
    pub fn promotion_index(self) -> usize {
        let from = self.from();
        let enc = self.to_encoded();
        for (i, &x) in PROMO_XORS.iter().enumerate() {
            let t = SQ(enc.0 ^ x);
            let rank = t.rank_idx_of_sq();
            if (rank == 7 || rank == 0)
                && t.file_idx_of_sq().wrapping_sub(from.file_idx_of_sq()).wrapping_add(1) <= 2
                && t.rank_idx_of_sq().wrapping_sub(from.rank_idx_of_sq()).wrapping_add(1) <= 2
            {
                return i;
            }
        }
        debug_assert!(false, "not a promotion encoding");
        3
    }

    /// The lowercase letter of the promotion piece.
    pub fn promotion_char(self) -> char {
        match self.promotion_index() {
            0 => 'n',
            1 => 'b',
            2 => 'r',
            _ => 'q',
        }
    }

    /// Returns a String representation of a `Move`: origin square then
    /// destination square, with the promotion piece appended when there is
    /// one. `a1b8`, `e7e8q`.
    pub fn stringify(self) -> String {
        let mut s = format!("{}{}", self.from(), self.to());
        if self.is_promotion() {
            s.push(self.promotion_char());
        }
        s
    }

    /// Returns if two moves encode the same board action, disregarding
    /// their prescores.
    #[inline(always)]
    pub fn same_action(self, other: Move) -> bool {
        self.code == other.code && self.maker == other.maker
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.stringify())
    }
}

/// Builds the prescore high word of a good move with the given exchange
/// gain, clipped to the representable range.
#[inline(always)]
pub fn prescore_good(gain: i32) -> u16 {
    let g = gain.max(0).min(EXCHANGE_CLIP) as u16;
    (PRESCORE_GOOD | g) << 8
}

/// Builds the prescore high word of a move losing `loss` pawns of material.
#[inline(always)]
pub fn prescore_losing(loss: i32) -> u16 {
    let l = (loss.max(0) as u16).min(EXCHANGE_NEUTRAL);
    (EXCHANGE_NEUTRAL - l) << 8
}

/// Builds the prescore high word of a quiet move; `exposed` biases it down
/// by one when the destination is attacked.
#[inline(always)]
pub fn prescore_quiet(exposed: bool) -> u16 {
    (EXCHANGE_NEUTRAL - exposed as u16) << 8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_null() {
        assert!(Move::null().is_null());
        assert!(!Move::new(SQ::A2, SQ::A4, 0, Maker::PawnDouble).is_null());
    }

    #[test]
    fn from_to_round_trip() {
        let m = Move::new(SQ::E2, SQ::E4, 0, Maker::PawnDouble);
        assert_eq!(m.from(), SQ::E2);
        assert_eq!(m.to(), SQ::E4);
        assert_eq!(m.stringify(), "e2e4");
    }

    #[test]
    fn promotion_encoding_round_trip() {
        // Every (from, to, piece) combination on both promotion ranks must
        // decode back to itself.
        for from_file in 0..8i8 {
            for (from_rank, to_rank) in [(6i8, 7i8), (1, 0)].iter() {
                let from = SQ((from_file * 8 + from_rank) as u8);
                for df in -1..=1i8 {
                    let tf = from_file + df;
                    if !(0..8).contains(&tf) {
                        continue;
                    }
                    let to = SQ((tf * 8 + to_rank) as u8);
                    for (i, &x) in PROMO_XORS.iter().enumerate() {
                        let enc = SQ(to.0 ^ x);
                        let maker = if df == 0 {
                            Maker::PromotePush
                        } else {
                            Maker::PromoteCapture
                        };
                        let m = Move::new(from, enc, 0, maker);
                        assert_eq!(m.promotion_index(), i, "{} -> {}", from, to);
                        assert_eq!(m.to(), to);
                    }
                }
            }
        }
    }

    #[test]
    fn promotion_stringify() {
        let enc = SQ(SQ::E8.0 ^ PROMO_XOR_Q);
        let m = Move::new(SQ::E7, enc, 0, Maker::PromotePush);
        assert_eq!(m.stringify(), "e7e8q");
    }

    #[test]
    fn prescore_ordering() {
        assert!(prescore_good(0) > prescore_quiet(false));
        assert!(prescore_quiet(false) > prescore_quiet(true));
        assert!(prescore_quiet(true) > prescore_losing(3));
        assert!(prescore_good(5) > prescore_good(1));
    }
}
