//! The move makers: one routine per piece kind and special form, dispatched
//! off the move's maker tag.
//!
//! Every maker follows the same discipline: victim first (its outgoing
//! attacks withdrawn while the board is still intact), then the mover's
//! outgoing attacks at the origin, then the cell updates — each occupancy
//! flip immediately followed by the XOR flood that extends or truncates the
//! rays passing through that square — and finally the mover's outgoing
//! attacks at the destination. Hashes, the material key and the undo journal
//! are updated along the way.

use crate::core::masks::*;
use crate::core::piece_move::Move;
use crate::core::sq::{NO_SQ, SQ};
use crate::core::{Piece, PieceClass, PieceKind, Player};
use crate::helper::prelude::*;

use super::attacks;
use super::{Board, Cell, Frame};

/// Split borrow of the board used by every maker: the cells and the frame
/// being built.
struct Ctx<'a> {
    cells: &'a mut [Cell; SQ_CNT],
    f: &'a mut Frame,
}

impl Board {
    #[inline]
    fn ctx(&mut self) -> Ctx {
        let Board {
            cells,
            stack,
            current,
            ..
        } = self;
        Ctx {
            cells,
            f: &mut stack[*current],
        }
    }
}

impl<'a> Ctx<'a> {
    /// The moving side of this frame.
    #[inline(always)]
    fn us(&self) -> Player {
        self.f.passive.color
    }

    #[inline]
    fn journal(&mut self, sq: SQ) {
        let cell = self.cells[sq.0 as usize];
        let n = self.f.undo_len as usize;
        debug_assert!(n < super::UNDO_CNT);
        self.f.undo[n] = (sq, cell);
        self.f.undo_len += 1;
    }

    /// XORs a piece-square random into the lazy hash, and into the
    /// pawn/king hash when the tag participates in it.
    #[inline]
    fn hash_piece(&mut self, piece: Piece, sq: SQ) {
        let z = z_square(piece, sq);
        self.f.board_hash_lazy ^= z;
        if in_pawn_king_hash(piece) {
            self.f.pawn_king_hash ^= z;
        }
    }

    #[inline]
    fn mat_sub(&mut self, piece: Piece) {
        self.f.material_key = self.f.material_key.wrapping_sub(material_add(piece));
    }

    #[inline]
    fn mat_add(&mut self, piece: Piece) {
        self.f.material_key = self.f.material_key.wrapping_add(material_add(piece));
    }

    #[inline]
    fn reset_clock(&mut self) {
        self.f.halfmove_clock = 0;
    }

    /// Withdraws the mover's outgoing attacks at `sq`.
    #[inline]
    fn withdraw_mover(&mut self, sq: SQ, piece: Piece) {
        attacks::withdraw_outgoing(&mut self.f.passive.attacks, self.cells, sq, piece);
    }

    /// Extends or truncates both sides' rays passing through `sq`. Call
    /// right after the occupancy of `sq` flips.
    #[inline]
    fn flood_both(&mut self, sq: SQ) {
        attacks::flood_through(&mut self.f.active.attacks, self.cells, sq);
        attacks::flood_through(&mut self.f.passive.attacks, self.cells, sq);
    }

    /// Moves the mover's piece from `from` to `to`, rewriting its tag,
    /// keeping the piece list, the cells, the floods and the destination
    /// emission in sync. Outgoing attacks at `from` must already be
    /// withdrawn, and any victim on `to` must already be taken.
    fn transfer(&mut self, from: SQ, to: SQ, new_tag: Piece, target_was_empty: bool) {
        let idx = self.cells[from.0 as usize].index;
        self.f.passive.pieces[idx as usize] = to;
        self.cells[from.0 as usize] = Cell::EMPTY;
        self.flood_both(from);
        if target_was_empty {
            self.flood_both(to);
        }
        self.cells[to.0 as usize] = Cell {
            piece: new_tag,
            index: idx,
        };
        attacks::emit_outgoing(&mut self.f.passive.attacks, self.cells, to, new_tag);
    }

    /// Removes the enemy piece on `sq` from every incremental structure
    /// except the cell itself, which the caller overwrites (normal capture)
    /// or clears (en passant).
    fn take(&mut self, sq: SQ) {
        let cell = self.cells[sq.0 as usize];
        let victim = cell.piece;
        debug_assert!(victim.is_occupied() && !victim.is_king());
        debug_assert_eq!(victim.player_lossy(), self.f.active.color);

        self.hash_piece(victim, sq);
        self.mat_sub(victim);
        self.reset_clock();

        attacks::withdraw_outgoing(&mut self.f.active.attacks, self.cells, sq, victim);

        if victim.is_bishop() {
            self.f.active.bishop_diagonals ^= bishop_diagonals(sq);
        }
        if victim.kind() == PieceKind::PawnPromo {
            self.f.active.last_rank_pawns &= !(1u8 << sq.file_idx_of_sq());
        }
        if victim.class() == PieceClass::RookCastle {
            self.enemy_rights_lost(sq);
        }

        // Piece-list surgery: fill the victim's slot from the tail. A
        // captured knight first swaps with the last knight of the block so
        // the king-then-knights prefix stays contiguous.
        let idx = cell.index as usize;
        let last = self.f.active.nr_pieces as usize - 1;
        if victim.is_knight() && idx != last {
            let mut l = idx;
            loop {
                let next = self.f.active.pieces[l + 1];
                if l + 1 > last || next == NO_SQ || !self.cells[next.0 as usize].piece.is_knight()
                {
                    break;
                }
                l += 1;
            }
            if l != idx {
                let knight_sq = self.f.active.pieces[l];
                self.journal(knight_sq);
                self.f.active.pieces[idx] = knight_sq;
                self.cells[knight_sq.0 as usize].index = idx as u8;
            }
            if l != last {
                let tail_sq = self.f.active.pieces[last];
                self.journal(tail_sq);
                self.f.active.pieces[l] = tail_sq;
                self.cells[tail_sq.0 as usize].index = l as u8;
            }
        } else if idx != last {
            let tail_sq = self.f.active.pieces[last];
            self.journal(tail_sq);
            self.f.active.pieces[idx] = tail_sq;
            self.cells[tail_sq.0 as usize].index = idx as u8;
        }
        self.f.active.pieces[last] = NO_SQ;
        self.f.active.nr_pieces -= 1;
    }

    /// Captured a castling-capable rook on `corner`: when no sibling
    /// castling rook remains, the enemy king tag drops its castling mark.
    /// Same-class tags hash identically, so only the cell changes.
    fn enemy_rights_lost(&mut self, corner: SQ) {
        let them = self.f.active.color;
        let other = if corner == them.rook_home_kingside() {
            them.rook_home_queenside()
        } else {
            them.rook_home_kingside()
        };
        if self.cells[other.0 as usize].piece != Piece::make(them, PieceKind::RookCastle) {
            let home = them.king_home();
            if self.cells[home.0 as usize].piece == Piece::make(them, PieceKind::KingCastle) {
                self.journal(home);
                self.cells[home.0 as usize].piece = Piece::make(them, PieceKind::King);
            }
        }
    }

    /// The mover's king is leaving its home square: every surviving
    /// castling rook of the mover demotes to a plain rook, which XORs the
    /// corner's pawn random out of both hashes.
    fn drop_own_castling(&mut self) {
        let us = self.us();
        for &corner in [us.rook_home_queenside(), us.rook_home_kingside()].iter() {
            if self.cells[corner.0 as usize].piece == Piece::make(us, PieceKind::RookCastle) {
                self.journal(corner);
                self.hash_piece(Piece::make(us, PieceKind::RookCastle), corner);
                self.hash_piece(Piece::make(us, PieceKind::Rook), corner);
                self.cells[corner.0 as usize].piece = Piece::make(us, PieceKind::Rook);
            }
        }
    }

    /// The bishop tag matching the color of `sq`.
    fn bishop_tag(&self, us: Player, sq: SQ) -> Piece {
        if sq.on_light_square() {
            Piece::make(us, PieceKind::BishopLight)
        } else {
            Piece::make(us, PieceKind::BishopDark)
        }
    }
}

impl Board {
    /// Queen, plain rook, or bishop move.
    pub(super) fn make_slider(&mut self, mv: Move) {
        let (from, to) = (mv.from(), mv.to());
        let mut c = self.ctx();
        let piece = c.cells[from.0 as usize].piece;
        debug_assert!(piece.is_slider() && piece.class() != PieceClass::RookCastle);

        c.hash_piece(piece, from);
        c.hash_piece(piece, to);
        let capture = c.cells[to.0 as usize].piece.is_occupied();
        if capture {
            c.take(to);
        }
        c.withdraw_mover(from, piece);
        if piece.is_bishop() {
            c.f.passive.bishop_diagonals ^= bishop_diagonals(from) ^ bishop_diagonals(to);
        }
        c.transfer(from, to, piece, !capture);
    }

    /// Castling-capable rook move: the rook demotes to a plain rook, and
    /// when it was the last castling rook, the king tag follows.
    pub(super) fn make_castle_rook(&mut self, mv: Move) {
        let (from, to) = (mv.from(), mv.to());
        let mut c = self.ctx();
        let us = c.us();
        debug_assert_eq!(
            c.cells[from.0 as usize].piece,
            Piece::make(us, PieceKind::RookCastle)
        );

        c.hash_piece(Piece::make(us, PieceKind::RookCastle), from);
        c.hash_piece(Piece::make(us, PieceKind::Rook), to);
        let capture = c.cells[to.0 as usize].piece.is_occupied();
        if capture {
            c.take(to);
        }
        c.withdraw_mover(from, Piece::make(us, PieceKind::RookCastle));
        c.transfer(from, to, Piece::make(us, PieceKind::Rook), !capture);

        let other = if from == us.rook_home_kingside() {
            us.rook_home_queenside()
        } else {
            us.rook_home_kingside()
        };
        if c.cells[other.0 as usize].piece != Piece::make(us, PieceKind::RookCastle) {
            let home = us.king_home();
            if c.cells[home.0 as usize].piece == Piece::make(us, PieceKind::KingCastle) {
                c.journal(home);
                c.cells[home.0 as usize].piece = Piece::make(us, PieceKind::King);
            }
        }
    }

    /// Knight move.
    pub(super) fn make_knight(&mut self, mv: Move) {
        let (from, to) = (mv.from(), mv.to());
        let mut c = self.ctx();
        let piece = c.cells[from.0 as usize].piece;
        debug_assert!(piece.is_knight());

        c.hash_piece(piece, from);
        c.hash_piece(piece, to);
        let capture = c.cells[to.0 as usize].piece.is_occupied();
        if capture {
            c.take(to);
        }
        c.withdraw_mover(from, piece);
        c.transfer(from, to, piece, !capture);
    }

    /// King move, dropping any castling rights on the way out.
    pub(super) fn make_king(&mut self, mv: Move) {
        let (from, to) = (mv.from(), mv.to());
        let mut c = self.ctx();
        let us = c.us();
        let old = c.cells[from.0 as usize].piece;
        debug_assert!(old.is_king());

        if old == Piece::make(us, PieceKind::KingCastle) {
            c.drop_own_castling();
        }
        c.hash_piece(old, from);
        c.hash_piece(Piece::make(us, PieceKind::King), to);
        let capture = c.cells[to.0 as usize].piece.is_occupied();
        if capture {
            c.take(to);
        }
        c.withdraw_mover(from, old);
        c.transfer(from, to, Piece::make(us, PieceKind::King), !capture);
    }

    /// Castling: the king moves two squares, the rook lands inside.
    pub(super) fn make_castle(&mut self, mv: Move, king_side: bool) {
        let (king_from, king_to) = (mv.from(), mv.to());
        let mut c = self.ctx();
        let us = c.us();
        let (rook_from, rook_to) = if king_side {
            (us.rook_home_kingside(), king_to.offset(-8))
        } else {
            (us.rook_home_queenside(), king_to.offset(8))
        };
        debug_assert_eq!(king_from, us.king_home());

        c.journal(rook_from);
        c.journal(rook_to);

        // Castling consumes every remaining right: the unused castling
        // rook, if any, demotes too.
        let other = if king_side {
            us.rook_home_queenside()
        } else {
            us.rook_home_kingside()
        };
        if c.cells[other.0 as usize].piece == Piece::make(us, PieceKind::RookCastle) {
            c.journal(other);
            c.hash_piece(Piece::make(us, PieceKind::RookCastle), other);
            c.hash_piece(Piece::make(us, PieceKind::Rook), other);
            c.cells[other.0 as usize].piece = Piece::make(us, PieceKind::Rook);
        }

        c.hash_piece(Piece::make(us, PieceKind::KingCastle), king_from);
        c.hash_piece(Piece::make(us, PieceKind::King), king_to);
        c.hash_piece(Piece::make(us, PieceKind::RookCastle), rook_from);
        c.hash_piece(Piece::make(us, PieceKind::Rook), rook_to);

        c.withdraw_mover(king_from, Piece::make(us, PieceKind::KingCastle));
        c.withdraw_mover(rook_from, Piece::make(us, PieceKind::RookCastle));
        c.transfer(king_from, king_to, Piece::make(us, PieceKind::King), true);
        c.transfer(rook_from, rook_to, Piece::make(us, PieceKind::Rook), true);
    }

    /// Pawn push, single or double.
    pub(super) fn make_pawn_push(&mut self, mv: Move, double: bool) {
        let (from, to) = (mv.from(), mv.to());
        let mut c = self.ctx();
        let us = c.us();
        let old = c.cells[from.0 as usize].piece;
        debug_assert!(old.is_pawn());

        let new_tag = if to.rank_idx_of_sq() == us.seventh_rank_idx() {
            c.f.passive.last_rank_pawns |= 1 << to.file_idx_of_sq();
            Piece::make(us, PieceKind::PawnPromo)
        } else {
            Piece::make(us, PieceKind::Pawn)
        };
        c.hash_piece(old, from);
        c.hash_piece(new_tag, to);
        c.reset_clock();
        c.withdraw_mover(from, old);
        c.transfer(from, to, new_tag, true);

        if double {
            let mid = SQ((from.0 + to.0) / 2);
            c.f.ep_square = mid;
            let stamp = c.f.node_counter;
            c.f.ep_stamp = stamp;
        }
    }

    /// Pawn capture (not a promotion).
    pub(super) fn make_pawn_capture(&mut self, mv: Move) {
        let (from, to) = (mv.from(), mv.to());
        let mut c = self.ctx();
        let us = c.us();
        let old = c.cells[from.0 as usize].piece;
        debug_assert!(old.is_pawn());

        let new_tag = if to.rank_idx_of_sq() == us.seventh_rank_idx() {
            c.f.passive.last_rank_pawns |= 1 << to.file_idx_of_sq();
            Piece::make(us, PieceKind::PawnPromo)
        } else {
            Piece::make(us, PieceKind::Pawn)
        };
        c.hash_piece(old, from);
        c.hash_piece(new_tag, to);
        c.take(to);
        c.withdraw_mover(from, old);
        c.transfer(from, to, new_tag, false);
    }

    /// En-passant capture: the victim vanishes from a third square.
    pub(super) fn make_en_passant(&mut self, mv: Move) {
        let (from, to) = (mv.from(), mv.to());
        let mut c = self.ctx();
        let us = c.us();
        let victim_sq = to.offset(-crate::core::dirs::pawn_push_step(us));
        debug_assert!(c.cells[to.0 as usize].piece.is_empty());
        debug_assert!(c.cells[victim_sq.0 as usize].piece.is_pawn());

        c.journal(victim_sq);
        c.take(victim_sq);
        c.cells[victim_sq.0 as usize] = Cell::EMPTY;
        c.flood_both(victim_sq);

        let pawn = Piece::make(us, PieceKind::Pawn);
        c.hash_piece(pawn, from);
        c.hash_piece(pawn, to);
        c.withdraw_mover(from, pawn);
        c.transfer(from, to, pawn, true);
    }

    /// Promotion, push or capture.
    pub(super) fn make_promotion(&mut self, mv: Move, capture: bool) {
        let (from, to) = (mv.from(), mv.to());
        let mut c = self.ctx();
        let us = c.us();
        debug_assert_eq!(
            c.cells[from.0 as usize].piece,
            Piece::make(us, PieceKind::PawnPromo)
        );

        let new_tag = match mv.promotion_index() {
            0 => Piece::make(us, PieceKind::Knight),
            1 => c.bishop_tag(us, to),
            2 => Piece::make(us, PieceKind::Rook),
            _ => Piece::make(us, PieceKind::Queen),
        };

        c.hash_piece(Piece::make(us, PieceKind::PawnPromo), from);
        c.mat_sub(Piece::make(us, PieceKind::Pawn));
        c.hash_piece(new_tag, to);
        c.mat_add(new_tag);
        c.reset_clock();
        c.f.passive.last_rank_pawns &= !(1u8 << from.file_idx_of_sq());

        if capture {
            c.take(to);
        }
        c.withdraw_mover(from, Piece::make(us, PieceKind::PawnPromo));
        if new_tag.is_bishop() {
            c.f.passive.bishop_diagonals ^= bishop_diagonals(to);
        }
        c.transfer(from, to, new_tag, !capture);

        if new_tag.is_knight() {
            c.insert_knight(to);
        }
    }
}

impl<'a> Ctx<'a> {
    /// A freshly promoted knight must join the contiguous knight block
    /// right after the king; swap it with the first non-knight slot.
    fn insert_knight(&mut self, to: SQ) {
        let idx = self.cells[to.0 as usize].index as usize;
        let mut k = 1usize;
        loop {
            if k == idx {
                return; // already adjacent to the block
            }
            let sq_k = self.f.passive.pieces[k];
            if !self.cells[sq_k.0 as usize].piece.is_knight() {
                break;
            }
            k += 1;
        }
        let other = self.f.passive.pieces[k];
        self.journal(other);
        self.f.passive.pieces[k] = to;
        self.f.passive.pieces[idx] = other;
        self.cells[to.0 as usize].index = k as u8;
        self.cells[other.0 as usize].index = idx as u8;
    }
}
