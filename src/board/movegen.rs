//! The legal move generator.
//!
//! Every entry point emits only legal moves: pins, discovered checks,
//! castling-through-check and the en-passant edge cases are resolved from
//! the attack tables during generation, never by generate-then-filter.
//! Each emitted move carries a prescore combining its butterfly word with
//! an exchange verdict computed through [`exchange::see`].
//!
//! [`exchange::see`]: ../exchange/fn.see.html

use crate::core::dirs::*;
use crate::core::masks::*;
use crate::core::move_list::MoveList;
use crate::core::piece_move::{prescore_good, prescore_losing, prescore_quiet, Maker, Move};
use crate::core::piece_move::PROMO_XORS;
use crate::core::sq::SQ;
use crate::core::{ExchangeClass, Piece, PieceClass, PieceKind, Player};
use crate::helper::prelude::*;

use super::attacks::{first_piece_along, line_clear};
use super::exchange::{self, ExtraDefenders, PieceSet};
use super::{Board, Cell};

/// One capture candidate found while walking the attackers of a square.
#[derive(Copy, Clone)]
struct Cand {
    from: SQ,
    cls: ExchangeClass,
    maker: Maker,
}

const CAND_CNT: usize = 24;

struct Generator<'a> {
    board: &'a Board,
    us: Player,
    list: MoveList,
    extra: ExtraDefenders,
}

impl Board {
    /// Generates the legal escapes of a position in check.
    pub fn generate_escapes(&self) -> MoveList {
        debug_assert!(self.in_check());
        let mut g = Generator::new(self);
        g.escapes();
        g.list
    }

    /// Generates all legal captures, promotions and en-passant captures.
    /// The position must not be in check.
    pub fn generate_captures(&self) -> MoveList {
        debug_assert!(!self.in_check());
        let mut g = Generator::new(self);
        g.captures_and_promotions();
        g.list
    }

    /// Generates all legal quiet moves, castling included. The position
    /// must not be in check.
    pub fn generate_quiets(&self) -> MoveList {
        debug_assert!(!self.in_check());
        let mut g = Generator::new(self);
        g.quiets();
        g.list
    }

    /// Generates the legal quiet moves that give check, both direct and
    /// discovered. The position must not be in check.
    pub fn generate_quiet_checks(&self) -> MoveList {
        debug_assert!(!self.in_check());
        let mut g = Generator::new(self);
        g.quiet_checks();
        g.list
    }
}

impl Board {
    /// Whether a legal en-passant capture exists right now. Drives the
    /// canonical FEN rule that the en-passant square is only emitted when
    /// it is actually usable.
    pub(crate) fn legal_ep_exists(&self) -> bool {
        if self.ep_square().is_none() {
            return false;
        }
        self.generate_moves().iter().any(|m| m.is_en_passant())
    }

    /// The en-passant blind spots: removing both the capturing and the
    /// captured pawn in one move can uncover a rank attack through the two
    /// vacated squares, or a diagonal through the victim. Walk every ray
    /// from the mover's king over a board with `from` and `vsq` removed and
    /// `to` occupied, and ask whether an enemy slider emerges. Shared by
    /// the generator and the setup validation.
    pub(crate) fn ep_exposes_king(&self, from: SQ, to: SQ, vsq: SQ) -> bool {
        let king = self.frame().active.king_sq();
        let them = self.turn().other_player();
        let mut m = king_mask(king);
        while m != 0 {
            let bit = m & m.wrapping_neg();
            m ^= bit;
            let len = ray_len(king, bit);
            let delta = step(bit);
            let mut cur = king;
            'ray: for _ in 0..len {
                cur = cur.offset(delta);
                if cur == to {
                    break 'ray; // the arriving pawn blocks this ray
                }
                if cur == from || cur == vsq {
                    continue; // vacated by the capture
                }
                let piece = self.cells[cur.0 as usize].piece;
                if piece.is_empty() {
                    continue;
                }
                if piece.player_lossy() == them && piece.slider_dirs() & bit != 0 {
                    return true;
                }
                break 'ray;
            }
        }
        false
    }
}

impl<'a> Generator<'a> {
    fn new(board: &'a Board) -> Generator<'a> {
        Generator {
            board,
            us: board.turn(),
            list: MoveList::default(),
            extra: ExtraDefenders::new(),
        }
    }

    #[inline(always)]
    fn cells(&self) -> &'a [Cell; SQ_CNT] {
        &self.board.cells
    }

    /// Pushes a move, folding the butterfly word into its prescore.
    #[inline]
    fn emit(&mut self, from: SQ, to_enc: SQ, high: u16, maker: Maker) {
        let code = (((from.0 as u16) << 6) | to_enc.0 as u16) as usize;
        let score = high | self.board.butterfly[code];
        self.list.push(Move::new(from, to_enc, score, maker));
    }

    /// Allowed movement directions of the active piece on `from`:
    /// every direction when free, the pin axis when pinned.
    fn pin_mask(&self, from: SQ) -> u16 {
        let f = self.board.frame();
        let king = f.active.king_sq();
        let rel = sq2sq(from, king) & ALL_DIRS;
        if rel == 0 {
            return ALL_DIRS;
        }
        let threat = f.passive.attacks_on(from) & rel;
        if threat == 0 || !line_clear(self.cells(), from, king) {
            return ALL_DIRS;
        }
        threat | opposite(threat)
    }

    // --- quiet moves -----------------------------------------------------

    fn quiets(&mut self) {
        let board = self.board;
        let act = &board.frame().active;
        for i in 0..act.nr_pieces as usize {
            let sq = act.pieces[i];
            let piece = board.cells[sq.0 as usize].piece;
            match piece.kind() {
                PieceKind::King | PieceKind::KingCastle => self.king_quiets(sq),
                PieceKind::RookCastle => {
                    self.slider_quiets(sq, ORTHO_DIRS, Maker::CastleRook);
                    self.castling(sq);
                }
                PieceKind::Queen | PieceKind::Rook
                | PieceKind::BishopLight | PieceKind::BishopDark => {
                    self.slider_quiets(sq, piece.slider_dirs(), Maker::Slider)
                }
                PieceKind::Knight => self.knight_quiets(sq),
                PieceKind::Pawn => self.pawn_pushes(sq, false),
                PieceKind::PawnStart => self.pawn_pushes(sq, true),
                // Promotions, including the quiet push, live with the
                // capture generator.
                PieceKind::PawnPromo => {}
            }
        }
    }

    fn king_quiets(&mut self, sq: SQ) {
        let board = self.board;
        let pas = &board.frame().passive;
        let mut m = king_mask(sq);
        while m != 0 {
            let bit = m & m.wrapping_neg();
            m ^= bit;
            let to = sq.offset(step(bit));
            if board.cells[to.0 as usize].piece.is_occupied() || pas.attacks_on(to) != 0 {
                continue;
            }
            self.emit(sq, to, prescore_quiet(false), Maker::King);
        }
    }

    fn slider_quiets(&mut self, sq: SQ, dirs: u16, maker: Maker) {
        let board = self.board;
        let pas = &board.frame().passive;
        let mut m = dirs & self.pin_mask(sq);
        while m != 0 {
            let bit = m & m.wrapping_neg();
            m ^= bit;
            let len = ray_len(sq, bit);
            let delta = step(bit);
            let mut to = sq;
            for _ in 0..len {
                to = to.offset(delta);
                if board.cells[to.0 as usize].piece.is_occupied() {
                    break;
                }
                self.emit(sq, to, prescore_quiet(pas.attacks_on(to) != 0), maker);
            }
        }
    }

    fn knight_quiets(&mut self, sq: SQ) {
        if self.pin_mask(sq) != ALL_DIRS {
            return;
        }
        let board = self.board;
        let pas = &board.frame().passive;
        let mut m = knight_mask(sq);
        while m != 0 {
            let j = m.trailing_zeros() as usize;
            m &= m - 1;
            let to = sq.offset(KNIGHT_JUMP[j]);
            if board.cells[to.0 as usize].piece.is_empty() {
                self.emit(sq, to, prescore_quiet(pas.attacks_on(to) != 0), Maker::Knight);
            }
        }
    }

    fn pawn_pushes(&mut self, sq: SQ, start_rank: bool) {
        let board = self.board;
        let pas = &board.frame().passive;
        if self.pin_mask(sq) & pawn_push_dir(self.us) == 0 {
            return;
        }
        let delta = pawn_push_step(self.us);
        let to = sq.offset(delta);
        if board.cells[to.0 as usize].piece.is_occupied() {
            return;
        }
        self.emit(sq, to, prescore_quiet(pas.attacks_on(to) != 0), Maker::PawnPush);
        if start_rank {
            let to2 = to.offset(delta);
            if board.cells[to2.0 as usize].piece.is_empty() {
                self.emit(sq, to2, prescore_quiet(pas.attacks_on(to2) != 0), Maker::PawnDouble);
            }
        }
    }

    /// Castling, generated while scanning the castling-capable rook. The
    /// corner tag guarantees the matching king tag at home (tag invariant),
    /// and the caller guarantees the king is not in check.
    fn castling(&mut self, rook_sq: SQ) {
        let board = self.board;
        let pas = &board.frame().passive;
        let home = self.us.king_home();
        if rook_sq == self.us.rook_home_kingside() {
            let f1 = home.offset(8);
            let g1 = home.offset(16);
            if board.cells[f1.0 as usize].piece.is_empty()
                && board.cells[g1.0 as usize].piece.is_empty()
                && pas.attacks_on(f1) == 0
                && pas.attacks_on(g1) == 0
            {
                self.emit(home, g1, prescore_quiet(false), Maker::CastleShort);
            }
        } else {
            let d1 = home.offset(-8);
            let c1 = home.offset(-16);
            let b1 = home.offset(-24);
            if board.cells[d1.0 as usize].piece.is_empty()
                && board.cells[c1.0 as usize].piece.is_empty()
                && board.cells[b1.0 as usize].piece.is_empty()
                && pas.attacks_on(d1) == 0
                && pas.attacks_on(c1) == 0
            {
                self.emit(home, c1, prescore_quiet(false), Maker::CastleLong);
            }
        }
    }

    // --- captures and promotions ----------------------------------------

    fn captures_and_promotions(&mut self) {
        let board = self.board;
        let pas = &board.frame().passive;
        let nr = pas.nr_pieces as usize;
        for i in 1..nr {
            let to = pas.pieces[i];
            let att = board.frame().active.attacks_on(to);
            if att != 0 {
                self.captures_to(to, att, true);
            }
        }
        self.quiet_promotions();
        self.en_passant();
    }

    /// Two-pass capture generation onto one enemy-occupied square: collect
    /// the legal capturers and the full attacker set, then score each
    /// capture against the defenders.
    fn captures_to(&mut self, to: SQ, att: u16, include_king: bool) {
        let board = self.board;
        let cells = self.cells();
        let victim_value = board.cells[to.0 as usize].piece.exchange_class().value();

        let mut cands = [Cand {
            from: SQ(0),
            cls: ExchangeClass::Pawn,
            maker: Maker::Slider,
        }; CAND_CNT];
        let mut n_cands = 0usize;
        let push_cand = |c: Cand, n: &mut usize, cands: &mut [Cand; CAND_CNT]| {
            if *n < CAND_CNT {
                cands[*n] = c;
                *n += 1;
            }
        };

        let mut att_set = PieceSet::EMPTY;

        // King capture: only onto an undefended square.
        if att & KING_RING != 0 {
            att_set.add(ExchangeClass::Royal);
            if include_king && board.frame().passive.attacks_on(to) == 0 {
                let ksq = board.frame().active.king_sq();
                self.emit(ksq, to, prescore_good(victim_value), Maker::King);
            }
        }

        // Pawns.
        let (west_delta, east_delta) = match self.us {
            Player::White => (-9i8, 7i8),
            Player::Black => (-7, 9),
        };
        let promo_rank = to.rank_idx_of_sq() == self.us.promotion_rank_idx();
        for &(bit, delta) in [(PAWN_WEST, west_delta), (PAWN_EAST, east_delta)].iter() {
            if att & bit == 0 {
                continue;
            }
            let from = to.offset(delta);
            let ptag = cells[from.0 as usize].piece;
            debug_assert!(ptag.is_pawn());
            let dir = sq2sq(from, to) & ALL_DIRS;
            if self.pin_mask(from) & dir == 0 {
                continue;
            }
            att_set.add(ExchangeClass::Pawn);
            if promo_rank {
                att_set.set_last_rank();
            }
            let maker = if ptag.kind() == PieceKind::PawnPromo {
                Maker::PromoteCapture
            } else {
                Maker::PawnCapture
            };
            push_cand(
                Cand {
                    from,
                    cls: ExchangeClass::Pawn,
                    maker,
                },
                &mut n_cands,
                &mut cands,
            );
        }

        // Knights.
        if att & KNIGHT_FIELD != 0 {
            let act = &board.frame().active;
            for i in 1..act.nr_pieces as usize {
                let sq = act.pieces[i];
                if !cells[sq.0 as usize].piece.is_knight() {
                    break;
                }
                if sq2sq(sq, to) & KNIGHT_UNIT == 0 {
                    continue;
                }
                if self.pin_mask(sq) != ALL_DIRS {
                    continue;
                }
                att_set.add(ExchangeClass::Minor);
                push_cand(
                    Cand {
                        from: sq,
                        cls: ExchangeClass::Minor,
                        maker: Maker::Knight,
                    },
                    &mut n_cands,
                    &mut cands,
                );
            }
        }

        // Sliders, front piece capturing, hidden ones joining the set.
        let mut dir_bits = att & ALL_DIRS;
        while dir_bits != 0 {
            let d = dir_bits & dir_bits.wrapping_neg();
            dir_bits ^= d;
            let back = opposite(d);
            let mut cur = first_piece_along(cells, to, back);
            let mut front = true;
            while cur.is_okay() {
                let piece = cells[cur.0 as usize].piece;
                if piece.is_empty()
                    || piece.player_lossy() != self.us
                    || piece.slider_dirs() & d == 0
                {
                    break;
                }
                if self.pin_mask(cur) & d != 0 {
                    att_set.add(piece.exchange_class());
                    if front {
                        let maker = if piece.class() == PieceClass::RookCastle {
                            Maker::CastleRook
                        } else {
                            Maker::Slider
                        };
                        push_cand(
                            Cand {
                                from: cur,
                                cls: piece.exchange_class(),
                                maker,
                            },
                            &mut n_cands,
                            &mut cands,
                        );
                    }
                }
                front = false;
                cur = first_piece_along(cells, cur, back);
            }
        }

        if n_cands == 0 {
            return;
        }

        // Second pass: score against the defenders.
        self.extra.clear();
        let defenders = exchange::collect_defenders(board, to, &mut self.extra);
        for i in 0..n_cands {
            let cand = cands[i];
            let mut def = defenders;
            def.add_units(self.extra.get(cand.from));
            let mut after = att_set;
            after.sub(cand.cls);
            if cand.cls == ExchangeClass::Pawn && after.count_of(ExchangeClass::Pawn) == 0 {
                after.clear_last_rank();
            }
            if cand.maker == Maker::PromoteCapture {
                self.emit_promotions(cand.from, to, Some(victim_value), def, after);
            } else {
                let after = after.with_upfront(cand.cls);
                let net = victim_value - exchange::see(def, after);
                let high = if net >= 0 {
                    prescore_good(net)
                } else {
                    prescore_losing(-net)
                };
                self.emit(cand.from, to, high, cand.maker);
            }
        }
    }

    /// Emits all four promotions of one pawn move, each with its own
    /// exchange verdict. Promotions always carry the good-move nibble.
    fn emit_promotions(
        &mut self,
        from: SQ,
        to: SQ,
        capture: Option<i32>,
        def: PieceSet,
        att_rest: PieceSet,
    ) {
        const PROMO_CLS: [ExchangeClass; 4] = [
            ExchangeClass::Minor,
            ExchangeClass::Minor,
            ExchangeClass::Rook,
            ExchangeClass::Royal,
        ];
        let maker = if capture.is_some() {
            Maker::PromoteCapture
        } else {
            Maker::PromotePush
        };
        for idx in 0..4 {
            let cls = PROMO_CLS[idx];
            let after = att_rest.with_upfront(cls);
            let promo_gain = cls.value() - ExchangeClass::Pawn.value();
            let net = capture.unwrap_or(0) + promo_gain - exchange::see(def, after);
            let enc = SQ(to.0 ^ PROMO_XORS[idx]);
            self.emit(from, enc, prescore_good(net), maker);
        }
    }

    /// Quiet promotions, found through the last-rank pawn file mask.
    fn quiet_promotions(&mut self) {
        let board = self.board;
        let mut files = board.frame().active.last_rank_pawns;
        let push = pawn_push_step(self.us);
        while files != 0 {
            let file = files.trailing_zeros() as u8;
            files &= files - 1;
            let from = SQ(file * 8 + self.us.seventh_rank_idx());
            debug_assert_eq!(
                board.cells[from.0 as usize].piece,
                Piece::make(self.us, PieceKind::PawnPromo)
            );
            let to = from.offset(push);
            if board.cells[to.0 as usize].piece.is_occupied() {
                continue;
            }
            if self.pin_mask(from) & pawn_push_dir(self.us) == 0 {
                continue;
            }
            self.extra.clear();
            let def = exchange::collect_defenders(board, to, &mut self.extra);
            let att = exchange::collect_attackers(board, to);
            self.emit_promotions(from, to, None, def, att);
        }
    }

    /// En-passant captures of a current en-passant square.
    fn en_passant(&mut self) {
        let board = self.board;
        let ep = match board.ep_square() {
            Some(sq) => sq,
            None => return,
        };
        self.en_passant_to(ep);
    }

    fn en_passant_to(&mut self, ep: SQ) {
        let board = self.board;
        let att = board.frame().active.attacks_on(ep);
        let vsq = ep.offset(-pawn_push_step(self.us));
        debug_assert!(board.cells[vsq.0 as usize].piece.is_pawn());
        let (west_delta, east_delta) = match self.us {
            Player::White => (-9i8, 7i8),
            Player::Black => (-7, 9),
        };
        for &(bit, delta) in [(PAWN_WEST, west_delta), (PAWN_EAST, east_delta)].iter() {
            if att & bit == 0 {
                continue;
            }
            let from = ep.offset(delta);
            debug_assert!(board.cells[from.0 as usize].piece.is_pawn());
            if board.ep_exposes_king(from, ep, vsq) {
                continue;
            }
            self.extra.clear();
            let def = exchange::collect_defenders(board, ep, &mut self.extra);
            let mut after = exchange::collect_attackers(board, ep);
            if after.count_of(ExchangeClass::Pawn) > 0 {
                after.sub(ExchangeClass::Pawn);
            }
            let after = after.with_upfront(ExchangeClass::Pawn);
            let mut def_here = def;
            def_here.add_units(self.extra.get(from));
            let net = 1 - exchange::see(def_here, after);
            self.emit(from, ep, prescore_good(net), Maker::EnPassant);
        }
    }

    // --- escapes ---------------------------------------------------------

    fn escapes(&mut self) {
        let board = self.board;
        let f = board.frame();
        let king = f.active.king_sq();
        let threats = f.passive.attacks_on(king);
        debug_assert_ne!(threats, 0);

        let slider_bits = threats & ALL_DIRS;
        let checkers = slider_bits.count_ones()
            + (threats & PAWN_BITS).count_ones()
            + ((threats & KNIGHT_FIELD) >> 11) as u32;

        // King steps, never back along a checking ray.
        let mut m = king_mask(king) & !slider_bits;
        while m != 0 {
            let bit = m & m.wrapping_neg();
            m ^= bit;
            let to = king.offset(step(bit));
            let cell = board.cells[to.0 as usize];
            if f.passive.attacks_on(to) != 0 {
                continue;
            }
            if cell.piece.is_empty() {
                self.emit(king, to, prescore_quiet(false), Maker::King);
            } else if cell.piece.player_lossy() != self.us {
                let gain = cell.piece.exchange_class().value();
                self.emit(king, to, prescore_good(gain), Maker::King);
            }
        }

        if checkers > 1 {
            return; // double check: king moves only
        }

        if slider_bits != 0 {
            // A single sliding checker: capture it or block the ray.
            let back = opposite(slider_bits);
            let checker = first_piece_along(&board.cells, king, back);
            debug_assert!(checker.is_okay());
            let delta = step(back);
            let mut gap = king.offset(delta);
            while gap != checker {
                self.blocks_to(gap);
                gap = gap.offset(delta);
            }
            let att = f.active.attacks_on(checker);
            if att != 0 {
                self.captures_to(checker, att, false);
            }
        } else if threats & PAWN_BITS != 0 {
            // The checker is a pawn; en passant may remove it too.
            let them = self.us.other_player();
            let (west_delta, east_delta) = match them {
                Player::White => (-9i8, 7i8),
                Player::Black => (-7, 9),
            };
            let checker = if threats & PAWN_WEST != 0 {
                king.offset(west_delta)
            } else {
                king.offset(east_delta)
            };
            let att = f.active.attacks_on(checker);
            if att != 0 {
                self.captures_to(checker, att, false);
            }
            let ep_of_checker = checker.offset(pawn_push_step(self.us));
            if board.ep_square() == Some(ep_of_checker) {
                self.en_passant_to(ep_of_checker);
            }
        } else {
            // The checker is a knight: find it in the enemy knight block.
            let mut checker = SQ::NONE;
            for i in 1..f.passive.nr_pieces as usize {
                let sq = f.passive.pieces[i];
                if !board.cells[sq.0 as usize].piece.is_knight() {
                    break;
                }
                if sq2sq(king, sq) & KNIGHT_UNIT != 0 {
                    checker = sq;
                    break;
                }
            }
            debug_assert!(checker.is_okay());
            let att = f.active.attacks_on(checker);
            if att != 0 {
                self.captures_to(checker, att, false);
            }
        }
    }

    /// Quiet moves of non-king pieces onto one empty square, blocking a
    /// checking ray.
    fn blocks_to(&mut self, gap: SQ) {
        let board = self.board;
        let f = board.frame();
        let cells = self.cells();
        debug_assert!(cells[gap.0 as usize].piece.is_empty());
        let att = f.active.attacks_on(gap);

        // Knights.
        if att & KNIGHT_FIELD != 0 {
            for i in 1..f.active.nr_pieces as usize {
                let sq = f.active.pieces[i];
                if !cells[sq.0 as usize].piece.is_knight() {
                    break;
                }
                if sq2sq(sq, gap) & KNIGHT_UNIT == 0 {
                    continue;
                }
                if self.pin_mask(sq) != ALL_DIRS {
                    continue;
                }
                self.emit(sq, gap, prescore_quiet(true), Maker::Knight);
            }
        }

        // Sliders: only the piece fronting each ray can move in.
        let mut dir_bits = att & ALL_DIRS;
        while dir_bits != 0 {
            let d = dir_bits & dir_bits.wrapping_neg();
            dir_bits ^= d;
            let cur = first_piece_along(cells, gap, opposite(d));
            debug_assert!(cur.is_okay());
            let piece = cells[cur.0 as usize].piece;
            if piece.player_lossy() != self.us || piece.slider_dirs() & d == 0 {
                continue;
            }
            if self.pin_mask(cur) & d == 0 {
                continue;
            }
            let maker = if piece.class() == PieceClass::RookCastle {
                Maker::CastleRook
            } else {
                Maker::Slider
            };
            self.emit(cur, gap, prescore_quiet(true), maker);
        }

        // Pawn pushes into the gap.
        let push = pawn_push_step(self.us);
        let from1 = gap.offset(-push);
        if !from1.is_okay() {
            return;
        }
        let p1 = cells[from1.0 as usize].piece;
        if p1.is_occupied() {
            if p1.is_pawn()
                && p1.player_lossy() == self.us
                && self.pin_mask(from1) & pawn_push_dir(self.us) != 0
            {
                if p1.kind() == PieceKind::PawnPromo {
                    self.extra.clear();
                    let def = exchange::collect_defenders(board, gap, &mut self.extra);
                    let att_set = exchange::collect_attackers(board, gap);
                    self.emit_promotions(from1, gap, None, def, att_set);
                } else {
                    self.emit(from1, gap, prescore_quiet(true), Maker::PawnPush);
                }
            }
            return;
        }
        let from2 = gap.offset(-2 * push);
        if !from2.is_okay() {
            return;
        }
        let p2 = cells[from2.0 as usize].piece;
        if p2 == Piece::make(self.us, PieceKind::PawnStart)
            && self.pin_mask(from2) & pawn_push_dir(self.us) != 0
        {
            self.emit(from2, gap, prescore_quiet(true), Maker::PawnDouble);
        }
    }

    // --- quiet checks ----------------------------------------------------

    /// The direction bits along which the piece on `sq` currently shadows
    /// one of our own slider rays pointed at the enemy king, or zero.
    fn discovery_axis(&self, sq: SQ, xking: SQ) -> u16 {
        let f = self.board.frame();
        let rel = sq2sq(sq, xking) & ALL_DIRS;
        if rel == 0 {
            return 0;
        }
        let hidden = f.active.attacks_on(sq) & rel;
        if hidden == 0 || !line_clear(self.cells(), sq, xking) {
            return 0;
        }
        hidden | opposite(hidden)
    }

    /// Exchange verdict of a quiet move: what the defense wins once the
    /// mover stands on `to`. Zero means the square is safe.
    fn quiet_loss(&mut self, from: SQ, to: SQ, cls: ExchangeClass, attacked_to: bool) -> i32 {
        let board = self.board;
        self.extra.clear();
        let def = exchange::collect_defenders(board, to, &mut self.extra);
        let mut att = exchange::collect_attackers(board, to);
        if attacked_to && att.count_of(cls) > 0 {
            att.sub(cls);
        }
        let mut def_here = def;
        def_here.add_units(self.extra.get(from));
        exchange::see(def_here, att.with_upfront(cls))
    }

    fn emit_check(&mut self, from: SQ, to: SQ, maker: Maker, cls: ExchangeClass, moved_off_attack: bool) {
        let loss = self.quiet_loss(from, to, cls, moved_off_attack);
        let high = if loss == 0 {
            prescore_good(0)
        } else {
            prescore_losing(loss)
        };
        self.emit(from, to, high, maker);
    }

    fn quiet_checks(&mut self) {
        let board = self.board;
        let f = board.frame();
        let xking = f.passive.king_sq();

        // Discovered checks: any legal quiet move off the shadowed axis.
        for i in 0..f.active.nr_pieces as usize {
            let sq = f.active.pieces[i];
            let axis = self.discovery_axis(sq, xking);
            if axis == 0 {
                continue;
            }
            let piece = board.cells[sq.0 as usize].piece;
            match piece.kind() {
                PieceKind::King | PieceKind::KingCastle => {
                    let mut m = king_mask(sq) & !axis;
                    while m != 0 {
                        let bit = m & m.wrapping_neg();
                        m ^= bit;
                        let to = sq.offset(step(bit));
                        if board.cells[to.0 as usize].piece.is_empty()
                            && f.passive.attacks_on(to) == 0
                        {
                            self.emit(sq, to, prescore_good(0), Maker::King);
                        }
                    }
                }
                PieceKind::Knight => {
                    if self.pin_mask(sq) != ALL_DIRS {
                        continue;
                    }
                    let mut m = knight_mask(sq);
                    while m != 0 {
                        let j = m.trailing_zeros() as usize;
                        m &= m - 1;
                        let to = sq.offset(KNIGHT_JUMP[j]);
                        if board.cells[to.0 as usize].piece.is_empty() {
                            self.emit_check(sq, to, Maker::Knight, ExchangeClass::Minor, true);
                        }
                    }
                }
                PieceKind::Queen | PieceKind::Rook | PieceKind::RookCastle
                | PieceKind::BishopLight | PieceKind::BishopDark => {
                    let maker = if piece.class() == PieceClass::RookCastle {
                        Maker::CastleRook
                    } else {
                        Maker::Slider
                    };
                    let mut dirs = piece.slider_dirs() & !axis & self.pin_mask(sq);
                    while dirs != 0 {
                        let bit = dirs & dirs.wrapping_neg();
                        dirs ^= bit;
                        let len = ray_len(sq, bit);
                        let delta = step(bit);
                        let mut to = sq;
                        for _ in 0..len {
                            to = to.offset(delta);
                            if board.cells[to.0 as usize].piece.is_occupied() {
                                break;
                            }
                            self.emit_check(sq, to, maker, piece.exchange_class(), true);
                        }
                    }
                }
                PieceKind::Pawn | PieceKind::PawnStart => {
                    if axis & (NORTH | SOUTH) != 0 {
                        continue; // a push along the axis uncovers nothing
                    }
                    if self.pin_mask(sq) & pawn_push_dir(self.us) == 0 {
                        continue;
                    }
                    let delta = pawn_push_step(self.us);
                    let to = sq.offset(delta);
                    if board.cells[to.0 as usize].piece.is_empty() {
                        self.emit_check(sq, to, Maker::PawnPush, ExchangeClass::Pawn, false);
                        if piece.kind() == PieceKind::PawnStart {
                            let to2 = to.offset(delta);
                            if board.cells[to2.0 as usize].piece.is_empty() {
                                self.emit_check(sq, to2, Maker::PawnDouble, ExchangeClass::Pawn, false);
                            }
                        }
                    }
                }
                PieceKind::PawnPromo => {}
            }
        }

        // Direct slider checks: walk the open rays from the enemy king and
        // pull our compatible sliders onto them.
        let mut e_bits = king_mask(xking);
        while e_bits != 0 {
            let e = e_bits & e_bits.wrapping_neg();
            e_bits ^= e;
            let len = ray_len(xking, e);
            let delta = step(e);
            let mut t = xking;
            for _ in 0..len {
                t = t.offset(delta);
                if board.cells[t.0 as usize].piece.is_occupied() {
                    break;
                }
                // Our sliders able to quietly reach t and check along e.
                let att = f.active.attacks_on(t) & ALL_DIRS;
                let mut dir_bits = att;
                while dir_bits != 0 {
                    let d = dir_bits & dir_bits.wrapping_neg();
                    dir_bits ^= d;
                    if d == e || d == opposite(e) {
                        continue; // already on the king's ray
                    }
                    let s = first_piece_along(&board.cells, t, opposite(d));
                    let piece = board.cells[s.0 as usize].piece;
                    if piece.is_empty()
                        || piece.player_lossy() != self.us
                        || piece.slider_dirs() & d == 0
                        || piece.slider_dirs() & e == 0
                    {
                        continue;
                    }
                    if piece.is_king() || piece.is_pawn() {
                        continue;
                    }
                    let axis = self.discovery_axis(s, xking);
                    if axis != 0 && axis & d == 0 {
                        continue; // already emitted as a discovered check
                    }
                    if self.pin_mask(s) & d == 0 {
                        continue;
                    }
                    let maker = if piece.class() == PieceClass::RookCastle {
                        Maker::CastleRook
                    } else {
                        Maker::Slider
                    };
                    self.emit_check(s, t, maker, piece.exchange_class(), true);
                }

                // Pawn pushes onto t checking along e.
                if sq2sq(t, xking) & KING_RING != 0
                    && sq2sq(t, xking) & pawn_capture_dirs(self.us) != 0
                {
                    let push = pawn_push_step(self.us);
                    let from1 = t.offset(-push);
                    if from1.is_okay() {
                        let p1 = board.cells[from1.0 as usize].piece;
                        if p1.is_pawn()
                            && p1.player_lossy() == self.us
                            && p1.kind() != PieceKind::PawnPromo
                        {
                            if self.discovery_axis(from1, xking) == 0
                                && self.pin_mask(from1) & pawn_push_dir(self.us) != 0
                            {
                                self.emit_check(from1, t, Maker::PawnPush, ExchangeClass::Pawn, false);
                            }
                        } else if p1.is_empty() {
                            let from2 = t.offset(-2 * push);
                            if from2.is_okay() {
                                let p2 = board.cells[from2.0 as usize].piece;
                                if p2 == Piece::make(self.us, PieceKind::PawnStart)
                                    && self.discovery_axis(from2, xking) == 0
                                    && self.pin_mask(from2) & pawn_push_dir(self.us) != 0
                                {
                                    self.emit_check(
                                        from2,
                                        t,
                                        Maker::PawnDouble,
                                        ExchangeClass::Pawn,
                                        false,
                                    );
                                }
                            }
                        }
                    }
                }
            }
        }

        // Direct knight checks, off the precomputed check-jump masks.
        for i in 1..f.active.nr_pieces as usize {
            let sq = f.active.pieces[i];
            if !board.cells[sq.0 as usize].piece.is_knight() {
                break;
            }
            if self.discovery_axis(sq, xking) != 0 {
                continue; // all jumps already emitted as discoveries
            }
            if self.pin_mask(sq) != ALL_DIRS {
                continue;
            }
            let mut m = knight_checks(xking, sq) & knight_mask(sq);
            while m != 0 {
                let j = m.trailing_zeros() as usize;
                m &= m - 1;
                let to = sq.offset(KNIGHT_JUMP[j]);
                if board.cells[to.0 as usize].piece.is_empty() {
                    self.emit_check(sq, to, Maker::Knight, ExchangeClass::Minor, true);
                }
            }
        }
    }
}
