//! A chess board library built on incrementally maintained attack tables.
//!
//! Instead of bitboards, `rampart` keeps, for both colors, a per-square
//! tally of *how* each square is attacked: one bit per sliding direction, a
//! king-ring bit, two pawn-capture bits and a knight counter. The tables
//! are updated through every move and undo with XOR ray toggles, which is
//! what lets the move generator emit only legal moves — pins, discovered
//! checks, castling-through-check and the en-passant corner cases are all
//! read straight off the tables — and lets every generated move carry a
//! static-exchange prescore.
//!
//! # Usage
//!
//! Create a [`Board`] with the starting position, generate legal moves,
//! apply and undo them:
//!
//! ```
//! use rampart::Board;
//!
//! let mut board = Board::start_pos();
//! let list = board.generate_moves();
//!
//! for mv in list.iter() {
//!     board.make(*mv);
//!     board.undo();
//! }
//! ```
//!
//! FEN strings are supported:
//!
//! ```
//! use rampart::Board;
//!
//! let board = Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
//! assert_eq!(board.fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
//! ```
//!
//! # Safety
//!
//! While generally a safe library, rampart was built with speed in mind.
//! Moves are only valid for the exact position that generated them, and a
//! board must not be shared across threads; clone it instead.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;

pub mod board;
pub mod core;
pub mod helper;

pub use crate::board::exchange::{exchange_cache_misses, reset_exchange_cache};
pub use crate::board::fen::FenBuildError;
pub use crate::board::perft::{perft, perft_all, perft_parallel, PerftNodes};
pub use crate::board::Board;
pub use crate::core::move_list::MoveList;
pub use crate::core::piece_move::{Maker, Move};
pub use crate::core::sq::SQ;
pub use crate::core::{File, Piece, PieceKind, Player, Rank};
pub use crate::helper::prelude::init_statics;
