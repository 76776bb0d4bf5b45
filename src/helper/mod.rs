//! Statically initialized lookup tables: board geometry, Zobrist randoms,
//! and the cuckoo index of reversible moves.
//!
//! The tables are created on first use and never mutated afterwards. Prefer
//! going through [`prelude`] for access; `init_statics` exists to pay the
//! initialization cost at a chosen moment rather than on the first hot call.
//!
//! [`prelude`]: prelude/index.html

pub mod cuckoo;
pub mod geometry;
pub mod prelude;
pub mod zobrist;
