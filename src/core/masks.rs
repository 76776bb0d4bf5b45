//! Constants of the board geometry and the attack-word bit layout.

/// Number of squares on a chessboard.
pub const SQ_CNT: usize = 64;
/// Number of players.
pub const PLAYER_CNT: usize = 2;
/// Number of files.
pub const FILE_CNT: usize = 8;
/// Number of ranks.
pub const RANK_CNT: usize = 8;
/// Number of distinct piece tags, the empty tag included.
pub const PIECE_TAG_CNT: usize = 23;
/// Maximum pieces per side, plus the list terminator.
pub const PIECE_LIST_CNT: usize = 17;

/// An attack word is a 16-bit tally of one side's attacks on one square:
///
/// ```md,ignore
/// bits  0 -  7: sliding rays, one bit per compass direction (N first)
/// bit        8: king ring
/// bit        9: a pawn attacks from the adjacent west file
/// bit       10: a pawn attacks from the adjacent east file
/// bits 11 - 14: number of attacking knights
/// ```
/// King-ring bit of an attack word.
pub const KING_RING: u16 = 0x0100;
/// Pawn-attack-from-west bit of an attack word.
pub const PAWN_WEST: u16 = 0x0200;
/// Pawn-attack-from-east bit of an attack word.
pub const PAWN_EAST: u16 = 0x0400;
/// Both pawn-attack bits.
pub const PAWN_BITS: u16 = PAWN_WEST | PAWN_EAST;
/// One knight attacker, as an addend to the knight-count field.
pub const KNIGHT_UNIT: u16 = 0x0800;
/// The whole knight-count field.
pub const KNIGHT_FIELD: u16 = 0x7800;

/// Promotion-encoding flags in the high nibble of a `sq2sq` relation word,
/// one per promotion piece.
pub const PROMO_KNIGHT_FLAG: u16 = 0x1000;
pub const PROMO_BISHOP_FLAG: u16 = 0x2000;
pub const PROMO_ROOK_FLAG: u16 = 0x4000;
pub const PROMO_QUEEN_FLAG: u16 = 0x8000;
/// All four promotion-encoding flags.
pub const PROMO_FLAGS: u16 = 0xF000;

/// Characters for each file, index from 0.
pub const FILE_DISPLAYS: [char; FILE_CNT] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];

/// Characters for each rank, index from 0.
pub const RANK_DISPLAYS: [char; RANK_CNT] = ['1', '2', '3', '4', '5', '6', '7', '8'];
