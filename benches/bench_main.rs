extern crate criterion;
extern crate rampart;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rampart::board::fen;
use rampart::board::perft::perft;
use rampart::Board;

fn bench_movegen(c: &mut Criterion) {
    let boards: Vec<Board> = fen::ALL_FENS
        .iter()
        .map(|f| Board::from_fen(f).unwrap())
        .collect();
    c.bench_function("movegen all standard positions", |b| {
        b.iter(|| {
            let mut count = 0usize;
            for board in boards.iter() {
                count += board.generate_moves().len();
            }
            black_box(count)
        })
    });
}

fn bench_make_undo(c: &mut Criterion) {
    let board =
        Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 10")
            .unwrap();
    let moves = board.generate_moves();
    c.bench_function("make undo kiwipete", |b| {
        b.iter(|| {
            let mut pos = board.clone();
            for mv in moves.iter() {
                pos.make(*mv);
                pos.undo();
            }
            black_box(pos.hash())
        })
    });
}

fn bench_perft(c: &mut Criterion) {
    let board = Board::start_pos();
    c.bench_function("perft 3 start position", |b| {
        b.iter(|| black_box(perft(&board, 3)))
    });
}

fn bench_fen(c: &mut Criterion) {
    c.bench_function("fen parse and emit", |b| {
        b.iter(|| {
            for f in fen::ALL_FENS.iter() {
                let board = Board::from_fen(f).unwrap();
                black_box(board.fen());
            }
        })
    });
}

criterion_group!(benches, bench_movegen, bench_make_undo, bench_perft, bench_fen);
criterion_main!(benches);
