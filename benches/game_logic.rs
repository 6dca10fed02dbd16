use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tile_cascade::core::grid::{Grid, Stamp, TileFactory};
use tile_cascade::core::{find_matches, find_possible_move, Game, GameConfig, SimpleRng};
use tile_cascade::types::Difficulty;

fn bench_generate(c: &mut Criterion) {
    let mut rng = SimpleRng::new(12345);
    let mut factory = TileFactory::new();

    c.bench_function("generate_grid", |b| {
        b.iter(|| Grid::generate(&mut rng, &mut factory, Stamp::default()))
    });
}

fn bench_find_matches(c: &mut Criterion) {
    let game = Game::new(GameConfig::new(Difficulty::Casual, 12345));

    c.bench_function("find_matches", |b| {
        b.iter(|| find_matches(black_box(game.grid())))
    });
}

fn bench_find_possible_move(c: &mut Criterion) {
    let game = Game::new(GameConfig::new(Difficulty::Casual, 12345));

    c.bench_function("find_possible_move", |b| {
        b.iter(|| find_possible_move(black_box(game.grid())))
    });
}

fn bench_swap_chain(c: &mut Criterion) {
    let template = Game::new(GameConfig::new(Difficulty::Casual, 12345));

    c.bench_function("swap_to_idle", |b| {
        b.iter(|| {
            let mut game = template.clone();
            if let Some(hint) = game.request_hint() {
                let _ = game.swap(hint.a, hint.b);
            }
            game.run_until_idle()
        })
    });
}

criterion_group!(
    benches,
    bench_generate,
    bench_find_matches,
    bench_find_possible_move,
    bench_swap_chain
);
criterion_main!(benches);
