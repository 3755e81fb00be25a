use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nightmare_maze::{MazeConfig, MazeGenerator, Seed, TraversalConfig, TraversalEngine, TraversalPhase, FRAME_RATE};

fn maze(phrase: &str) -> MazeGenerator {
    let seed = Seed::normalize(phrase).unwrap();
    MazeGenerator::from_seed(&seed, MazeConfig::default())
}

fn bench_seed_normalize(c: &mut Criterion) {
    c.bench_function("seed_normalize", |b| {
        b.iter(|| Seed::normalize(black_box("  Red   CLOWN laugh ")))
    });
}

fn bench_generate_root(c: &mut Criterion) {
    c.bench_function("generate_root", |b| {
        b.iter(|| {
            let mut maze = maze(black_box("night maze ghost"));
            let root = maze.root();
            maze.cell_at(root).map(|cell| cell.corridors.len())
        })
    });
}

fn bench_generate_1k_cells_bfs(c: &mut Criterion) {
    c.bench_function("generate_1k_cells_bfs", |b| {
        b.iter(|| {
            let mut maze = maze(black_box("red clown laugh"));
            let mut frontier = std::collections::VecDeque::from([maze.root()]);
            while let Some(id) = frontier.pop_front() {
                if maze.generated_count() >= 1_000 {
                    break;
                }
                if let Ok(cell) = maze.cell_at(id) {
                    frontier.extend(cell.corridors.iter().map(|c| c.to));
                }
            }
            maze.generated_count()
        })
    });
}

fn bench_lever_run_60s(c: &mut Criterion) {
    c.bench_function("lever_run_60s", |b| {
        b.iter(|| {
            let mut engine = TraversalEngine::new(maze("ghost shadow night"), TraversalConfig::default());
            for frame in 0..(FRAME_RATE * 60) as usize {
                if engine.is_terminal() {
                    break;
                }
                if engine.phase() == TraversalPhase::AtFork {
                    if let Some(pick) = engine.next_passable_choice(frame) {
                        let _ = engine.choose_fork(pick);
                    }
                }
                let _ = engine.integrate_lever(black_box(1.0), 1.0 / 60.0);
            }
            engine.compute_hash()
        })
    });
}

criterion_group!(
    benches,
    bench_seed_normalize,
    bench_generate_root,
    bench_generate_1k_cells_bfs,
    bench_lever_run_60s,
);
criterion_main!(benches);
