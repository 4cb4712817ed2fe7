use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use hunt_kill_mazes::{
    generators,
    generators::{HuntAndKill, RandomChooser},
    grid::Maze,
    units::{Height, Width},
};

fn walled_maze(size: usize) -> Maze {
    Maze::new(Height(size), Width(size)).unwrap()
}

fn bench_hunt_and_kill_maze_32(c: &mut Criterion) {
    let m = walled_maze(32);
    c.bench_function("hunt_and_kill_maze_32", move |b| {
        b.iter_batched(|| m.clone(),
                       |mut m| generators::hunt_and_kill(&mut m),
                       BatchSize::SmallInput)
    });
}

fn bench_hunt_and_kill_maze_32_seeded(c: &mut Criterion) {
    let m = walled_maze(32);
    c.bench_function("hunt_and_kill_maze_32_seeded", move |b| {
        b.iter_batched(|| m.clone(),
                       |mut m| generators::hunt_and_kill_seeded(&mut m, 42),
                       BatchSize::SmallInput)
    });
}

fn bench_hunt_and_kill_maze_128(c: &mut Criterion) {
    let m = walled_maze(128);
    c.bench_function("hunt_and_kill_maze_128", move |b| {
        b.iter_batched(|| m.clone(),
                       |mut m| {
                           HuntAndKill::with_chooser(&mut m, RandomChooser::from_seed_u64(7))
                               .generate()
                       },
                       BatchSize::LargeInput)
    });
}

criterion_group!(
    benches,
    bench_hunt_and_kill_maze_32,
    bench_hunt_and_kill_maze_32_seeded,
    bench_hunt_and_kill_maze_128
);
criterion_main!(benches);
