use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use dark_forest_sim::{build_app_with_config, build_ship, run_round, GalaxyConfig, ShipType};

fn bench_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("round");

    for civilizations in [2u32, 4, 8, 16] {
        group.bench_with_input(
            BenchmarkId::new("civilizations", civilizations),
            &civilizations,
            |b, &civilizations| {
                b.iter_batched(
                    || {
                        let mut config = GalaxyConfig::default();
                        config.grid.width = 40;
                        config.grid.height = 40;
                        config.civilizations.human_count = civilizations / 2;
                        config.civilizations.ai_count = civilizations - civilizations / 2;
                        let mut app =
                            build_app_with_config(config).expect("benchmark galaxy builds");
                        let ids = app
                            .world
                            .resource::<dark_forest_sim::CivilizationRegistry>()
                            .ids();
                        for id in ids {
                            let _ = build_ship(&mut app.world, id, ShipType::Exploration);
                        }
                        app
                    },
                    |mut app| {
                        for _ in 0..5 {
                            run_round(&mut app).expect("round resolves");
                        }
                    },
                    BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

criterion_group!(round_benches, bench_round);
criterion_main!(round_benches);
