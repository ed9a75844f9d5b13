use case_outcome::training::{Classifier, HyperParams, ModelKind, ModelSpec};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// One-hot style features plus an age column; three classes keyed on age
fn create_case_data(n_rows: usize, n_indicators: usize) -> (Array2<f64>, Array1<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let x = Array2::from_shape_fn((n_rows, n_indicators + 1), |(_, j)| {
        if j == 0 {
            rng.gen_range(0.0..90.0)
        } else if rng.gen_bool(0.2) {
            1.0
        } else {
            0.0
        }
    });
    let y = x.column(0).mapv(|age| {
        if age >= 75.0 {
            0.0
        } else if age >= 50.0 {
            1.0
        } else {
            2.0
        }
    });

    (x, y)
}

fn specs() -> Vec<ModelSpec> {
    vec![
        ModelSpec::new(ModelKind::DecisionTree).with_params(HyperParams::new().with("max_depth", 5i64)),
        ModelSpec::new(ModelKind::RandomForest)
            .with_params(HyperParams::new().with("n_estimators", 10i64).with("random_state", 0i64)),
        ModelSpec::new(ModelKind::AdaBoost).with_params(
            HyperParams::new()
                .with("n_estimators", 20i64)
                .with("learning_rate", 0.8)
                .with("random_state", 0i64),
        ),
    ]
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10); // Fewer samples for training benchmarks

    for n_rows in [1000, 5000].iter() {
        let data = create_case_data(*n_rows, 30);

        for spec in specs() {
            group.bench_with_input(
                BenchmarkId::new(spec.kind.as_str(), n_rows),
                &data,
                |b, (x, y)| {
                    b.iter(|| {
                        let mut model = spec.build().unwrap();
                        model.fit(black_box(x), black_box(y)).unwrap();
                        model
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    // Train models once
    let (train_x, train_y) = create_case_data(5000, 30);
    let models: Vec<_> = specs()
        .into_iter()
        .map(|spec| {
            let mut model = spec.build().unwrap();
            model.fit(&train_x, &train_y).unwrap();
            model
        })
        .collect();

    for n_rows in [100, 1000, 10000].iter() {
        let (test_x, _) = create_case_data(*n_rows, 30);

        for model in &models {
            group.bench_with_input(
                BenchmarkId::new(model.kind().as_str(), n_rows),
                &test_x,
                |b, x| b.iter(|| model.predict(black_box(x)).unwrap()),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_training, bench_prediction);
criterion_main!(benches);
