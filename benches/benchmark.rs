// Latency benchmarks for the three prediction paths
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use startflow_core::{StandardScaler, TfidfVectorizer};
use startflow_models::corpus::COMPANIES;
use startflow_models::{Services, SpendFeatures, StartupFeatures};

fn startup_features() -> StartupFeatures {
    StartupFeatures {
        funding_total_usd: 2_500_000.0,
        milestones: 6.0,
        has_vc: 1.0,
        has_round_a: 1.0,
        avg_participants: 3.5,
        is_ny: 1.0,
        age_first_funding_years: 2.0,
        ..StartupFeatures::default()
    }
}

fn benchmark_recommend(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let services = Services::new(dir.path()).unwrap();
    let mut group = c.benchmark_group("recommend");

    for query in ["Fintech", "real estate developer in cairo", "zzz"] {
        group.bench_with_input(BenchmarkId::new("query", query), &query, |b, query| {
            b.iter(|| black_box(services.recommend(black_box(query), 6)));
        });
    }

    group.bench_function("fit_vectorizer", |b| {
        let texts: Vec<String> = COMPANIES.iter().map(|c| c.combined_text()).collect();
        b.iter(|| {
            let mut vectorizer = TfidfVectorizer::new().with_english_stop_words();
            black_box(vectorizer.fit_transform(&texts).unwrap())
        });
    });

    group.finish();
}

fn benchmark_predict(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let services = Services::new(dir.path()).unwrap();
    services.warm_up().unwrap();

    let mut group = c.benchmark_group("predict");
    let startup = startup_features();
    group.bench_function("startup_success", |b| {
        b.iter(|| black_box(services.predict_success(black_box(&startup))));
    });

    let spend = SpendFeatures::new(500_000.0, 200_000.0, 300_000.0);
    group.bench_function("profit", |b| {
        b.iter(|| black_box(services.predict_profit(black_box(&spend))));
    });
    group.bench_function("spending_insights", |b| {
        b.iter(|| black_box(services.spending_insights(black_box(&spend))));
    });

    group.finish();
}

fn benchmark_scaler(c: &mut Criterion) {
    let rows: Vec<Vec<f64>> = (0..1000)
        .map(|i| (0..15).map(|j| ((i * 31 + j * 7) % 97) as f64).collect())
        .collect();

    c.bench_function("scaler_fit_1000x15", |b| {
        b.iter(|| {
            let mut scaler = StandardScaler::new();
            scaler.fit(black_box(&rows)).unwrap();
            black_box(scaler)
        });
    });
}

criterion_group!(benches, benchmark_recommend, benchmark_predict, benchmark_scaler);
criterion_main!(benches);
