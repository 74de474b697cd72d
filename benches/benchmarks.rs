use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use freqfit::dist::{Gumbel, KernelDensity};
use freqfit::{confidence_intervals, ContinuousDistribution, Estimable, EstimationMethod};

fn bench_quantile(c: &mut Criterion) {
    let d = Gumbel::new(100.0, 10.0);
    c.bench_function("gumbel_inverse_cdf", |b| {
        b.iter(|| d.inverse_cdf(black_box(0.99)).unwrap())
    });
}

fn bench_mle(c: &mut Criterion) {
    let truth = Gumbel::new(100.0, 10.0);
    let mut group = c.benchmark_group("gumbel_mle");
    for n in [100usize, 1000] {
        let sample = truth.random_values(n, 7).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &sample, |b, sample| {
            b.iter(|| {
                let mut fitted = Gumbel::default();
                fitted.fit_maximum_likelihood(black_box(sample)).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_kernel_density(c: &mut Criterion) {
    let source = Gumbel::new(100.0, 10.0);
    let sample = source.random_values(5000, 3).unwrap();
    let kde = KernelDensity::from_sample(&sample).unwrap();
    c.bench_function("kde_pdf_5000_points", |b| {
        b.iter(|| kde.pdf(black_box(105.0)).unwrap())
    });
}

fn bench_monte_carlo(c: &mut Criterion) {
    let fitted = Gumbel::new(100.0, 10.0);
    c.bench_function("monte_carlo_1000_realizations", |b| {
        b.iter(|| {
            confidence_intervals(
                &fitted,
                50,
                1000,
                black_box(&[0.1, 0.01]),
                &[0.05, 0.95],
                EstimationMethod::MaximumLikelihood,
                11,
            )
            .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_quantile,
    bench_mle,
    bench_kernel_density,
    bench_monte_carlo
);
criterion_main!(benches);
