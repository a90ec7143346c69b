use std::hint::black_box;
use std::time::Duration;

use arima_rs::arma::fit_arma;
use arima_rs::arma::EstimationMethod;
use arima_rs::arma::EstimatorConfig;
use arima_rs::arma::LagStructure;
use arima_rs::model::Arima;
use arima_rs::model::ArimaConfig;
use arima_rs::series::Series;
use arima_rs::simulate::ArmaProcess;
use arima_rs::traits::ModelExt;
use arima_rs::traits::ProcessExt;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;

fn bench_fit(c: &mut Criterion) {
  let mut group = c.benchmark_group("Fit");
  group.measurement_time(Duration::from_secs(3));
  group.warm_up_time(Duration::from_millis(500));

  for &n in &[500usize, 5_000usize] {
    let x = ArmaProcess::new(vec![0.5, -0.2], vec![0.4], 1.0, n, Some(7)).sample();
    let w = x.to_vec();
    let lags = LagStructure::new(2, 1);

    group.bench_with_input(BenchmarkId::new("arma/hannan_rissanen", n), &n, |b, _| {
      let cfg = EstimatorConfig::default();
      b.iter(|| black_box(fit_arma(&w, &lags, None, &cfg).ok()));
    });

    group.bench_with_input(BenchmarkId::new("arma/css", n), &n, |b, _| {
      let cfg = EstimatorConfig {
        method: EstimationMethod::ConditionalSumOfSquares,
        ..EstimatorConfig::default()
      };
      b.iter(|| black_box(fit_arma(&w, &lags, None, &cfg).ok()));
    });

    group.bench_with_input(BenchmarkId::new("arima/auto", n), &n, |b, _| {
      b.iter(|| {
        let series = Series::new(w.clone()).ok()?;
        let mut model = Arima::new(series, ArimaConfig::arima()).ok()?;
        black_box(model.fit().ok())
      });
    });
  }

  group.finish();
}

criterion_group!(benches, bench_fit);
criterion_main!(benches);
