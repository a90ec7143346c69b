use std::env;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use arima_rs::model::Arima;
use arima_rs::model::ArimaConfig;
use arima_rs::series::Series;
use arima_rs::traits::ModelExt;

fn main() -> Result<()> {
  let args: Vec<String> = env::args().collect();
  let Some(path) = args.get(1) else {
    bail!("usage: arima-rs <file> [horizon]");
  };
  let horizon = match args.get(2) {
    Some(h) => h.parse::<usize>().context("horizon must be a positive integer")?,
    None => 12,
  };

  let data = read_vector_from_file(path)?;
  println!("Processing {path} ({} observations)", data.len());

  let mut model = Arima::new(Series::new(data)?, ArimaConfig::arima())?;
  model.fit()?;
  println!("{}", model.summary()?);

  let lb = model.ljung_box(model.config().ljung_box)?;
  println!(
    "Ljung-Box Q = {:.4} (df {}, p = {:.4}), white noise: {}",
    lb.statistic, lb.df, lb.p_value, lb.white_noise
  );
  println!("RMSE: {:.6}", model.rmse(None, None)?);

  let forecast = model.forecast(horizon, None)?;
  for (h, v) in forecast.values.iter().enumerate() {
    println!("  t+{:<3} {v:.6}", h + 1);
  }

  Ok(())
}

fn read_vector_from_file(filename: &str) -> Result<Vec<f64>> {
  let file = File::open(filename).with_context(|| format!("cannot open {filename}"))?;
  let reader = BufReader::new(file);
  let mut data = Vec::new();

  for line in reader.lines() {
    let line = line?;
    let line = line.trim();
    if line.is_empty() {
      continue;
    }
    let value: f64 = line
      .parse()
      .with_context(|| format!("invalid number {line:?} in {filename}"))?;
    data.push(value);
  }

  Ok(data)
}
