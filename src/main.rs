use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;

use amm_fee_optimizer::config;
use amm_fee_optimizer::ops;
use amm_fee_optimizer::pipeline::{ErrorResponse, Pipeline};
use amm_fee_optimizer::{Candle, FeeResult};
use serde::Deserialize;

/// Either a bare candle array or the `{ "candles": [...] }` body the price feed returns.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CandleInput {
    Bare(Vec<Candle>),
    Wrapped { candles: Vec<Candle> },
}

impl CandleInput {
    fn into_candles(self) -> Vec<Candle> {
        match self {
            Self::Bare(candles) | Self::Wrapped { candles } => candles,
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let config_path = parse_flag(&args, "--config");
    if let Err(err) = run(config_path, parse_flag(&args, "--path")) {
        tracing::error!(target: "boot", kind = err.kind(), error = %err, "evaluation failed");
        let body = ErrorResponse::from(&err);
        match serde_json::to_string(&body) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("{err}"),
        }
        std::process::exit(2);
    }
}

fn print_usage() {
    eprintln!(
        "Usage:\n  amm-fee-optimizer [--path ./candles.json] [--config ./fee.toml]\n\nReads one-minute OHLCV candles (JSON array or {{\"candles\": [...]}}) from --path or stdin\nand prints the feature vector, volatility estimate and dynamic fee as JSON.\nConfig: --config or AMMFEE_CONFIG_PATH (.toml/.json), then AMMFEE_* env vars."
    );
}

fn parse_flag(args: &[String], flag: &str) -> Option<PathBuf> {
    let mut i = 0usize;
    while i < args.len() {
        if args[i] == flag {
            if let Some(v) = args.get(i + 1) {
                return Some(PathBuf::from(v));
            }
        }
        i += 1;
    }
    None
}

fn run(config_path: Option<PathBuf>, path: Option<PathBuf>) -> FeeResult<()> {
    let cfg = match config_path {
        Some(p) => config::load_config_with(Some(&p))?,
        None => config::load_config()?,
    };
    ops::logging::init(&cfg.infra);

    let candles = read_candles(path)?;
    let pipeline = Pipeline::new(&cfg);
    let model = pipeline.estimator().config();
    tracing::info!(
        target: "boot",
        candles = candles.len(),
        curve = ?model.curve,
        static_fee = model.static_fee,
        "evaluating candle history"
    );

    let evaluation = pipeline.evaluate(&candles)?;
    println!("{}", serde_json::to_string_pretty(&evaluation)?);
    Ok(())
}

fn read_candles(path: Option<PathBuf>) -> FeeResult<Vec<Candle>> {
    let input: CandleInput = match path {
        Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            serde_json::from_str(&buf)?
        }
    };
    Ok(input.into_candles())
}
