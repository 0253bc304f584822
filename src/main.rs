use std::env;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use specreg::{
    signals, DecompositionCache, ExperimentConfig, ExperimentSummary, ExperimentWorkflow,
    OperatorBuilder, OperatorWriter, PreparedOperator, SweepConfig,
};

const RESULTS_DIR: &str = "results";
const DATA_DIR: &str = "data";

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

fn parse_args(config: &ExperimentConfig) -> Result<Vec<String>> {
    let mut args = env::args().skip(1);
    let level = args.next();
    if let Some(extra) = args.next() {
        anyhow::bail!("Unexpected extra argument: {extra}");
    }

    match level.as_deref() {
        None | Some("all") => Ok(config.level_names()),
        Some(name) => {
            if config.sigma_for(name).is_none() {
                anyhow::bail!(
                    "Unknown noise level '{}' (known: {})",
                    name,
                    config.level_names().join(", ")
                );
            }
            Ok(vec![name.to_string()])
        }
    }
}

fn main() -> Result<()> {
    init_logging();
    let config = ExperimentConfig::default();
    let sweep = SweepConfig::default();
    let levels = parse_args(&config)?;

    info!(
        "Building blur operator: n {}, sigma {}, radius {}",
        config.n_samples, config.blur_sigma, config.kernel_radius
    );
    let operator = OperatorBuilder::blur(config.n_samples, config.blur_sigma, config.kernel_radius)
        .context("build blur operator")?;
    save_operator_and_signals(&config, &operator)?;

    let prepared = PreparedOperator::with_cache(operator, DecompositionCache::default());
    let t = signals::sample_times(config.n_samples);
    let x_true = signals::sinusoid(&t);

    let workflow = ExperimentWorkflow::new(config, sweep, prepared, x_true);

    for level in &levels {
        info!("Level {}: trial start", level);
        let summary = workflow
            .run_level(level)
            .with_context(|| format!("run noise level '{level}'"))?;
        info!(
            "Level {}: decompose {:?}, sweep {:?}",
            level, summary.decompose_duration, summary.sweep_duration
        );
        write_summary(&summary)?;
    }

    info!("All trials completed");
    Ok(())
}

fn save_operator_and_signals(
    config: &ExperimentConfig,
    operator: &specreg::ForwardOperator,
) -> Result<()> {
    let operator_dir = Path::new(DATA_DIR).join("operators");
    fs::create_dir_all(&operator_dir)
        .with_context(|| format!("create operator directory {:?}", operator_dir))?;
    OperatorWriter::write_to_path(operator, &operator_dir.join("blur_operator.json"))?;

    let signal_dir = Path::new(DATA_DIR).join("signals");
    fs::create_dir_all(&signal_dir)
        .with_context(|| format!("create signal directory {:?}", signal_dir))?;
    let t = signals::sample_times(config.n_samples);
    write_signal(&signal_dir.join("signal_sine.json"), &signals::sinusoid(&t))?;
    write_signal(
        &signal_dir.join("signal_multisine.json"),
        &signals::multisine(&t, &[(2.0, 1.0), (5.0, 0.6), (9.0, 0.3)]),
    )?;
    write_signal(
        &signal_dir.join("signal_piecewise.json"),
        &signals::piecewise(&t),
    )?;
    Ok(())
}

fn write_signal(path: &PathBuf, signal: &nalgebra::DVector<f64>) -> Result<()> {
    let values: Vec<f64> = signal.iter().copied().collect();
    let file = File::create(path).with_context(|| format!("create signal file {:?}", path))?;
    serde_json::to_writer(BufWriter::new(file), &values)
        .with_context(|| format!("serialize signal file {:?}", path))
}

fn write_summary(summary: &ExperimentSummary) -> Result<()> {
    let metrics_dir = Path::new(RESULTS_DIR).join("metrics");
    fs::create_dir_all(&metrics_dir)
        .with_context(|| format!("create metrics directory {:?}", metrics_dir))?;
    let path = metrics_dir.join(format!("summary_{}.json", summary.noise_level));
    let file = File::create(&path).with_context(|| format!("create summary file {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)
        .with_context(|| format!("serialize summary file {:?}", path))?;
    info!("Wrote summary to {:?}", path);
    Ok(())
}
