use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use respnorm::input::{self, Batch, InputFormat, Source};
use respnorm::models::ResourceKind;
use respnorm::output;
use respnorm::pipeline::{self, BatchReport};
use respnorm::{InterceptorChain, NormalizerConfig, PairPolicy, TimeTransformer};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Rewrites epoch-second timestamp fields in recorded API responses into dates.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// How the input is laid out
    #[arg(short, long, value_enum, default_value = "json")]
    format: InputFormat,

    #[arg(short, long, default_value = "stdout")]
    output: String,

    /// Input file, or `-` for stdin
    #[arg(value_name = "FILE")]
    file: String,

    /// Lines per batch for line-oriented formats
    #[arg(long, default_value = "100000")]
    batch_size: usize,

    /// JSON config file; flags below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    pair_policy: Option<PairPolicy>,

    /// Fail records whose timestamp fields are not epoch seconds
    #[arg(long)]
    strict: bool,

    /// Check each normalized body decodes as this resource
    #[arg(long, value_enum)]
    schema: Option<ResourceKind>,

    #[arg(long)]
    benchmark: bool,
}

impl Args {
    fn normalizer_config(&self) -> Result<NormalizerConfig> {
        let mut config = match &self.config {
            Some(path) => NormalizerConfig::load(path)?,
            None => NormalizerConfig::default(),
        };
        if let Some(policy) = self.pair_policy {
            config = config.with_pair_policy(policy);
        }
        if self.strict {
            config = config.with_strict(true);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.normalizer_config()?;
    info!(?config, format = ?args.format, "starting");

    let start_time = Instant::now();
    let source = Source::open(&args.file)?;
    let batches = input::split_batches(&source, args.format, args.batch_size);

    let chain = InterceptorChain::new().with(TimeTransformer::new(config));

    // channel for sending normalized batches to writer
    let (tx, rx) = crossbeam::channel::unbounded::<Vec<respnorm::Node>>();

    let mut writer = output::create_writer(&args.output)?;
    let writer_handle = std::thread::spawn(move || -> Result<()> {
        for batch in rx {
            writer.write_batch(&batch)?;
        }
        writer.finish()
    });

    let process = |batch: &Batch<'_>| -> BatchReport {
        let (out, report) = pipeline::process_batch(args.format, args.schema, &chain, *batch);
        // a closed channel means the writer already failed; its error surfaces on join
        let _ = tx.send(out);
        report
    };

    #[cfg(feature = "parallel")]
    let report = batches
        .par_iter()
        .map(process)
        .reduce(BatchReport::default, BatchReport::merge);

    #[cfg(not(feature = "parallel"))]
    let report = batches
        .iter()
        .map(process)
        .fold(BatchReport::default(), BatchReport::merge);

    // close channel so writer thread can finish
    drop(tx);
    writer_handle
        .join()
        .map_err(|_| anyhow!("writer thread panicked"))?
        .context("writing output")?;

    info!(
        records = report.records,
        converted = report.converted,
        failures = report.failures,
        "done"
    );

    if args.benchmark {
        print_benchmark_results(source.len() as u64, &report, start_time.elapsed());
    }

    if report.failures > 0 {
        bail!("{} record(s) failed", report.failures);
    }
    Ok(())
}

fn print_benchmark_results(input_size: u64, report: &BatchReport, duration: std::time::Duration) {
    let duration_secs = duration.as_secs_f64();
    let input_size_mb = input_size as f64 / (1024.0 * 1024.0);

    eprintln!("\n=== BENCHMARK RESULTS ===");
    eprintln!("Input size: {:.2} MB", input_size_mb);
    eprintln!("Records written: {}", report.records);
    eprintln!("Fields converted: {}", report.converted);
    eprintln!("Failed records: {}", report.failures);
    eprintln!("Processing time: {:.3}s", duration_secs);
    eprintln!("Throughput: {:.2} MB/s", input_size_mb / duration_secs);
    eprintln!("Throughput: {:.0} records/s", report.records as f64 / duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{ "pair_policy": "present-only", "strict": false }"#).unwrap();
        let config_path = file.path().to_str().unwrap();

        let args = Args::try_parse_from([
            "respnorm",
            "--config",
            config_path,
            "--strict",
            "-f",
            "jsonl",
            "bodies.jsonl",
        ])
        .unwrap();
        let config = args.normalizer_config().unwrap();

        assert_eq!(args.format, InputFormat::Jsonl);
        assert_eq!(config.pair_policy, PairPolicy::PresentOnly);
        assert!(config.strict);
    }

    #[test]
    fn defaults_need_only_a_file() {
        let args = Args::try_parse_from(["respnorm", "-"]).unwrap();
        assert_eq!(args.format, InputFormat::Json);
        assert_eq!(args.output, "stdout");
        assert_eq!(args.normalizer_config().unwrap(), NormalizerConfig::default());
    }
}
