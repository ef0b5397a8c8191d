//! Demo driver: runs a full benchmarking session against the in-memory
//! transport with generated test files, prints the text report and writes
//! CSV/JSON copies next to it.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rand::RngCore;

use storebench::copier::{CopyProgress, ProgressObserver};
use storebench::report::render;
use storebench::runner::{BenchConfig, BenchmarkRunner};
use storebench::transport::MemoryTransport;

const RESULTS_DIR: &str = "./bench_results";

/// Terminal progress bar behind the engine's observer seam
struct BarObserver {
    bar: Option<ProgressBar>,
}

impl BarObserver {
    fn new() -> Self {
        Self { bar: None }
    }
}

impl ProgressObserver for BarObserver {
    fn on_progress(&mut self, progress: &CopyProgress) {
        if progress.finished {
            if let Some(bar) = self.bar.take() {
                bar.finish_and_clear();
            }
            return;
        }
        let bar = self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(progress.total_bytes.unwrap_or(0));
            bar.set_style(
                ProgressStyle::with_template("{wide_bar} {bytes}/{total_bytes} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        });
        bar.set_position(progress.bytes_copied);
        bar.set_message(format!("{:.2} MB/s", progress.throughput_mbps));
    }
}

fn generate_test_file(dir: &std::path::Path, name: &str, size: usize) -> Result<PathBuf> {
    let path = dir.join(name);
    let mut data = vec![0u8; size];
    // Half random, half repetitive, so compression has something to work on
    rand::thread_rng().fill_bytes(&mut data[..size / 2]);
    std::fs::write(&path, &data).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storebench=info".into()),
        )
        .init();

    let config = BenchConfig {
        test_runs: 3,
        sample_size_mb: 1,
        samples: 2,
        ..Default::default()
    };

    let workdir = tempfile::tempdir().context("creating work directory")?;
    let files = vec![
        generate_test_file(workdir.path(), "small.dat", 1024 * 1024)?,
        generate_test_file(workdir.path(), "medium.dat", 8 * 1024 * 1024)?,
    ];

    let runner = BenchmarkRunner::new(MemoryTransport::new(), config);
    let mut observer = BarObserver::new();
    let report = runner.run_session(&files, &mut observer).await?;

    let mut stdout = std::io::stdout().lock();
    render::render_text(&report, &mut stdout)?;
    stdout.flush()?;

    std::fs::create_dir_all(RESULTS_DIR)?;
    let stamp = report.session.started_at.format("%Y-%m-%d_%H-%M-%S");
    let csv_path = format!("{RESULTS_DIR}/benchmark_{stamp}.csv");
    let json_path = format!("{RESULTS_DIR}/benchmark_{stamp}.json");
    render::render_csv(&report, std::fs::File::create(&csv_path)?)?;
    render::render_json(&report, std::fs::File::create(&json_path)?)?;
    println!("\nResults saved to {csv_path} and {json_path}");

    Ok(())
}
