//! Report rendering
//!
//! Presentation only; the core never depends on a particular layout. Text
//! mirrors the result files the benchmark has historically produced, CSV
//! carries the per-run table for spreadsheets, JSON is the full structure.

use std::io::{self, Write};

use super::types::BenchmarkReport;

/// Human-readable byte size, 1024-based
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.2} {}", UNITS[unit])
}

/// Seconds as "1.23s", "2m 3.45s" or "1h 2m 3.45s"
pub fn format_time(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{seconds:.3}s")
    } else if seconds < 3600.0 {
        format!("{}m {:.2}s", (seconds / 60.0) as u64, seconds % 60.0)
    } else {
        format!(
            "{}h {}m {:.2}s",
            (seconds / 3600.0) as u64,
            ((seconds % 3600.0) / 60.0) as u64,
            seconds % 60.0
        )
    }
}

pub fn render_text(report: &BenchmarkReport, out: &mut dyn Write) -> io::Result<()> {
    let rule = "-".repeat(80);
    writeln!(out, "Adaptive Compression Benchmark Results")?;
    writeln!(out, "{}", "=".repeat(80))?;
    writeln!(
        out,
        "Date: {}",
        report.session.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out, "Compression algorithm: {}", report.session.algorithm)?;
    match report.session.compression_level {
        Some(level) => writeln!(out, "Compression level: {level}")?,
        None => writeln!(out, "Compression: DISABLED")?,
    }
    if let Some(rationale) = &report.session.strategy_rationale {
        writeln!(out, "Strategy rationale: {rationale}")?;
    }
    writeln!(
        out,
        "Buffer size: {}",
        format_size(report.session.buffer_size as u64)
    )?;
    writeln!(out, "Test runs: {}", report.session.test_runs)?;
    writeln!(out, "Files tested: {}", report.session.files.join(", "))?;
    writeln!(out)?;

    if let Some(probe) = &report.session.probe {
        writeln!(out, "Network Speed Test Results:")?;
        writeln!(out, "{rule}")?;
        writeln!(
            out,
            "Sample size: {}",
            format_size(probe.sample_size_bytes)
        )?;
        writeln!(out, "Upload speed:   {:.2} MB/s", probe.upload_mbps)?;
        writeln!(out, "Download speed: {:.2} MB/s", probe.download_mbps)?;
        writeln!(out, "Average speed:  {:.2} MB/s", probe.average_mbps())?;
        writeln!(out, "Average latency: {:.0} ms", probe.latency_ms)?;
        writeln!(out)?;
    }

    let agg = &report.aggregate;
    writeln!(out, "Aggregate Statistics:")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "Successful runs: {}", agg.successful_runs)?;
    writeln!(
        out,
        "Failed runs: {} (transfer: {}, verification: {}, codec: {})",
        report.failures.total(),
        report.failures.transfer,
        report.failures.verification,
        report.failures.codec
    )?;
    writeln!(
        out,
        "Total compression time:   {}",
        format_time(agg.total_compress_time_s)
    )?;
    writeln!(
        out,
        "Total upload time:        {}",
        format_time(agg.total_upload_time_s)
    )?;
    writeln!(
        out,
        "Total download time:      {}",
        format_time(agg.total_download_time_s)
    )?;
    writeln!(
        out,
        "Total decompression time: {}",
        format_time(agg.total_decompress_time_s)
    )?;
    writeln!(
        out,
        "Average upload:   {} wire {:.2} MB/s, effective {:.2} MB/s",
        format_time(agg.avg_upload_time_s),
        agg.avg_wire_upload_mbps,
        agg.avg_effective_upload_mbps
    )?;
    writeln!(
        out,
        "Average download: {} wire {:.2} MB/s, effective {:.2} MB/s",
        format_time(agg.avg_download_time_s),
        agg.avg_wire_download_mbps,
        agg.avg_effective_download_mbps
    )?;
    writeln!(
        out,
        "Average compression ratio: {:.1}%",
        agg.avg_compression_ratio * 100.0
    )?;
    writeln!(out)?;

    writeln!(out, "Per-File Statistics:")?;
    writeln!(out, "{rule}")?;
    for file in &report.per_file {
        writeln!(out, "File: {}", file.filename)?;
        writeln!(out, "  Runs: {}", file.runs)?;
        writeln!(
            out,
            "  Original size: {}",
            format_size(file.avg_original_size_bytes)
        )?;
        writeln!(
            out,
            "  Avg transfer size: {}",
            format_size(file.avg_transfer_size_bytes)
        )?;
        writeln!(
            out,
            "  Avg compression ratio: {:.1}%",
            file.avg_compression_ratio * 100.0
        )?;
        writeln!(
            out,
            "  Avg upload: {} (wire {:.2} MB/s, effective {:.2} MB/s)",
            format_time(file.avg_upload_time_s),
            file.avg_wire_upload_mbps,
            file.avg_effective_upload_mbps
        )?;
        writeln!(
            out,
            "  Avg download: {} (wire {:.2} MB/s, effective {:.2} MB/s)",
            format_time(file.avg_download_time_s),
            file.avg_wire_download_mbps,
            file.avg_effective_download_mbps
        )?;
        writeln!(out)?;
    }

    writeln!(out, "Detailed Results:")?;
    writeln!(out, "{rule}")?;
    writeln!(
        out,
        "Run | File                 | Size       | Transfer   | Upload   | Download | Ratio"
    )?;
    writeln!(out, "{rule}")?;
    for run in &report.runs {
        writeln!(
            out,
            "{:3} | {:<20} | {:>10} | {:>10} | {:>7.3}s | {:>7.3}s | {:>5.1}%",
            run.run_index,
            truncate(&run.filename, 20),
            format_size(run.original_size_bytes),
            format_size(run.transfer_size_bytes),
            run.upload_time_s,
            run.download_time_s,
            run.compression_ratio() * 100.0
        )?;
    }
    Ok(())
}

pub fn render_csv(report: &BenchmarkReport, out: impl Write) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "run",
        "filename",
        "original_size_bytes",
        "transfer_size_bytes",
        "compress_time_s",
        "upload_time_s",
        "download_time_s",
        "decompress_time_s",
        "compression_ratio",
        "wire_upload_mbps",
        "effective_upload_mbps",
        "wire_download_mbps",
        "effective_download_mbps",
        "verified",
    ])?;
    for run in &report.runs {
        writer.write_record([
            run.run_index.to_string(),
            run.filename.clone(),
            run.original_size_bytes.to_string(),
            run.transfer_size_bytes.to_string(),
            format!("{:.6}", run.compress_time_s),
            format!("{:.6}", run.upload_time_s),
            format!("{:.6}", run.download_time_s),
            format!("{:.6}", run.decompress_time_s),
            format!("{:.6}", run.compression_ratio()),
            format!("{:.3}", run.wire_upload_mbps()),
            format!("{:.3}", run.effective_upload_mbps()),
            format!("{:.3}", run.wire_download_mbps()),
            format!("{:.3}", run.effective_download_mbps()),
            run.verified.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn render_json(report: &BenchmarkReport, out: impl Write) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(out, report)
}

fn truncate(s: &str, len: usize) -> String {
    if s.chars().count() > len {
        let head: String = s.chars().take(len.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        s.to_owned()
    }
}
