use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

pub fn write_csv<W: Write>(writer: W, headers: &[String], rows: &[Vec<String>]) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record(headers)
        .context("failed to write csv header")?;

    for row in rows {
        writer
            .write_record(row)
            .context("failed to write csv record")?;
    }

    writer.flush().context("failed to flush csv output")?;
    Ok(rows.len())
}

pub fn export_rows_to_csv(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<usize> {
    if headers.is_empty() {
        anyhow::bail!("csv header is required")
    }

    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create csv: {}", path.display()))?;
    write_csv(file, headers, rows)
        .with_context(|| format!("failed to export csv: {}", path.display()))
}
