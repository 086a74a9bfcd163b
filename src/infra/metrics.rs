// ============================================================
// Layer 6 — Summary Writer
// ============================================================
// Records every summary scalar the training loop produces to a
// CSV file in the checkpoint directory, one row per scalar:
//
//   step,tag,value
//   0,loss,5.012345
//   0,learning_rate,0.500000
//   0,checkpoint/perplexity,150.241000
//   0,eval/bucket_0/perplexity,171.880000
//
// `step` is the loop iteration the row was produced at, so the
// file can be plotted directly as a learning curve.
//
// The header is only written when the file is new; a resumed run
// appends to the existing log. Rows go through a BufWriter and are
// flushed on `close`, which the training loop calls on both normal
// completion and interrupt.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::domain::traits::{Summary, SummarySink};

const SUMMARY_FILE: &str = "summaries.csv";

/// Appends summary rows to `<dir>/summaries.csv`.
pub struct SummaryWriter {
    csv_path: PathBuf,
    /// None once closed
    out:      Option<BufWriter<File>>,
}

impl SummaryWriter {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let csv_path = dir.join(SUMMARY_FILE);
        let is_new = !csv_path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&csv_path)
            .with_context(|| format!("Cannot open summary file '{}'", csv_path.display()))?;
        let mut out = BufWriter::new(file);
        if is_new {
            writeln!(out, "step,tag,value")?;
            tracing::debug!("Created summary CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path, out: Some(out) })
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

impl SummarySink for SummaryWriter {
    fn add_summary(&mut self, summary: &Summary, step: usize) -> Result<()> {
        let Some(out) = self.out.as_mut() else {
            anyhow::bail!("Summary writer for '{}' is closed", self.csv_path.display());
        };
        for (tag, value) in &summary.scalars {
            writeln!(out, "{},{},{:.6}", step, tag, value)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut out) = self.out.take() {
            out.flush()
                .with_context(|| format!("Cannot flush '{}'", self.csv_path.display()))?;
            tracing::debug!("Closed summary CSV: '{}'", self.csv_path.display());
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "seq2seq-chatbot-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_rows_are_flushed_on_close() {
        let dir = scratch_dir("summaries");
        let mut writer = SummaryWriter::new(&dir).unwrap();

        let summary = Summary::default().scalar("loss", 2.5).scalar("learning_rate", 0.5);
        writer.add_summary(&summary, 3).unwrap();
        writer.close().unwrap();

        let csv = fs::read_to_string(writer.csv_path()).unwrap();
        assert_eq!(csv, "step,tag,value\n3,loss,2.500000\n3,learning_rate,0.500000\n");

        // closed writers refuse new rows; a second close is a no-op
        assert!(writer.add_summary(&summary, 4).is_err());
        assert!(writer.close().is_ok());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_resumed_run_appends_without_second_header() {
        let dir = scratch_dir("summaries-append");
        for step in [0, 1] {
            let mut writer = SummaryWriter::new(&dir).unwrap();
            writer
                .add_summary(&Summary::default().scalar("loss", 1.0), step)
                .unwrap();
            writer.close().unwrap();
        }

        let csv = fs::read_to_string(dir.join(SUMMARY_FILE)).unwrap();
        assert_eq!(csv.matches("step,tag,value").count(), 1);
        assert_eq!(csv.lines().count(), 3);
        fs::remove_dir_all(&dir).ok();
    }
}
