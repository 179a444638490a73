use std::io::Write;

use serde_json::json;

use crate::{
    catalogue::Entry,
    models::{EntryReport, Outcome, RunReport, Section},
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

pub struct Printer<W> {
    out: W,
    format: OutputFormat,
    section: Option<Section>,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format, section: None }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn entry(&mut self, entry: &Entry, report: &EntryReport) -> std::io::Result<()> {
        if self.format == OutputFormat::Json {
            serde_json::to_writer(&mut self.out, report)?;
            return writeln!(self.out);
        }

        if self.section != Some(entry.section) {
            self.section = Some(entry.section);
            writeln!(self.out, "\n--- {} ---", entry.section.heading())?;
        }

        writeln!(self.out, "\n[{}] {}", entry.name, entry.title)?;
        match &report.outcome {
            Outcome::Ok { rows } if rows.is_empty() => writeln!(self.out, "(no results)"),
            Outcome::Ok { rows } => {
                for row in rows {
                    serde_json::to_writer_pretty(&mut self.out, row)?;
                    writeln!(self.out)?;
                }
                Ok(())
            },
            Outcome::Failed { error } => writeln!(self.out, "error: {error}"),
        }
    }

    pub fn summary(&mut self, report: &RunReport) -> std::io::Result<()> {
        let failed = report.failures();
        match self.format {
            OutputFormat::Json => {
                let summary = json!({
                    "started_at": report.started_at,
                    "entries": report.entries.len(),
                    "failed": failed,
                });
                serde_json::to_writer(&mut self.out, &summary)?;
                writeln!(self.out)
            },
            OutputFormat::Text => {
                writeln!(self.out, "\n{} entries, {failed} failed", report.entries.len())
            },
        }
    }

    pub fn catalogue(&mut self, entries: &[Entry]) -> std::io::Result<()> {
        let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
        for e in entries {
            match self.format {
                OutputFormat::Json => {
                    let line = json!({ "entry": e.name, "section": e.section, "title": e.title });
                    serde_json::to_writer(&mut self.out, &line)?;
                    writeln!(self.out)?;
                },
                OutputFormat::Text => {
                    let section = e.section.as_str();
                    writeln!(self.out, "{:<width$}  {:<9}  {}", e.name, section, e.title)?;
                },
            }
        }
        Ok(())
    }
}
