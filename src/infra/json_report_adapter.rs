use crate::app::ports::ReportOutputPort;
use crate::error::Result;
use crate::types::{MovieInsightRow, OutputFormat};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Writes the report as a pretty-printed, record-oriented JSON array
#[derive(Debug, Clone, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportOutputPort for JsonReportAdapter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn write_report(&self, rows: &[MovieInsightRow], path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        rows.serialize(&mut serializer)?;
        writer.flush()?;

        info!("💾 Saved JSON to {}", path.display());
        Ok(())
    }
}
