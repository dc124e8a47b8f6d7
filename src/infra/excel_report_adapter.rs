use crate::app::ports::ReportOutputPort;
use crate::constants::{FLAGGED_ROW_FILL, REPORT_COLUMNS};
use crate::error::Result;
use crate::types::{MovieInsightRow, OutputFormat, VoteCount};
use rust_xlsxwriter::{Color, Format, FormatPattern, Workbook};
use std::fs;
use std::path::Path;
use tracing::info;

pub const SHEET_NAME: &str = "movie_insights";

/// Writes the report as an .xlsx workbook. Rows flagged as unreliable get a
/// solid background fill; the flag column is kept as a plain boolean.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcelReportAdapter;

impl ExcelReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportOutputPort for ExcelReportAdapter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Excel
    }

    fn write_report(&self, rows: &[MovieInsightRow], path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let header = Format::new().set_bold();
        let plain = Format::new();
        let highlighted = Format::new()
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(FLAGGED_ROW_FILL));

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, name) in REPORT_COLUMNS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *name, &header)?;
        }

        for (i, row) in rows.iter().enumerate() {
            let r = (i + 1) as u32;
            let format = if row.flagged_as_unreliable { &highlighted } else { &plain };

            worksheet.write_string_with_format(r, 0, row.title.as_str(), format)?;
            worksheet.write_number_with_format(r, 1, row.popularity, format)?;
            match row.vote_count {
                VoteCount::Known(v) => {
                    worksheet.write_number_with_format(r, 2, v as f64, format)?;
                }
                VoteCount::Unknown => {
                    worksheet.write_blank(r, 2, format)?;
                }
            }
            worksheet.write_string_with_format(r, 3, row.genres.as_str(), format)?;
            worksheet.write_boolean_with_format(r, 4, row.flagged_as_unreliable, format)?;
        }

        worksheet.set_column_width(0, 40)?;
        worksheet.set_column_width(3, 30)?;
        worksheet.set_column_width(4, 22)?;

        workbook.save(path)?;
        info!("📁 Saved Excel to {}", path.display());
        Ok(())
    }
}
