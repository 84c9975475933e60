use crate::domain::delivery::{DeliverableRecord, REPORT_COLUMNS};
use crate::error::PipelineError;
use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, FormatBorder, Workbook, XlsxError};
use std::path::Path;

pub const OUTPUT_FILE: &str = "Nifty50_Delivery.xlsx";
pub const SHEET_NAME: &str = "Delivery";

/// Write `rows` as a single "Delivery" sheet with a header row and no index
/// column. Returns the number of data rows written.
///
/// `created` pins the workbook's creation timestamp so reruns on the same day
/// with the same data produce the same document.
pub fn write_report(
    rows: &[DeliverableRecord],
    path: &Path,
    created: NaiveDate,
) -> Result<usize, PipelineError> {
    let mut workbook = Workbook::new();

    let year = u16::try_from(created.year()).map_err(|_| {
        XlsxError::DateTimeRangeError(format!("year out of range: {}", created.year()))
    })?;
    let created = ExcelDateTime::from_ymd(year, created.month() as u8, created.day() as u8)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

    let header = Format::new().set_bold().set_border(FormatBorder::Thin);
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, name) in REPORT_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (i, r) in rows.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &r.date)?;
        sheet.write_string(row, 1, &r.symbol)?;
        sheet.write_number(row, 2, r.traded_qty as f64)?;
        sheet.write_number(row, 3, r.delivery_qty as f64)?;
        sheet.write_number(row, 4, r.delivery_pct)?;
    }

    workbook.save(path)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "wrote report");
    Ok(rows.len())
}
