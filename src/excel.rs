use calamine::{
    open_workbook_auto, open_workbook_from_rs, Data, DataType, Range, Reader, Xlsx,
    XlsxError as XlsxReadError,
};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::dialogs::SaveDialog;
use crate::error::ExportError;
use crate::types::{FileFilter, NormalizedRecord, SaveFileOptions};

pub const SHEET_NAME: &str = "Sheet1";

/// Header row. Column 0 is the 1-based row index, column 1 the source file name.
pub const EXPORT_HEADERS: &[&str] = &["序号", "文件名称", "发票类型", "发票代码", "发票号码", "金额", "开票日期"];

/// Column widths in character units, matching `EXPORT_HEADERS`.
pub const COLUMN_WIDTHS: &[f64] = &[6.0, 21.0, 15.0, 15.0, 12.0, 12.0, 15.0];

/// Drop control characters (except tab, newline, CR) that make Excel report
/// "unreadable content".
fn sanitize_cell(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            let u = c as u32;
            let control = u < 0x20 || u == 0x7F || u == 0xFFFE || u == 0xFFFF;
            c == '\t' || c == '\n' || c == '\r' || !control
        })
        .collect()
}

fn write_text_cell_safe(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    text: &str,
    format: &Format,
) -> Result<(), XlsxError> {
    let cleaned = sanitize_cell(text);
    worksheet.write_string_with_format(row, col, &cleaned, format).map(|_| ())
}

/// Build the export workbook in memory: one header row, then one row per
/// record in input order. Every record field is written as text.
pub fn build_workbook(records: &[NormalizedRecord]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, &width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, width)?;
    }

    let header_format = Format::new().set_bold();
    let text_format = Format::new();
    for (col, header) in EXPORT_HEADERS.iter().enumerate() {
        write_text_cell_safe(worksheet, 0, col as u16, header, &header_format)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        worksheet.write_number(row, 0, (idx + 1) as f64)?;
        let values = [
            record.source_file.as_deref().unwrap_or(""),
            record.invoice_type.as_str(),
            record.code.as_str(),
            record.number.as_str(),
            record.amount.as_str(),
            record.date.as_str(),
        ];
        for (offset, value) in values.iter().enumerate() {
            write_text_cell_safe(worksheet, row, (offset + 1) as u16, value, &text_format)?;
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    Ok(workbook.save_to_buffer()?)
}

/// `<Downloads>/导出发票明细_<unix millis>.xlsx`, falling back to Desktop, then home.
pub fn default_export_path() -> PathBuf {
    let dir = dirs::download_dir()
        .or_else(dirs::desktop_dir)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join(format!("导出发票明细_{}.xlsx", chrono::Utc::now().timestamp_millis()))
}

/// `report.v2` becomes `report.v2.xlsx`; the existing suffix is kept.
fn with_xlsx_extension(path: PathBuf) -> PathBuf {
    let mut raw = path.into_os_string();
    raw.push(".xlsx");
    PathBuf::from(raw)
}

fn save_options() -> SaveFileOptions {
    SaveFileOptions {
        title: Some("另存为".to_string()),
        default_path: Some(default_export_path()),
        button_label: Some("保存".to_string()),
        filters: vec![FileFilter {
            name: "Excel 文件".to_string(),
            extensions: vec!["xlsx".to_string()],
        }],
    }
}

/// Build the workbook, ask where to save it, and write it there.
///
/// The bytes are returned either way; a cancelled prompt only skips the write.
pub fn export_records(
    records: &[NormalizedRecord],
    dialog: &dyn SaveDialog,
) -> Result<Vec<u8>, ExportError> {
    let bytes = build_workbook(records)?;

    match dialog.choose_save_path(&save_options()) {
        Some(mut path) => {
            if path.extension().map(|e| e.eq_ignore_ascii_case("xlsx")) != Some(true) {
                path = with_xlsx_extension(path);
            }
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|source| ExportError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            std::fs::write(&path, &bytes).map_err(|source| ExportError::Write {
                path: path.clone(),
                source,
            })?;
            log::info!("[export] Wrote {} row(s) to {}", records.len(), path.display());
        }
        None => log::info!("[export] Save cancelled; workbook kept in memory"),
    }
    Ok(bytes)
}

fn range_rows(range: &Range<Data>) -> Vec<Vec<String>> {
    range
        .rows()
        .map(|row| row.iter().map(|c| c.as_string().unwrap_or_default()).collect())
        .collect()
}

/// First sheet of a workbook on disk, as rows of cell text (header included).
pub fn read_workbook_rows(path: &Path) -> Result<Vec<Vec<String>>, ExportError> {
    if !path.exists() {
        return Err(ExportError::Read(format!("{} not found", path.display())));
    }
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ExportError::Read(format!("could not open Excel file: {}", e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ExportError::Read("workbook has no sheets".to_string()))?
        .map_err(|e| ExportError::Read(e.to_string()))?;
    Ok(range_rows(&range))
}

/// Same as [`read_workbook_rows`] for an in-memory xlsx buffer.
pub fn read_workbook_bytes(bytes: &[u8]) -> Result<Vec<Vec<String>>, ExportError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e: XlsxReadError| ExportError::Read(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ExportError::Read("workbook has no sheets".to_string()))?
        .map_err(|e| ExportError::Read(e.to_string()))?;
    Ok(range_rows(&range))
}
