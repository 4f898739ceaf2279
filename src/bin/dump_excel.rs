//! Print the first sheet of an exported workbook, one row per line.
//! Usage: cargo run --bin dump_excel -- <path-to.xlsx>

use invoice_ocr_lib::excel::read_workbook_rows;
use std::path::PathBuf;

fn main() {
    let path: PathBuf = match std::env::args().nth(1) {
        Some(p) => p.into(),
        None => {
            eprintln!("Usage: dump_excel <path-to.xlsx>");
            std::process::exit(1);
        }
    };

    let rows = match read_workbook_rows(&path) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    for (i, row) in rows.iter().enumerate() {
        println!("{:>4}: {}", i + 1, row.join(" | "));
    }
    eprintln!("{} row(s), {} data", rows.len(), rows.len().saturating_sub(1));
}
