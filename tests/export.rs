use invoice_ocr_lib::dialogs::FixedSaveDialog;
use invoice_ocr_lib::excel::{
    export_records, read_workbook_bytes, read_workbook_rows, EXPORT_HEADERS,
};
use invoice_ocr_lib::NormalizedRecord;
use pretty_assertions::assert_eq;

fn record(i: usize) -> NormalizedRecord {
    NormalizedRecord {
        invoice_type: "增值税发票".into(),
        code: format!("0440019{:05}", i),
        number: format!("{:08}", i),
        amount: format!("{}.50", i * 10),
        date: "2023年03月15日".into(),
        source_file: Some(format!("invoice-{}.pdf", i)),
    }
}

#[test]
fn exported_rows_read_back_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested").join("out.xlsx");
    let records: Vec<_> = (1..=3).map(record).collect();

    export_records(&records, &FixedSaveDialog::Path(target.clone())).unwrap();

    let rows = read_workbook_rows(&target).unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], EXPORT_HEADERS.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    for (i, row) in rows.iter().skip(1).enumerate() {
        let r = &records[i];
        assert_eq!(row[0], (i + 1).to_string());
        assert_eq!(
            &row[1..],
            &[
                r.source_file.clone().unwrap(),
                r.invoice_type.clone(),
                r.code.clone(),
                r.number.clone(),
                r.amount.clone(),
                r.date.clone(),
            ]
        );
    }
}

#[test]
fn leading_zeros_survive_as_text() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("zeros.xlsx");
    let rec = NormalizedRecord {
        code: "011001900211".into(),
        number: "00012345".into(),
        ..NormalizedRecord::default()
    };

    export_records(&[rec], &FixedSaveDialog::Path(target.clone())).unwrap();

    let rows = read_workbook_rows(&target).unwrap();
    assert_eq!(rows[1][3], "011001900211");
    assert_eq!(rows[1][4], "00012345");
}

#[test]
fn missing_extension_is_added() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("report");

    export_records(&[record(1)], &FixedSaveDialog::Path(target)).unwrap();

    assert!(dir.path().join("report.xlsx").is_file());
}

#[test]
fn existing_suffix_is_kept_when_extension_is_appended() {
    let dir = tempfile::tempdir().unwrap();

    export_records(&[record(1)], &FixedSaveDialog::Path(dir.path().join("report.v2"))).unwrap();
    export_records(&[record(2)], &FixedSaveDialog::Path(dir.path().join("upper.XLSX"))).unwrap();

    assert!(dir.path().join("report.v2.xlsx").is_file());
    assert!(!dir.path().join("report.xlsx").exists());
    assert!(dir.path().join("upper.XLSX").is_file());
}

#[test]
fn empty_fields_keep_rows_full_width() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("sparse.xlsx");
    let sparse = NormalizedRecord {
        invoice_type: "火车票".into(),
        ..NormalizedRecord::default()
    };

    export_records(&[sparse, record(2)], &FixedSaveDialog::Path(target.clone())).unwrap();

    let rows = read_workbook_rows(&target).unwrap();
    assert!(rows.iter().all(|row| row.len() == EXPORT_HEADERS.len()));
    assert_eq!(rows[1][1], "");
    assert_eq!(rows[1][2], "火车票");
    assert_eq!(rows[1][6], "");
}

#[test]
fn cancelled_save_still_returns_workbook() {
    let records: Vec<_> = (1..=2).map(record).collect();

    let bytes = export_records(&records, &FixedSaveDialog::Cancel).unwrap();

    let rows = read_workbook_bytes(&bytes).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2][2], "增值税发票");
}

#[test]
fn control_characters_are_stripped_on_export() {
    let rec = NormalizedRecord {
        invoice_type: "机打\u{1}发票".into(),
        ..NormalizedRecord::default()
    };

    let bytes = export_records(&[rec], &FixedSaveDialog::Cancel).unwrap();

    assert_eq!(read_workbook_bytes(&bytes).unwrap()[1][2], "机打发票");
}

#[test]
fn reading_a_missing_workbook_fails() {
    assert!(read_workbook_rows(std::path::Path::new("/no/such/book.xlsx")).is_err());
}
