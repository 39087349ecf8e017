#![cfg(feature = "excel_test_writer")]

use std::path::Path;

use chrono::NaiveDate;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

use sheetload::export::export_workbook;
use sheetload::ingestion::{read_tables, ReaderOptions};
use sheetload::types::Value;

fn write_two_sheet_xlsx(path: &Path) {
    let mut wb = Workbook::new();

    // Title row above the header, a blank row, then data.
    let ws = wb.add_worksheet();
    ws.set_name("Q1 Sales").unwrap();
    ws.write_string(1, 0, "Region").unwrap();
    ws.write_string(1, 1, "Units").unwrap();
    ws.write_string(1, 2, "Shipped").unwrap();
    ws.write_string(2, 0, "  North ").unwrap();
    ws.write_number(2, 1, 12).unwrap();
    let date_fmt = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let shipped = ExcelDateTime::from_ymd(2024, 1, 5)
        .unwrap()
        .and_hms(12, 0, 0)
        .unwrap();
    ws.write_datetime_with_format(2, 2, &shipped, &date_fmt).unwrap();
    ws.write_string(4, 0, "South").unwrap();
    ws.write_number(4, 1, 2.5).unwrap();

    let ws2 = wb.add_worksheet();
    ws2.set_name("Empty").unwrap();

    wb.save(path).unwrap();
}

#[test]
fn every_sheet_is_read_with_native_cell_types() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.xlsx");
    write_two_sheet_xlsx(&path);

    let wb = read_tables(&path, &ReaderOptions::default()).unwrap();
    assert_eq!(wb.sheet_names().collect::<Vec<_>>(), vec!["Q1 Sales", "Empty"]);

    let sales = &wb.sheet("Q1 Sales").unwrap().table;
    assert_eq!(sales.columns, vec!["Region", "Units", "Shipped"]);
    assert_eq!(sales.row_count(), 2);
    assert_eq!(sales.rows[0][0], Value::Utf8("North".to_string()));
    assert_eq!(sales.rows[0][1], Value::Float64(12.0));
    assert_eq!(
        sales.rows[0][2],
        Value::DateTime(
            NaiveDate::from_ymd_opt(2024, 1, 5)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
        )
    );
    assert_eq!(sales.rows[1][2], Value::Utf8(String::new()));

    assert_eq!(wb.sheet("Empty").unwrap().table.row_count(), 0);
}

#[test]
fn excel_export_renders_dates_and_numbers_as_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.xlsx");
    write_two_sheet_xlsx(&path);

    let wb = read_tables(&path, &ReaderOptions::default()).unwrap();
    let written = export_workbook(&wb, "sales", dir.path().join("json"), "").unwrap();

    assert_eq!(written.len(), 2);
    assert!(written[0].ends_with("sales_Q1_Sales.json"));
    let text = std::fs::read_to_string(&written[0]).unwrap();
    assert_eq!(
        text,
        r#"[{"Region":"North","Units":"12","Shipped":"2024-01-05 12:00:00"},{"Region":"South","Units":"2.5","Shipped":""}]"#
    );

    assert_eq!(std::fs::read_to_string(&written[1]).unwrap(), "[]");
}
