//! Workbook exports read through the same `Table` as CSV.

use std::path::PathBuf;

use shelfcheck_core::{load_table, load_workbook_table};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn xlsx_export_reads_header_and_rows() {
    let table = load_workbook_table(&fixture("trademax_export.xlsx")).expect("fixture should load");

    assert_eq!(table.columns, vec!["Artikelnummer", "Benämning", "EAN"]);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.rows[0], vec!["1139375", "Stol X", "7350000000001"]);
    assert_eq!(table.rows[1], vec!["1475862", "", ""]);
}

#[test]
fn load_table_picks_workbook_reader_for_xlsx() {
    let via_dispatch = load_table(&fixture("trademax_export.xlsx")).unwrap();
    let direct = load_workbook_table(&fixture("trademax_export.xlsx")).unwrap();
    assert_eq!(via_dispatch, direct);
}
