use std::fs;

use chrono::NaiveDate;
use voucher_core::{Locale, SheetConfig, VoucherError, compose_vouchers, document_file_name, parse_records};

const RECORDS: &str = r#"[
    {"code":"NATAL-001","customerName":"João Lima","customerTaxId":"111.222.333-44",
     "storeName":"Livraria Centro","mallName":"Shopping Norte",
     "attributionDate":"2024-12-20T15:42:10-03:00","purchaseValue":"350.00"},
    {"code":"NATAL-002","customerName":null,"storeName":"Ótica Sol",
     "attributionDate":"2024-12-21","purchaseValue":89.9}
]"#;

#[test]
fn document_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let records = parse_records(RECORDS).unwrap();
    let cfg = SheetConfig {
        canvas_width: 391,
        canvas_height: 268,
        scale: 1,
        ..SheetConfig::default()
    };
    let doc = compose_vouchers(&records, &cfg).unwrap();
    let name = document_file_name(&cfg.file_prefix, NaiveDate::from_ymd_opt(2024, 12, 22).unwrap());
    assert_eq!(name, "vouchers_2024-12-22.pdf");

    let path = dir.path().join(&name);
    fs::write(&path, &doc.bytes).unwrap();
    let loaded = lopdf::Document::load(&path).unwrap();
    assert_eq!(loaded.get_pages().len(), 1);
    assert_eq!(doc.report.rendered, 2);
}

#[test]
fn config_file_overrides_selected_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheet.json");
    fs::write(
        &path,
        r#"{"locale":"en-US","file_prefix":"raffle","grid":{"rows":1,"columns":2}}"#,
    )
    .unwrap();
    let cfg = SheetConfig::from_json_file(&path).unwrap();
    assert_eq!(cfg.locale, Locale::EnUs);
    assert_eq!(cfg.file_prefix, "raffle");
    assert_eq!(cfg.geometry().unwrap().items_per_page(), 2);
    assert_eq!(cfg.scale, SheetConfig::default().scale);
}

#[test]
fn missing_config_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SheetConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, VoucherError::Io(_)));
}
