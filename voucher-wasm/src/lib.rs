use chrono::NaiveDate;
use js_sys::{Array, Uint8Array};
use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, HtmlElement, Url};

use voucher_core::{ComposedDocument, SheetConfig, compose_vouchers, document_file_name, parse_records};

/// Forwards `log` records to the browser console.
struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&msg),
            Level::Warn => web_sys::console::warn_1(&msg),
            _ => web_sys::console::log_1(&msg),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

#[wasm_bindgen(start)]
pub fn start() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }
}

fn compose(records_json: &str) -> Result<(ComposedDocument, SheetConfig), JsValue> {
    let records = parse_records(records_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let config = SheetConfig::default();
    let doc = compose_vouchers(&records, &config).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok((doc, config))
}

fn today() -> Result<NaiveDate, JsValue> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
        .ok_or_else(|| JsValue::from_str("invalid host date"))
}

/// Compose the voucher PDF and hand back its bytes.
#[wasm_bindgen]
pub fn render_vouchers_pdf(records_json: &str) -> Result<Uint8Array, JsValue> {
    let (doc, _) = compose(records_json)?;
    Ok(Uint8Array::from(doc.bytes.as_slice()))
}

/// Compose the voucher PDF and trigger a browser download.
/// Returns the file name used.
#[wasm_bindgen]
pub fn export_vouchers_pdf(records_json: &str) -> Result<String, JsValue> {
    let (doc, config) = compose(records_json)?;
    let name = document_file_name(&config.file_prefix, today()?);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let array = Array::new();
    array.push(&Uint8Array::from(doc.bytes.as_slice()));
    let opts = BlobPropertyBag::new();
    opts.set_type("application/pdf");
    let blob = Blob::new_with_u8_array_sequence_and_options(&array, &opts)?;
    let url = Url::create_object_url_with_blob(&blob)?;
    let a = document.create_element("a")?.dyn_into::<HtmlElement>()?;
    a.set_attribute("href", &url)?;
    a.set_attribute("download", &name)?;
    a.click();
    Url::revoke_object_url(&url)?;
    Ok(name)
}
