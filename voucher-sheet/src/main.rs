use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use voucher_core::{
    Rasterize, SheetConfig, SvgRasterizer, VoucherRecord, compose_vouchers, document_file_name,
    parse_records, render,
};

const USAGE: &str = "\
Usage:
  voucher-sheet <records.json> [out_dir] [--config sheet.json]
  voucher-sheet preview <records.json> <output.(png|svg)> [index] [--config sheet.json]";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let mut args: Vec<String> = env::args().skip(1).collect();
    let config = match take_config(&mut args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    };
    let res = match args.first().map(String::as_str) {
        None => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
        Some("preview") => preview(&args[1..], &config),
        Some(_) => compose(&args, &config),
    };
    if let Err(e) = res {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

/// Strip `--config <file>` from the arguments and load it, or use the defaults.
fn take_config(args: &mut Vec<String>) -> Result<SheetConfig> {
    let Some(pos) = args.iter().position(|a| a == "--config") else {
        return Ok(SheetConfig::default());
    };
    if pos + 1 >= args.len() {
        bail!("--config needs a file path");
    }
    let path = args.remove(pos + 1);
    args.remove(pos);
    SheetConfig::from_json_file(&path).with_context(|| format!("loading sheet config {path}"))
}

fn load_records(path: &str) -> Result<Vec<VoucherRecord>> {
    let txt = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    parse_records(&txt).with_context(|| format!("parsing voucher records in {path}"))
}

fn compose(args: &[String], config: &SheetConfig) -> Result<()> {
    let records = load_records(&args[0])?;
    let out_dir = args.get(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    let doc = compose_vouchers(&records, config)?;
    if !doc.report.skipped.is_empty() {
        log::warn!(
            "{} voucher(s) left out: {}",
            doc.report.skipped.len(),
            doc.report.skipped.join(", ")
        );
    }
    let name = document_file_name(&config.file_prefix, chrono::Local::now().date_naive());
    let path = out_dir.join(name);
    fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    fs::write(&path, &doc.bytes).with_context(|| format!("writing {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

/// Render a single record: `.svg` writes the composition, anything else a PNG.
fn preview(args: &[String], config: &SheetConfig) -> Result<()> {
    if args.len() < 2 {
        bail!("{USAGE}");
    }
    let records = load_records(&args[0])?;
    let output = Path::new(&args[1]);
    let index: usize = match args.get(2) {
        Some(s) => s.parse().with_context(|| format!("invalid record index {s:?}"))?,
        None => 0,
    };
    let Some(record) = records.get(index) else {
        bail!("record index {index} out of range ({} records)", records.len());
    };
    let composition = render(record, config.locale, config.canvas_width, config.canvas_height);
    let bytes = if output.extension().is_some_and(|e| e.eq_ignore_ascii_case("svg")) {
        composition.svg.into_bytes()
    } else {
        let mut rasterizer =
            SvgRasterizer::with_embedded_font(config.canvas_width, config.canvas_height, config.scale)?;
        rasterizer.rasterize(&composition)?.encode_png()?
    };
    fs::write(output, bytes).with_context(|| format!("writing {}", output.display()))?;
    log::info!("wrote preview of {} to {}", record.code, output.display());
    Ok(())
}
