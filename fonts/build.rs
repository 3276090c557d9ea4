use std::env;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use zip::ZipArchive;

const ZIP_URL: &str =
    "https://github.com/adobe-fonts/source-sans/releases/download/3.052R/OTF-source-sans-3.052R.zip";

// (file name inside the archive, env override)
const FACES: [(&str, &str); 2] = [
    ("SourceSans3-Regular.otf", "FONT_REGULAR"),
    ("SourceSans3-Bold.otf", "FONT_BOLD"),
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    let mut missing = Vec::new();
    for (name, var) in FACES {
        println!("cargo:rerun-if-env-changed={var}");
        let target = out_dir.join(name);
        if target.exists() && fs::metadata(&target).map(|m| m.len() > 0).unwrap_or(false) {
            continue;
        }
        if let Ok(path) = env::var(var) {
            match fs::copy(&path, &target) {
                Ok(_) => continue,
                Err(e) => println!("cargo:warning=failed to copy {var}={path}: {e}"),
            }
        }
        missing.push(name);
    }
    if missing.is_empty() {
        return;
    }

    let zip_path = out_dir.join("source-sans.zip");
    let extracted = download(&zip_path) && extract(&zip_path, &out_dir, &missing);
    if !extracted {
        // Text falls back to system fonts at render time.
        println!("cargo:warning=embedded font unavailable; set FONT_REGULAR/FONT_BOLD or allow network");
        for name in missing {
            let target = out_dir.join(name);
            if !target.exists() {
                fs::write(&target, b"").expect("write placeholder font");
            }
        }
    }
}

fn download(zip_path: &Path) -> bool {
    if zip_path.exists() {
        return true;
    }
    let Some(dest) = zip_path.to_str() else {
        return false;
    };
    let curl = Command::new("curl")
        .args(["-L", "-f", "-s", "-o", dest, ZIP_URL])
        .status();
    if let Ok(st) = curl
        && st.success()
    {
        return true;
    }
    let wget = Command::new("wget").args(["-q", "-O", dest, ZIP_URL]).status();
    matches!(wget, Ok(st) if st.success())
}

fn extract(zip_path: &Path, out_dir: &Path, wanted: &[&str]) -> bool {
    let mut data = Vec::new();
    let Ok(mut f) = fs::File::open(zip_path) else {
        return false;
    };
    if f.read_to_end(&mut data).is_err() {
        return false;
    }
    let Ok(mut zip) = ZipArchive::new(Cursor::new(data)) else {
        return false;
    };
    let mut found = 0;
    for i in 0..zip.len() {
        let Ok(mut file) = zip.by_index(i) else {
            continue;
        };
        let entry = file.name().to_string();
        if let Some(name) = wanted.iter().find(|n| entry.ends_with(*n)) {
            let mut buf = Vec::new();
            if std::io::copy(&mut file, &mut buf).is_ok() && fs::write(out_dir.join(name), &buf).is_ok() {
                found += 1;
            }
        }
    }
    found == wanted.len()
}
