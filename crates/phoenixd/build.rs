//! Build script: render the phoenixd man page for packaging.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use time::{OffsetDateTime, format_description::well_known::Iso8601};

#[path = "src/manual.rs"]
mod manual;

const FALLBACK_DATE: &str = "1970-01-01";

/// Reproducible page date taken from `SOURCE_DATE_EPOCH`.
fn manual_date() -> String {
    let Ok(raw) = env::var("SOURCE_DATE_EPOCH") else {
        return FALLBACK_DATE.into();
    };
    let formatted = raw
        .parse::<i64>()
        .ok()
        .and_then(|seconds| OffsetDateTime::from_unix_timestamp(seconds).ok())
        .and_then(|date| date.format(&Iso8601::DATE).ok());
    formatted.unwrap_or_else(|| {
        println!("cargo:warning=Ignoring SOURCE_DATE_EPOCH '{raw}'; using {FALLBACK_DATE}");
        FALLBACK_DATE.into()
    })
}

/// `target/generated-man/<target>/<profile>`, derived from `OUT_DIR`.
///
/// `OUT_DIR` is `{target}/{profile}/build/{crate}-{hash}/out`.
fn packaging_dir() -> PathBuf {
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown-target".into());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown-profile".into());
    let base = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .and_then(|out| out.ancestors().nth(4).map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("target"));
    base.join("generated-man").join(target).join(profile)
}

fn write_page(dir: &Path, name: &str, page: &[u8]) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let staging = dir.join(format!("{name}.tmp"));
    fs::write(&staging, page)?;
    fs::rename(&staging, dir.join(name))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/manual.rs");
    for var in ["CARGO_PKG_VERSION", "SOURCE_DATE_EPOCH", "TARGET", "PROFILE"] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    let binary = env::var("CARGO_BIN_NAME")
        .or_else(|_| env::var("CARGO_PKG_NAME"))
        .unwrap_or_else(|_| "phoenixd".into());
    let version = env::var("CARGO_PKG_VERSION")
        .map_err(|_| "CARGO_PKG_VERSION must be set by Cargo to render the man page")?;
    let page = manual::render_manual(&binary, &version, &manual_date())?;
    let name = format!("{binary}.1");

    write_page(&packaging_dir(), &name, &page)?;
    if let Some(out_dir) = env::var_os("OUT_DIR")
        && let Err(error) = write_page(Path::new(&out_dir), &name, &page)
    {
        println!("cargo:warning=Failed to stage man page in OUT_DIR: {error}");
    }
    Ok(())
}
