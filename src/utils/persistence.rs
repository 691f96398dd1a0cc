use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};

use crate::{errors::LedgerError, ledger::Ledger};

const TMP_SUFFIX: &str = "tmp";

/// Writes the provided ledger to disk atomically by staging to a temporary file.
pub fn save_ledger_to_file(ledger: &Ledger, path: &Path) -> Result<(), LedgerError> {
    save_json(ledger, path)
}

/// Loads a ledger snapshot from disk, returning structured errors on failure.
pub fn load_ledger_from_file(path: &Path) -> Result<Ledger, LedgerError> {
    load_json(path)
}

/// Serializes `value` as pretty JSON and swaps it into place with a rename.
pub fn save_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), LedgerError> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = tmp_path(path);
    write_file(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, LedgerError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Writes `data` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, data: &str) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}
