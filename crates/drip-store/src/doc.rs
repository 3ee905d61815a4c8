//! Atomic JSON document I/O.
//!
//! Writes go to a `.tmp` sibling, are fsynced, then renamed over the
//! previous copy. A reader therefore only ever sees the old or the new
//! document, never a torn one. In-place rewrites are deliberately absent.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

pub(crate) fn read_doc<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_json::from_str(&raw).map_err(|e| StoreError::Invalid {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn write_doc<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value).map_err(|e| StoreError::Invalid {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let tmp = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp).map_err(|e| io_err(&tmp, e))?;
    file.write_all(&data).map_err(|e| io_err(&tmp, e))?;
    file.sync_all().map_err(|e| io_err(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}
