//! Data binder.
//!
//! Resolves the data sources declared in a document into [`Bindings`].
//! This is the only stage of a render pass that touches the filesystem;
//! parsing, expansion and rendering work purely on in-memory values.
//!
//! Sources are resolved in document order and the first failure wins, so
//! error reporting is deterministic. Each distinct (path, format) pair is
//! read at most once per call.

mod formats;
mod value;


pub use formats::DataFormat;
pub use value::{BoundValue, Bindings, Record, record_json};

use crate::cancel::CancelToken;
use crate::config::DuplicateBindingPolicy;
use crate::document::{DataSourceRef, Document};
use crate::error::{PomlError, Result};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Resolve every data source in `doc` relative to `base_dir`.
///
/// # Errors
///
/// * [`PomlError::UnsupportedFormat`] - `format` is not json, csv or text
/// * [`PomlError::DuplicateBinding`] - a name is reused under the `error` policy
/// * [`PomlError::DataSourceNotFound`] - the file does not exist
/// * [`PomlError::Io`] - the file exists but could not be read
/// * [`PomlError::DataParse`] - the content is invalid for its format
pub fn bind(doc: &Document, base_dir: &Path, policy: DuplicateBindingPolicy) -> Result<Bindings> {
    bind_with_cancel(doc, base_dir, policy, &CancelToken::new())
}

/// Like [`bind`], but stops before the next file read once `cancel` fires.
///
/// Nothing is returned on failure, so callers never see partial bindings.
pub fn bind_with_cancel(
    doc: &Document,
    base_dir: &Path,
    policy: DuplicateBindingPolicy,
    cancel: &CancelToken,
) -> Result<Bindings> {
    let mut bindings = Bindings::new();
    let mut cache: HashMap<(PathBuf, DataFormat), BoundValue> = HashMap::new();

    for source in doc.data_sources() {
        let path = base_dir.join(&source.src);
        let format = DataFormat::from_str(&source.format).ok_or_else(|| {
            PomlError::UnsupportedFormat {
                format: source.format.clone(),
                path: path.clone(),
            }
        })?;

        if bindings.contains(&source.name) {
            match policy {
                DuplicateBindingPolicy::Error => {
                    return Err(PomlError::DuplicateBinding {
                        name: source.name,
                        path,
                    });
                }
                DuplicateBindingPolicy::Overwrite => {
                    warn!(name = %source.name, path = %path.display(), "binding redeclared, overwriting");
                }
            }
        }

        let key = (path, format);
        let value = match cache.get(&key) {
            Some(value) => value.clone(),
            None => {
                cancel.check("bind")?;
                let value = load_source(&source, &key.0, format)?;
                cache.insert(key, value.clone());
                value
            }
        };

        debug!(name = %source.name, kind = value.describe(), "bound data source");
        bindings.insert(source.name, value);
    }

    Ok(bindings)
}

fn load_source(source: &DataSourceRef, path: &Path, format: DataFormat) -> Result<BoundValue> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PomlError::DataSourceNotFound {
            path: path.to_path_buf(),
        },
        _ => PomlError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let data_parse = |source: anyhow::Error| PomlError::DataParse {
        path: path.to_path_buf(),
        format: format.to_string(),
        source,
    };

    let content = String::from_utf8(bytes).map_err(|e| data_parse(e.into()))?;
    let value = format.decode(&content).map_err(data_parse)?;

    debug!(
        src = %source.src,
        format = %format,
        bytes = content.len(),
        "loaded data source"
    );
    Ok(value)
}
