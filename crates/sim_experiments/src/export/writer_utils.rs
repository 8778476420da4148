use std::fs::File;
use std::path::Path;

use crate::error::ExportError;

pub(crate) fn ensure_not_empty<T>(items: &[T]) -> Result<(), ExportError> {
    if items.is_empty() {
        return Err(ExportError::Empty);
    }

    Ok(())
}

pub(crate) fn create_output_file(path: impl AsRef<Path>) -> Result<File, ExportError> {
    Ok(File::create(path)?)
}

/// `-1` stands in for values that were never set.
pub(crate) fn or_unset<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-1".to_string(), |v| v.to_string())
}
