use std::io::Write;

use serde::Serialize;

use crate::error::ExportError;

pub(crate) fn export_to_json_impl<T, W>(value: &T, writer: W) -> Result<(), ExportError>
where
    T: Serialize + ?Sized,
    W: Write,
{
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}
