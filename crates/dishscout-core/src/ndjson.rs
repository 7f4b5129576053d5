//! Newline-delimited JSON reading shared by the dataset loaders.

use std::io::BufRead;

use serde::de::DeserializeOwned;

use crate::error::LoadError;

/// Deserialize each non-blank line of `reader` as `T` and hand it to `visit`
/// together with its 1-based line number.
///
/// Parse failures are passed through to `visit` so the caller can count and
/// report them; only an I/O failure stops the scan. Returns the number of
/// lines consumed, blank ones included.
pub(crate) fn for_each_record<R, T, F>(reader: R, mut visit: F) -> Result<usize, LoadError>
where
    R: BufRead,
    T: DeserializeOwned,
    F: FnMut(usize, Result<T, serde_json::Error>),
{
    let mut lines = 0;
    for chunk in reader.split(b'\n') {
        let mut bytes = chunk.map_err(|source| LoadError::Read {
            line: lines,
            source,
        })?;
        lines += 1;
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        visit(lines, serde_json::from_slice(&bytes));
    }
    Ok(lines)
}
