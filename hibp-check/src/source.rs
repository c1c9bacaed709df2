use std::path::Path;

use tokio::fs;
use tokio::io::AsyncReadExt;

use crate::error::Error;

/// Split newline-delimited input into one credential per line.
///
/// A trailing `\r` is stripped from each line and a final newline does not
/// produce an extra empty credential. Blank lines in the middle are kept;
/// the empty password is a valid credential.
pub fn split_lines(data: &[u8]) -> Vec<Vec<u8>> {
    let data = data.strip_suffix(b"\n").unwrap_or(data);
    if data.is_empty() {
        return Vec::new();
    }

    data.split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line).to_vec())
        .collect()
}

/// Read credentials from a file, or from stdin when `path` is `-`.
pub async fn read_credentials(path: &Path) -> Result<Vec<Vec<u8>>, Error> {
    let data = if path == Path::new("-") {
        let mut buf = Vec::new();
        tokio::io::stdin().read_to_end(&mut buf).await?;
        buf
    } else {
        fs::read(path).await.map_err(Error::io(path))?
    };

    Ok(split_lines(&data))
}
