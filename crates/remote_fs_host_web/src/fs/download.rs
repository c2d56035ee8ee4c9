//! Saving downloaded files through the browser's download flow.

use remote_fs_host::{DownloadedFile, DEFAULT_DOWNLOAD_FILENAME};

use crate::bridge;

/// Offers `file` to the user as a download.
///
/// # Errors
///
/// Returns an error when the document is unavailable or the browser refuses the blob.
pub fn save_downloaded_file(file: &DownloadedFile) -> Result<(), String> {
    let filename = match file.filename.trim() {
        "" => DEFAULT_DOWNLOAD_FILENAME,
        name => name,
    };
    bridge::save_download(filename, &file.bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn saving_is_unavailable_off_wasm() {
        let file = DownloadedFile {
            filename: "report.pdf".to_string(),
            bytes: vec![1, 2, 3],
        };
        let err = save_downloaded_file(&file).expect_err("no document off wasm");
        assert!(err.contains("wasm32"));
    }
}
