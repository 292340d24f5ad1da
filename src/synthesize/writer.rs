use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Bytes copied per read/write cycle
pub const CHUNK_SIZE: usize = 8192;

/// Sibling file the body is streamed into before it replaces `path`
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("download"));
    name.push(".part");
    path.with_file_name(name)
}

/// Stream `source` to `path` in `CHUNK_SIZE` pieces.
///
/// Data lands in `partial_path(path)` first and is renamed into place only
/// after the last chunk is flushed. On failure the partial file is removed
/// and `path` is left untouched. Returns the number of bytes written.
pub fn stream_to_file<R: Read>(
    source: R,
    expected_len: Option<u64>,
    path: &Path,
) -> io::Result<u64> {
    let temp_path = partial_path(path);

    let result = write_chunks(source, expected_len, &temp_path)
        .and_then(|written| fs::rename(&temp_path, path).map(|_| written));

    if result.is_err() {
        if let Err(e) = fs::remove_file(&temp_path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Failed to remove partial file {:?}: {}", temp_path, e);
            }
        }
    }

    result
}

fn write_chunks<R: Read>(
    mut source: R,
    expected_len: Option<u64>,
    temp_path: &Path,
) -> io::Result<u64> {
    let mut file: File = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)?;

    let pb = progress_bar(expected_len);
    let mut buf = [0u8; CHUNK_SIZE];
    let mut written: u64 = 0;

    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                pb.abandon();
                return Err(e);
            }
        };

        if let Err(e) = file.write_all(&buf[..n]) {
            pb.abandon();
            return Err(e);
        }
        written += n as u64;
        pb.set_position(written);
    }

    file.sync_all()?;
    pb.finish_and_clear();

    Ok(written)
}

fn progress_bar(expected_len: Option<u64>) -> indicatif::ProgressBar {
    match expected_len {
        Some(total) if total > 0 => {
            let pb = indicatif::ProgressBar::new(total);
            if let Ok(style) = indicatif::ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            ) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        }
        _ => {
            let pb = indicatif::ProgressBar::new_spinner();
            if let Ok(style) = indicatif::ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {bytes} received")
            {
                pb.set_style(style);
            }
            pb
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Serves `data` once, then fails like a dropped connection
    struct BrokenStream {
        data: Vec<u8>,
        served: bool,
    }

    impl Read for BrokenStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"));
            }
            self.served = true;
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            Ok(n)
        }
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(partial_path(Path::new("out/output.wav")), PathBuf::from("out/output.wav.part"));
    }

    #[test]
    fn test_stream_spans_many_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.wav");
        let payload: Vec<u8> = (0..CHUNK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();

        let expected = Some(payload.len() as u64);
        let written = stream_to_file(Cursor::new(payload.clone()), expected, &path).unwrap();

        assert_eq!(written, payload.len() as u64);
        assert_eq!(fs::read(&path).unwrap(), payload);
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn test_stream_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.wav");
        fs::write(&path, vec![1u8; 50_000]).unwrap();

        stream_to_file(Cursor::new(b"short".to_vec()), None, &path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"short");
    }

    #[test]
    fn test_mid_stream_failure_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.wav");
        let source = BrokenStream {
            data: vec![7u8; 1024],
            served: false,
        };

        let err = stream_to_file(source, Some(4096), &path).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert!(!path.exists());
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("output.wav");

        assert!(stream_to_file(Cursor::new(vec![0u8; 10]), None, &path).is_err());
        assert!(!path.exists());
    }
}
