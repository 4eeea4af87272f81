use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

pub const DOWNLOAD_LOG_FNAME: &str = "download_log.txt";

/// Append-only record of every persisted image, one path per line.
#[derive(Debug)]
pub struct DownloadLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl DownloadLog {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(DOWNLOAD_LOG_FNAME),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file is opened, written and flushed for every record, so the log survives a crash.
    pub fn append(&self, record: &Path) -> io::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(f, "{}", record.display())?;
        f.flush()
    }

    /// All records so far, oldest first. A missing log has no records.
    pub fn records(&self) -> io::Result<Vec<PathBuf>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => return Err(err),
        };

        Ok(contents
            .lines()
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect())
    }
}
