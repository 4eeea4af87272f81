use std::{
    ffi::OsString,
    fs::{self, File},
    io::{self, Read, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    download_log::DownloadLog,
    remote::{RemoteImagery, Retrieval},
};

/// How a single fetch attempt ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Persisted(PathBuf),
    SkippedExisting(PathBuf),
    NotFound,
    TransientError(String),
}

/// Downloads one image at a time and records each new file in the download log.
#[derive(Clone)]
pub struct Fetcher<RA: RemoteImagery> {
    remote: RA,
    log: Arc<DownloadLog>,
}

impl<RA: RemoteImagery> Fetcher<RA> {
    pub fn new(remote: RA, log: Arc<DownloadLog>) -> Self {
        Self { remote, log }
    }

    pub fn log(&self) -> &DownloadLog {
        &self.log
    }

    pub fn fetch(&self, location: &str, dest: &Path) -> Outcome {
        if dest.exists() {
            log::debug!("Skipping download for {:?}", dest);
            return Outcome::SkippedExisting(dest.to_path_buf());
        }

        let body = match self.remote.retrieve(location) {
            Ok(Retrieval::Found(body)) => body,
            Ok(Retrieval::Missing(code)) => {
                log::debug!("No image found at: {} ({})", location, code);
                return Outcome::NotFound;
            }
            Err(err) => {
                log::error!("Error accessing {}: {}", location, err);
                return Outcome::TransientError(err.to_string());
            }
        };

        let num_bytes = match save(body, dest) {
            Ok(num_bytes) => num_bytes,
            Err(err) => {
                log::error!("Error writing data to disk: {:?} : {}", dest, err);
                return Outcome::TransientError(format!("{}: {}", dest.display(), err));
            }
        };

        // An image without its log line would be skipped forever, so undo the write.
        if let Err(err) = self.log.append(dest) {
            log::error!(
                "Error appending to download log {:?} : {}",
                self.log.path(),
                err
            );
            if let Err(rm_err) = fs::remove_file(dest) {
                log::warn!("Unable to remove unlogged file {:?} : {}", dest, rm_err);
            }
            return Outcome::TransientError(format!("{}: {}", self.log.path().display(), err));
        }

        log::info!("Downloaded: {} ({} bytes)", location, num_bytes);
        Outcome::Persisted(dest.to_path_buf())
    }
}

/// Stream the body next to `dest` and move it into place once complete.
fn save(mut body: Box<dyn Read + Send>, dest: &Path) -> io::Result<u64> {
    let partial = partial_path(dest);

    let result = File::create(&partial).and_then(|mut f| {
        let num_bytes = io::copy(&mut body, &mut f)?;
        f.flush()?;
        fs::rename(&partial, dest)?;
        Ok(num_bytes)
    });

    if result.is_err() && partial.exists() {
        if let Err(err) = fs::remove_file(&partial) {
            log::warn!("Unable to remove partial file {:?} : {}", partial, err);
        }
    }

    result
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut pth: OsString = dest.as_os_str().to_owned();
    pth.push(".part");
    PathBuf::from(pth)
}
