use std::{
    fs::create_dir_all,
    path::{Path, PathBuf},
    sync::Arc,
    thread::{self, JoinHandle},
};

use crate::{
    catalog::Catalog,
    download_log::DownloadLog,
    error::GoesCdnError,
    fetcher::{Fetcher, Outcome},
    product::Product,
    remote::RemoteImagery,
    satellite::Satellite,
    sequence::TimeRange,
};
use crossbeam_channel::{bounded, Receiver, Sender};

/// Everything one run produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Newly persisted files, time-major then in product order.
    pub downloaded: Vec<PathBuf>,
    pub skipped: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl RunResult {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Persisted(pth) => self.downloaded.push(pth),
            Outcome::SkippedExisting(_) => self.skipped += 1,
            Outcome::NotFound => self.not_found += 1,
            Outcome::TransientError(_) => self.failed += 1,
        }
    }
}

/// A local directory of CDN imagery, filled from a remote.
pub struct Archive<T: RemoteImagery> {
    root: PathBuf,
    catalog: Catalog,
    remote: T,
    num_workers: usize,
}

impl<RA: 'static> Archive<RA>
where
    RA: RemoteImagery,
{
    pub fn connect<P>(root_path: P, remote: RA) -> Self
    where
        P: Into<PathBuf>,
    {
        let root = root_path.into();
        log::info!("Connected to archive at: {:?}", &root);
        Self {
            root,
            catalog: Catalog::default(),
            remote,
            num_workers: 1,
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// More than one worker fetches on a thread pool. The result order is unchanged.
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn download_log(&self) -> DownloadLog {
        DownloadLog::in_dir(&self.root)
    }

    /// Try every product at every minute of `range`.
    ///
    /// All product keys are resolved before anything is requested, so an unknown key fails the
    /// whole run up front. Individual fetch failures are counted and never abort the run.
    pub fn run<S>(
        &self,
        products: &[S],
        range: TimeRange,
        sat: Satellite,
    ) -> Result<RunResult, GoesCdnError>
    where
        S: AsRef<str>,
    {
        if products.is_empty() {
            return Err(GoesCdnError::NoProducts);
        }

        let resolved = products
            .iter()
            .map(|key| self.catalog.resolve(key.as_ref(), sat))
            .collect::<Result<Vec<_>, _>>()?;

        let range = Self::validate_dates(sat, range)?;

        if !self.root.exists() {
            log::debug!("Creating path: {:?}", &self.root);
            create_dir_all(&self.root)?;
        }

        let fetcher = Fetcher::new(self.remote.clone(), Arc::new(self.download_log()));
        let attempts = self.attempts(&resolved, sat, range);

        let result = if self.num_workers > 1 {
            self.run_pooled(fetcher, attempts)?
        } else {
            let mut result = RunResult::default();
            for attempt in attempts {
                result.record(fetcher.fetch(&attempt.location, &attempt.dest));
            }
            result
        };

        log::info!(
            "Finished: {} downloaded, {} skipped, {} not found, {} failed",
            result.downloaded.len(),
            result.skipped,
            result.not_found,
            result.failed
        );

        Ok(result)
    }
}

// Private methods and associated functions.

const CHANNEL_CAPACITY: usize = 100;

struct Attempt {
    location: String,
    dest: PathBuf,
}

impl<RA: 'static> Archive<RA>
where
    RA: RemoteImagery,
{
    fn attempts<'a>(
        &'a self,
        resolved: &'a [(Product, String)],
        sat: Satellite,
        range: TimeRange,
    ) -> impl Iterator<Item = Attempt> + 'a {
        range.minutes().flat_map(move |timestamp| {
            resolved.iter().map(move |(prod, base)| Attempt {
                location: Catalog::retrieval_location(base, *prod, sat, timestamp),
                dest: self.root.join(Catalog::file_name(*prod, timestamp)),
            })
        })
    }

    fn run_pooled(
        &self,
        fetcher: Fetcher<RA>,
        attempts: impl Iterator<Item = Attempt>,
    ) -> Result<RunResult, GoesCdnError> {
        let (to_downloader, needs_downloaded) = bounded(CHANNEL_CAPACITY);
        let (to_accumulator, outcomes) = bounded(CHANNEL_CAPACITY);

        let accum_thrd = Self::start_accumulator_thread(outcomes)?;
        self.start_download_threads(fetcher, needs_downloaded, to_accumulator);

        for attempt in attempts.enumerate() {
            to_downloader
                .send(attempt)
                .map_err(|_| GoesCdnError::Worker("download threads stopped early".into()))?;
        }

        drop(to_downloader);
        accum_thrd
            .join()
            .map_err(|_| GoesCdnError::Worker("accumulator thread panicked".into()))
    }

    fn start_download_threads(
        &self,
        fetcher: Fetcher<RA>,
        attempts: Receiver<(usize, Attempt)>,
        to_accumulator: Sender<(usize, Outcome)>,
    ) {
        let pool = threadpool::ThreadPool::with_name("Download Thread".to_owned(), self.num_workers);

        for _ in 0..self.num_workers {
            let fetcher = fetcher.clone();
            let attempts = attempts.clone();
            let to_accumulator = to_accumulator.clone();

            pool.execute(move || {
                for (idx, attempt) in attempts {
                    let outcome = fetcher.fetch(&attempt.location, &attempt.dest);
                    if to_accumulator.send((idx, outcome)).is_err() {
                        log::error!("Accumulator hung up, stopping download thread");
                        return;
                    }
                }
            });
        }
    }

    fn start_accumulator_thread(
        outcomes: Receiver<(usize, Outcome)>,
    ) -> Result<JoinHandle<RunResult>, GoesCdnError> {
        let th = thread::Builder::new()
            .name("Outcome Accumulator".to_owned())
            .spawn(move || {
                let mut result = RunResult::default();
                let mut persisted = vec![];

                for (idx, outcome) in outcomes {
                    match outcome {
                        Outcome::Persisted(pth) => persisted.push((idx, pth)),
                        other => result.record(other),
                    }
                }

                persisted.sort_by_key(|(idx, _)| *idx);
                result.downloaded = persisted.into_iter().map(|(_, pth)| pth).collect();
                result
            })?;

        Ok(th)
    }

    fn validate_dates(sat: Satellite, range: TimeRange) -> Result<TimeRange, GoesCdnError> {
        log::info!("start - {} end {}", range.start(), range.end());

        let earliest = sat.earliest_operational_date();
        if range.start() >= earliest {
            return Ok(range);
        }

        log::warn!("valid start time was adjusted to start - {}", earliest);
        TimeRange::new(earliest, range.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fetcher::test_util::{Canned, FakeRemote},
        sequence::Timestamp,
    };
    use chrono::{naive::NaiveDateTime, NaiveDate};
    use std::{collections::HashMap, fs};
    use tempfile::tempdir;

    const ROOT: &str = "http://cdn.test";

    fn at(d: u32, hh: u32, mm: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(hh, mm, 0)
            .unwrap()
    }

    fn url(key: &str, time: NaiveDateTime) -> String {
        let catalog = Catalog::new(ROOT);
        let (prod, base) = catalog.resolve(key, Satellite::GOES18).unwrap();
        Catalog::retrieval_location(&base, prod, Satellite::GOES18, Timestamp::from(time))
    }

    fn archive(root: &Path, remote: FakeRemote) -> Archive<FakeRemote> {
        Archive::connect(root, remote).with_catalog(Catalog::new(ROOT))
    }

    fn sparse_remote() -> FakeRemote {
        FakeRemote::new(HashMap::from([
            (url("Sandwich", at(3, 14, 1)), Canned::Image(b"s1".to_vec())),
            (url("13", at(3, 14, 1)), Canned::Image(b"b1".to_vec())),
            (url("13", at(3, 14, 6)), Canned::Image(b"b6".to_vec())),
            (url("Sandwich", at(3, 14, 6)), Canned::Image(b"s6".to_vec())),
            (url("Sandwich", at(3, 14, 3)), Canned::Unreachable),
            (url("13", at(3, 14, 4)), Canned::Status(500)),
        ]))
    }

    #[test]
    fn all_missing_writes_nothing() {
        let dir = tempdir().unwrap();
        let save_dir = dir.path().join("images");
        let remote = FakeRemote::default();
        let range = TimeRange::new(at(3, 14, 0), at(3, 15, 0)).unwrap();

        let result = archive(&save_dir, remote.clone())
            .run(&["Sandwich"], range, Satellite::GOES18)
            .unwrap();

        assert!(result.downloaded.is_empty());
        assert_eq!(result.not_found, 60);
        assert_eq!(remote.requests().len(), 60);
        assert_eq!(remote.requests()[0], url("Sandwich", at(3, 14, 0)));
        assert_eq!(fs::read_dir(&save_dir).unwrap().count(), 0);
    }

    #[test]
    fn results_are_time_major_then_product_order() {
        let dir = tempdir().unwrap();
        let range = TimeRange::new(at(3, 14, 0), at(3, 14, 10)).unwrap();
        let archive = archive(dir.path(), sparse_remote());

        let result = archive.run(&["Sandwich", "13"], range, Satellite::GOES18).unwrap();

        let expected: Vec<PathBuf> = [
            "Sandwich_20240031401.jpg",
            "13_20240031401.jpg",
            "Sandwich_20240031406.jpg",
            "13_20240031406.jpg",
        ]
        .iter()
        .map(|f| dir.path().join(f))
        .collect();

        assert_eq!(result.downloaded, expected);
        assert_eq!(result.failed, 1);
        assert_eq!(result.not_found, 20 - 4 - 1);
        assert_eq!(archive.download_log().records().unwrap(), expected);
        assert_eq!(fs::read(&expected[3]).unwrap(), b"b6");
    }

    #[test]
    fn second_run_skips_existing_files() {
        let dir = tempdir().unwrap();
        let range = TimeRange::new(at(3, 14, 0), at(3, 14, 10)).unwrap();
        let remote = sparse_remote();
        let archive = archive(dir.path(), remote.clone());

        let first = archive.run(&["Sandwich", "13"], range, Satellite::GOES18).unwrap();
        let log_after_first = fs::read_to_string(archive.download_log().path()).unwrap();
        let requests_after_first = remote.requests().len();

        let second = archive.run(&["Sandwich", "13"], range, Satellite::GOES18).unwrap();

        assert_eq!(first.downloaded.len(), 4);
        assert!(second.downloaded.is_empty());
        assert_eq!(second.skipped, 4);
        assert_eq!(remote.requests().len() - requests_after_first, 20 - 4);
        assert_eq!(
            fs::read_to_string(archive.download_log().path()).unwrap(),
            log_after_first
        );
    }

    #[test]
    fn log_grows_only_by_new_downloads() {
        let dir = tempdir().unwrap();
        let remote = sparse_remote();
        let archive = archive(dir.path(), remote);

        let early = TimeRange::new(at(3, 14, 0), at(3, 14, 5)).unwrap();
        let full = TimeRange::new(at(3, 14, 0), at(3, 14, 10)).unwrap();

        archive.run(&["Sandwich", "13"], early, Satellite::GOES18).unwrap();
        assert_eq!(archive.download_log().records().unwrap().len(), 2);

        let result = archive.run(&["Sandwich", "13"], full, Satellite::GOES18).unwrap();
        assert_eq!(result.downloaded.len(), 2);
        assert_eq!(result.skipped, 2);
        assert_eq!(archive.download_log().records().unwrap().len(), 4);
    }

    #[test]
    fn unknown_product_fails_before_any_request() {
        let dir = tempdir().unwrap();
        let save_dir = dir.path().join("images");
        let remote = FakeRemote::default();
        let range = TimeRange::new(at(3, 14, 0), at(3, 15, 0)).unwrap();

        let err = archive(&save_dir, remote.clone())
            .run(&["Sandwich", "GeoColor"], range, Satellite::GOES18)
            .unwrap_err();

        assert!(matches!(err, GoesCdnError::UnknownProduct(k) if k == "GeoColor"));
        assert!(remote.requests().is_empty());
        assert!(!save_dir.exists());
    }

    #[test]
    fn no_products_is_an_error() {
        let dir = tempdir().unwrap();
        let range = TimeRange::new(at(3, 14, 0), at(3, 15, 0)).unwrap();
        let products: [&str; 0] = [];

        let err = archive(dir.path(), FakeRemote::default())
            .run(&products, range, Satellite::GOES18)
            .unwrap_err();
        assert!(matches!(err, GoesCdnError::NoProducts));
    }

    #[test]
    fn pooled_run_matches_sequential_run() {
        let range = TimeRange::new(at(3, 14, 0), at(3, 14, 10)).unwrap();

        let seq_dir = tempdir().unwrap();
        let sequential = archive(seq_dir.path(), sparse_remote())
            .run(&["Sandwich", "13"], range, Satellite::GOES18)
            .unwrap();

        let pool_dir = tempdir().unwrap();
        let pooled_archive = archive(pool_dir.path(), sparse_remote()).with_workers(4);
        let pooled = pooled_archive
            .run(&["Sandwich", "13"], range, Satellite::GOES18)
            .unwrap();

        let names = |result: &RunResult| -> Vec<PathBuf> {
            result
                .downloaded
                .iter()
                .map(|p| PathBuf::from(p.file_name().unwrap()))
                .collect()
        };

        assert_eq!(names(&pooled), names(&sequential));
        assert_eq!(pooled.skipped, sequential.skipped);
        assert_eq!(pooled.not_found, sequential.not_found);
        assert_eq!(pooled.failed, sequential.failed);

        let mut logged = pooled_archive.download_log().records().unwrap();
        logged.sort();
        let mut downloaded = pooled.downloaded.clone();
        downloaded.sort();
        assert_eq!(logged, downloaded);
    }

    #[test]
    fn start_is_clamped_to_first_operational_day() {
        let dir = tempdir().unwrap();
        let remote = FakeRemote::default();
        let first_day = Satellite::GOES18.earliest_operational_date();
        let range = TimeRange::new(
            first_day - chrono::Duration::minutes(3),
            first_day + chrono::Duration::minutes(2),
        )
        .unwrap();

        archive(dir.path(), remote.clone())
            .run(&["Dust"], range, Satellite::GOES18)
            .unwrap();

        let requests = remote.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].contains("20230040000_GOES18"));
    }

    #[test]
    fn range_entirely_before_the_satellite_is_invalid() {
        let dir = tempdir().unwrap();
        let first_day = Satellite::GOES18.earliest_operational_date();
        let range = TimeRange::new(
            first_day - chrono::Duration::hours(2),
            first_day - chrono::Duration::hours(1),
        )
        .unwrap();

        let err = archive(dir.path(), FakeRemote::default())
            .run(&["Dust"], range, Satellite::GOES18)
            .unwrap_err();
        assert!(matches!(err, GoesCdnError::InvalidTimeRange { .. }));
    }
}
