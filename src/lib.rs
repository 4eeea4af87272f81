/**************************************************************************************************
 *                                           Public API
 *************************************************************************************************/
pub use crate::{
    archive::{Archive, RunResult},
    catalog::{Catalog, NESDIS_CDN_ROOT},
    cdn_remote::{NesdisCdn, DEFAULT_TIMEOUT_SECS},
    config::{parse_date_time, Config},
    download_log::{DownloadLog, DOWNLOAD_LOG_FNAME},
    error::GoesCdnError,
    fetcher::{Fetcher, Outcome},
    product::{Composite, Product},
    remote::{RemoteImagery, Retrieval},
    satellite::Satellite,
    sequence::{MinuteSteps, TimeRange, Timestamp},
};
/**************************************************************************************************
 *                                      Private Implementation
 *************************************************************************************************/
mod archive;
mod catalog;
mod cdn_remote;
mod config;
mod download_log;
mod error;
mod fetcher;
mod product;
mod remote;
mod satellite;
mod sequence;
