use std::fmt::{Display, Formatter};

use crate::error::GoesCdnError;
use chrono::naive::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use strum::{EnumIter, EnumString, IntoStaticStr};

/// A GOES satellite whose ABI imagery is published on the CDN.
///
/// The static string is the two digit number the CDN uses in its paths and file names.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr, Deserialize,
)]
#[serde(try_from = "String")]
#[strum(ascii_case_insensitive)]
pub enum Satellite {
    #[strum(to_string = "16", serialize = "GOES16", serialize = "G16")]
    GOES16,
    #[strum(to_string = "17", serialize = "GOES17", serialize = "G17")]
    GOES17,
    #[strum(to_string = "18", serialize = "GOES18", serialize = "G18", serialize = "west")]
    GOES18,
    #[strum(to_string = "19", serialize = "GOES19", serialize = "G19", serialize = "east")]
    GOES19,
}

impl Satellite {
    /// Two digit identifier, e.g. "18".
    pub fn number(&self) -> &'static str {
        (*self).into()
    }

    pub fn earliest_operational_date(&self) -> NaiveDateTime {
        let (year, month, day) = match *self {
            Satellite::GOES16 => (2017, 12, 18),
            Satellite::GOES17 => (2019, 2, 12),
            Satellite::GOES18 => (2023, 1, 4),
            Satellite::GOES19 => (2025, 4, 7),
        };

        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }
}

impl Display for Satellite {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "GOES-{}", self.number())
    }
}

impl TryFrom<String> for Satellite {
    type Error = GoesCdnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .trim()
            .parse()
            .map_err(|_| GoesCdnError::UnknownSatellite(value))
    }
}
