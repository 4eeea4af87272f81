use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::error::GoesCdnError;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Named multi-band composites published for the CONUS sector.
///
/// Spelling is the CDN's directory name and must match exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr)]
pub enum Composite {
    Sandwich,
    #[strum(serialize = "DMW")]
    DerivedMotionWinds,
    DayNightCloudMicroCombo,
    FireTemperature,
    Dust,
    AirMass,
    #[strum(serialize = "GEOCOLOR")]
    GeoColor,
}

pub const NUM_BANDS: u8 = 16;

/// An ABI imagery product: a composite or a single spectral band (01..16).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Product {
    Composite(Composite),
    Band(u8),
}

impl Product {
    /// Every product the catalog knows about, composites first.
    pub fn all() -> impl Iterator<Item = Product> {
        Composite::iter()
            .map(Product::Composite)
            .chain((1..=NUM_BANDS).map(Product::Band))
    }
}

impl FromStr for Product {
    type Err = GoesCdnError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        if let Ok(composite) = key.parse::<Composite>() {
            return Ok(Product::Composite(composite));
        }

        // Bands are always exactly two ascii digits, "01" through "16".
        if key.len() == 2 && key.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(band) = key.parse::<u8>() {
                if (1..=NUM_BANDS).contains(&band) {
                    return Ok(Product::Band(band));
                }
            }
        }

        Err(GoesCdnError::UnknownProduct(key.to_owned()))
    }
}

impl Display for Product {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        match *self {
            Product::Composite(c) => {
                let key: &'static str = c.into();
                write!(f, "{}", key)
            }
            Product::Band(b) => write!(f, "{:02}", b),
        }
    }
}
