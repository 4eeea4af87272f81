use crate::{error::GoesCdnError, product::Product, satellite::Satellite, sequence::Timestamp};

pub const NESDIS_CDN_ROOT: &str = "https://cdn.star.nesdis.noaa.gov";

const SECTOR: &str = "CONUS";
const IMAGE_SIZE: &str = "416x250";

/// Builds CDN locations for ABI CONUS imagery.
#[derive(Clone, Debug)]
pub struct Catalog {
    root: String,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(NESDIS_CDN_ROOT)
    }
}

impl Catalog {
    pub fn new(root: &str) -> Self {
        Self {
            root: root.trim_end_matches('/').to_owned(),
        }
    }

    /// Look up the base location for a product key, e.g. "Sandwich" or "13".
    pub fn resolve(&self, key: &str, sat: Satellite) -> Result<(Product, String), GoesCdnError> {
        let prod: Product = key.parse()?;
        Ok((prod, self.base_location(prod, sat)))
    }

    pub fn base_location(&self, prod: Product, sat: Satellite) -> String {
        format!(
            "{}/GOES{}/ABI/{}/{}/",
            self.root,
            sat.number(),
            SECTOR,
            prod
        )
    }

    pub fn retrieval_location(
        base: &str,
        prod: Product,
        sat: Satellite,
        timestamp: Timestamp,
    ) -> String {
        format!(
            "{}{}_GOES{}-ABI-{}-{}-{}.jpg",
            base,
            timestamp,
            sat.number(),
            SECTOR,
            prod,
            IMAGE_SIZE
        )
    }

    pub fn file_name(prod: Product, timestamp: Timestamp) -> String {
        format!("{}_{}.jpg", prod, timestamp)
    }
}
