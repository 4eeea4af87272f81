use std::time::Duration;

use crate::{
    error::GoesCdnError,
    remote::{RemoteImagery, Retrieval},
};
use reqwest::{blocking::Client, redirect::Policy, Proxy, StatusCode};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Blocking HTTP access to the NESDIS STAR imagery CDN.
#[derive(Debug, Clone)]
pub struct NesdisCdn {
    client: Client,
}

impl NesdisCdn {
    pub fn connect(timeout: Duration, proxy: Option<&str>) -> Result<Self, GoesCdnError> {
        let mut builder = Client::builder().timeout(timeout).redirect(Policy::none());

        // Only an explicitly configured proxy is used, never the environment's.
        builder = match proxy {
            Some(proxy) => {
                log::info!("Using proxy: {}", proxy);
                builder.proxy(Proxy::all(proxy)?)
            }
            None => builder.no_proxy(),
        };

        let client = builder.build()?;

        Ok(NesdisCdn { client })
    }
}

impl RemoteImagery for NesdisCdn {
    fn retrieve(&self, location: &str) -> Result<Retrieval, GoesCdnError> {
        let response = self.client.get(location).send()?;
        let status = response.status();

        if status != StatusCode::OK {
            return Ok(Retrieval::Missing(status.as_u16()));
        }

        Ok(Retrieval::Found(Box::new(response)))
    }
}
