use std::io::Read;

use crate::error::GoesCdnError;

/// What came back from a single request.
pub enum Retrieval {
    /// Status 200, with the body still to be read.
    Found(Box<dyn Read + Send>),
    /// Any other status code.
    Missing(u16),
}

/// A source of published imagery, addressed by full retrieval location.
pub trait RemoteImagery: Clone + Send {
    /// Errors returned here are network level failures: timeouts, refused connections, DNS.
    fn retrieve(&self, location: &str) -> Result<Retrieval, GoesCdnError>;
}
