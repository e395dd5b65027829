//! Reachability checks for link targets.

use std::collections::BTreeSet;

use net::{HttpProber, ProbeError};
use url::Url;

pub trait LinkProber: Send + Sync {
    fn probe(&self, url: &Url) -> Result<(), ProbeError>;
}

impl LinkProber for HttpProber {
    fn probe(&self, url: &Url) -> Result<(), ProbeError> {
        HttpProber::probe(self, url).map(|_| ())
    }
}

/// Prober answering from a fixed set of reachable URLs; everything else
/// reports a 404.
#[derive(Clone, Debug, Default)]
pub struct StaticProber {
    reachable: BTreeSet<String>,
}

impl StaticProber {
    pub fn reachable<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let reachable = urls
            .into_iter()
            .filter_map(|u| Url::parse(u.as_ref()).ok())
            .map(String::from)
            .collect();
        Self { reachable }
    }
}

impl LinkProber for StaticProber {
    fn probe(&self, url: &Url) -> Result<(), ProbeError> {
        if self.reachable.contains(url.as_str()) {
            Ok(())
        } else {
            Err(ProbeError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_prober_normalizes_urls() {
        let prober = StaticProber::reachable(["HTTPS://Example.org"]);
        assert!(prober.probe(&Url::parse("https://example.org/").unwrap()).is_ok());
        let err = prober
            .probe(&Url::parse("https://example.org/missing").unwrap())
            .unwrap_err();
        assert!(matches!(err, ProbeError::Status { status: 404, .. }));
    }
}
