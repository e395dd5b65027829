//! Outbound reachability checks for link targets.
//!
//! The only network I/O in the workspace. Every request is bounded by a
//! connect and total timeout, and redirects are followed a limited number of
//! times; a failure is reported as a [`ProbeError`], never a panic.

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use url::Url;

const USER_AGENT: &str = "inkguard-linkcheck/0.1";
const MAX_REDIRECTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("client build error: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
}

impl ProbeError {
    pub fn is_timeout(&self) -> bool {
        match self {
            ProbeError::Client(e) | ProbeError::Transport { source: e, .. } => e.is_timeout(),
            ProbeError::Status { .. } => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeResult {
    /// URL after redirects.
    pub url: String,
    pub status: u16,
    pub duration_ms: u128,
}

/// Blocking HTTP prober. Cheap to clone; the connection pool is shared.
#[derive(Clone, Debug)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProbeError::Client)?;
        Ok(Self { client })
    }

    /// Issues a `HEAD`, retrying once as `GET` for servers that refuse `HEAD`.
    pub fn probe(&self, url: &Url) -> Result<ProbeResult, ProbeError> {
        let start = Instant::now();
        let transport = |source| ProbeError::Transport {
            url: url.to_string(),
            source,
        };

        let mut resp = self
            .client
            .head(url.as_str())
            .send()
            .map_err(transport)?;
        if matches!(
            resp.status(),
            StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
        ) {
            log::debug!(target: "net.probe", "HEAD refused by {url}, retrying with GET");
            resp = self.client.get(url.as_str()).send().map_err(transport)?;
        }

        let status = resp.status();
        let final_url = resp.url().to_string();
        let duration_ms = start.elapsed().as_millis();
        log::debug!(
            target: "net.probe",
            "{url} -> {} in {duration_ms}ms",
            status.as_u16()
        );

        if status.is_client_error() || status.is_server_error() {
            return Err(ProbeError::Status {
                url: final_url,
                status: status.as_u16(),
            });
        }

        Ok(ProbeResult {
            url: final_url,
            status: status.as_u16(),
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn serve_once(response: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            // HEAD may be followed by a GET retry; answer up to two requests.
            for _ in 0..2 {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        Url::parse(&format!("http://{addr}/page")).unwrap()
    }

    #[test]
    fn reachable_target_reports_status() {
        let url = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let prober = HttpProber::new(Duration::from_secs(2)).unwrap();
        let result = prober.probe(&url).unwrap();
        assert_eq!(result.status, 200);
    }

    #[test]
    fn error_status_is_reported_as_error() {
        let url =
            serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let prober = HttpProber::new(Duration::from_secs(2)).unwrap();
        let err = prober.probe(&url).unwrap_err();
        assert!(matches!(err, ProbeError::Status { status: 404, .. }), "{err}");
        assert!(!err.is_timeout());
    }

    #[test]
    fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            // Hold the connection open without ever answering.
            if let Ok((stream, _)) = listener.accept() {
                thread::sleep(Duration::from_secs(5));
                drop(stream);
            }
        });
        let url = Url::parse(&format!("http://{addr}/slow")).unwrap();
        let prober = HttpProber::new(Duration::from_millis(200)).unwrap();
        let start = Instant::now();
        let err = prober.probe(&url).unwrap_err();
        assert!(matches!(err, ProbeError::Transport { .. }), "{err}");
        assert!(err.is_timeout(), "{err}");
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn refused_connection_is_a_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let url = Url::parse(&format!("http://{addr}/")).unwrap();
        let prober = HttpProber::new(Duration::from_secs(2)).unwrap();
        let err = prober.probe(&url).unwrap_err();
        assert!(matches!(err, ProbeError::Transport { .. }), "{err}");
    }
}
