//! Version endpoint probe.
//!
//! Issues a single HTTP/1.1 GET against an instance's version endpoint and
//! parses the body as a semantic version. The whole exchange, connect
//! included, runs under the probe's deadline.

use bytes::Bytes;
use http_body_util::{BodyExt, Empty, Limited};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tracing::debug;

use reaper_core::{ProbeTarget, SemanticVersion};

use crate::error::{ProviderError, ProviderResult};

/// Largest version response body accepted.
pub const MAX_BODY_BYTES: usize = 1024;

/// Fetch and parse the version reported by the instance at `address`.
pub async fn fetch_version(address: &str, target: &ProbeTarget) -> ProviderResult<SemanticVersion> {
    if !target.scheme.eq_ignore_ascii_case("http") {
        return Err(ProviderError::UnsupportedScheme(target.scheme.clone()));
    }

    let url = target.url_for(address);
    let authority = target.authority_for(address);

    let body = tokio::time::timeout(target.timeout, fetch_body(&authority, &target.path, &url))
        .await
        .map_err(|_| {
            debug!(%url, "version probe timed out");
            ProviderError::ProbeTimeout {
                url: url.clone(),
                timeout: target.timeout,
            }
        })??;

    Ok(SemanticVersion::from_response_body(&body)?)
}

async fn fetch_body(authority: &str, path: &str, url: &str) -> ProviderResult<String> {
    let stream = TcpStream::connect(authority)
        .await
        .map_err(|e| probe_error(url, e))?;

    let io = TokioIo::new(stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(|e| probe_error(url, e))?;

    // Drive the connection in the background.
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            debug!(error = %e, "version probe connection closed with error");
        }
    });

    let req = http::Request::builder()
        .method("GET")
        .uri(path)
        .header("host", authority)
        .header("user-agent", "reaper/0.1")
        .body(Empty::<Bytes>::new())
        .map_err(|e| probe_error(url, e))?;

    let resp = sender
        .send_request(req)
        .await
        .map_err(|e| probe_error(url, e))?;

    if !resp.status().is_success() {
        debug!(status = %resp.status(), %url, "version probe non-2xx");
        return Err(ProviderError::ProbeStatus {
            url: url.to_string(),
            status: resp.status().as_u16(),
        });
    }

    let bytes = Limited::new(resp.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| probe_error(url, e))?
        .to_bytes();

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn probe_error(url: &str, err: impl std::fmt::Display) -> ProviderError {
    ProviderError::Probe {
        url: url.to_string(),
        reason: err.to_string(),
    }
}
