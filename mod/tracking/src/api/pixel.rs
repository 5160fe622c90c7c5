use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, HeaderName, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tracing::debug;

use pixeltrack_core::ServiceError;

use super::AppState;

/// Transparent 1×1 PNG served to every pixel request.
const PIXEL_PNG: &[u8] = include_bytes!("static/pixel.png");

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

pub fn routes() -> Router<AppState> {
    Router::new().route("/pixel", get(serve_pixel))
}

/// Record the request as a tracking hit and answer with the pixel image.
async fn serve_pixel(
    State(svc): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ServiceError> {
    let ip = client_ip(&headers, &peer);
    let user_agent = header_str(&headers, &header::USER_AGENT);
    let referer = header_str(&headers, &header::REFERER);

    let pixel = svc.record_hit(Some(ip), user_agent, referer)?;
    debug!(id = %pixel.id, "recorded pixel hit");

    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-store, max-age=0"),
        ],
        PIXEL_PNG,
    ))
}

/// Client address: first hop of `X-Forwarded-For` when present (the service
/// normally sits behind a reverse proxy), else the socket peer address.
fn client_ip(headers: &HeaderMap, peer: &SocketAddr) -> String {
    if let Some(forwarded) = headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    peer.ip().to_string()
}

fn header_str(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "192.0.2.1:4711".parse().unwrap()
    }

    #[test]
    fn pixel_asset_is_a_png() {
        assert_eq!(&PIXEL_PNG[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(PIXEL_PNG.len(), 68);
    }

    #[test]
    fn client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers, &peer()), "203.0.113.7");
    }

    #[test]
    fn client_ip_falls_back_to_peer() {
        assert_eq!(client_ip(&HeaderMap::new(), &peer()), "192.0.2.1");
    }

    #[test]
    fn client_ip_ignores_empty_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("  "));
        assert_eq!(client_ip(&headers, &peer()), "192.0.2.1");
    }

    #[test]
    fn header_str_skips_non_utf8() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap(),
        );
        assert!(header_str(&headers, &header::USER_AGENT).is_none());
    }
}
