//! Stream endpoint.
//!
//! Responsibilities:
//! - Refuse new streams once draining has started
//! - Admission: one slot per open stream, keyed by caller IP
//! - Validate `url`, then one pre-flight probe
//! - Start the probe loop and relay measurements as SSE `data:` frames
//! - End on target failure, client disconnect (body dropped), or drain
//!
//! The slot lives inside the session, which lives inside the response body
//! stream, so every exit path releases it.

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Query, State},
    http::{header, HeaderName, HeaderValue},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
};
use futures_util::{stream, Stream, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;

use pingstream_core::error::{PingStreamError, Result};
use pingstream_core::protocol::{Measurement, StreamEvent};

use crate::app_state::AppState;
use crate::context::{EndReason, SessionMeta, StreamSession};
use crate::probe::{parse_target, spawn_probe_loop};
use crate::transport::ApiError;

pub const X_CONNECTION_LIMIT: HeaderName = HeaderName::from_static("x-connectionlimit-limit");
pub const X_CONNECTION_REMAINING: HeaderName =
    HeaderName::from_static("x-connectionlimit-remaining");

// --------------------
// Query parsing
// --------------------
#[derive(Debug, Default)]
pub struct StreamQuery {
    pub url: Option<String>,
}

impl StreamQuery {
    /// First `url` value wins; repeated keys and unrelated params are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let url = pairs.into_iter().find(|(k, _)| k == "url").map(|(_, v)| v);
        Self { url }
    }
}

// --------------------
// Entry
// --------------------
pub async fn serve_stream(
    State(app): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    query: Option<Query<Vec<(String, String)>>>,
) -> std::result::Result<Response, ApiError> {
    let client = peer.ip();
    let query = query
        .map(|Query(pairs)| StreamQuery::from_pairs(pairs))
        .unwrap_or_default();

    open_stream(&app, client, query).await.map_err(|e| {
        app.metrics().rejections.inc(e.reason());
        match e {
            PingStreamError::ConnectionLimit => {
                tracing::warn!(%client, limit = app.admission().limit(), "stream rejected: connection limit")
            }
            _ => tracing::info!(%client, reason = e.reason(), "stream rejected"),
        }
        e.into()
    })
}

/// Every method other than GET on the stream route.
pub async fn method_not_allowed(State(app): State<AppState>) -> ApiError {
    let e = PingStreamError::MethodNotAllowed;
    app.metrics().rejections.inc(e.reason());
    e.into()
}

// --------------------
// Admission + validation
// --------------------
async fn open_stream(app: &AppState, client: IpAddr, query: StreamQuery) -> Result<Response> {
    // A stream admitted now would end on its first poll.
    if app.is_draining() {
        return Err(PingStreamError::Draining);
    }

    // Admission next; the slot is released on any early return below.
    let slot = app
        .admission()
        .acquire_slot(client)
        .ok_or(PingStreamError::ConnectionLimit)?;

    let target = parse_target(query.url.as_deref())?;

    if let Err(e) = app.prober().probe(&target).await {
        tracing::debug!(%client, %target, error = %e, "pre-flight probe failed");
        return Err(PingStreamError::Unreachable);
    }

    let limit = slot.limit();
    let remaining = slot.remaining();

    let session = StreamSession::open(
        SessionMeta {
            client,
            target: target.clone(),
        },
        slot,
        app.metrics(),
    );

    let probe = {
        let _entered = session.span().enter();
        spawn_probe_loop(app.prober(), target)
    };

    let events = measurement_events(probe.measurements, session, app.drain_signal());

    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream")),
        (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
        (header::CONNECTION, HeaderValue::from_static("keep-alive")),
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
        (X_CONNECTION_LIMIT, HeaderValue::from(limit)),
        (X_CONNECTION_REMAINING, HeaderValue::from(remaining)),
    ];

    Ok((headers, Sse::new(events)).into_response())
}

// --------------------
// Consumer side
// --------------------
struct EventFeed {
    measurements: ReceiverStream<Measurement>,
    drain: watch::Receiver<bool>,
    session: StreamSession,
}

enum Next {
    Measurement(Option<Measurement>),
    Drain,
}

/// Relay measurements as SSE events in produced order.
///
/// Ends when the producer stops (target failure), when draining starts, or
/// after yielding an encode error. If the connection drops the stream is
/// dropped with it, which closes the receiver and stops the producer.
pub fn measurement_events(
    measurements: mpsc::Receiver<Measurement>,
    session: StreamSession,
    drain: watch::Receiver<bool>,
) -> impl Stream<Item = std::result::Result<Event, axum::Error>> + Send + 'static {
    let feed = EventFeed {
        measurements: ReceiverStream::new(measurements),
        drain,
        session,
    };

    stream::unfold(Some(feed), |feed| async move {
        let mut feed = feed?;

        let next = tokio::select! {
            m = feed.measurements.next() => Next::Measurement(m),
            _ = drain_started(&mut feed.drain) => Next::Drain,
        };

        let m = match next {
            Next::Measurement(Some(m)) => m,
            Next::Measurement(None) => {
                feed.session.end(EndReason::TargetFailed);
                return None;
            }
            Next::Drain => {
                feed.session.end(EndReason::Shutdown);
                return None;
            }
        };

        match StreamEvent::from_measurement(m).to_json() {
            Ok(json) => {
                feed.session.record_delivery(m);
                Some((Ok(Event::default().data(json)), Some(feed)))
            }
            Err(e) => {
                feed.session.end(EndReason::EncodeFailed);
                Some((Err(axum::Error::new(e)), None))
            }
        }
    })
}

async fn drain_started(drain: &mut watch::Receiver<bool>) {
    let sender_gone = drain.wait_for(|draining| *draining).await.is_err();
    if sender_gone {
        // State dropped without draining; nothing will ever signal.
        std::future::pending::<()>().await;
    }
}
