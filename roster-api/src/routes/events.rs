/// Roster update stream
///
/// `GET /api/roster/updates`
///
/// A Server-Sent-Events stream for signed-in clients. Only heartbeats are
/// sent; clients use them to notice a dropped connection. The first
/// heartbeat arrives one full period after connecting.
///
/// # Event format
///
/// ```text
/// data: {"type":"heartbeat","timestamp":"2024-06-01T09:00:30.000Z"}
/// ```
///
/// The timer belongs to the stream, so it stops as soon as the client goes
/// away and axum drops the response body.

use crate::app::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
    Extension,
};
use chrono::{SecondsFormat, Utc};
use futures::stream::Stream;
use roster_shared::auth::middleware::AuthContext;
use serde::Serialize;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_stream::{wrappers::IntervalStream, StreamExt as _};

/// Payload of a heartbeat event
#[derive(Debug, Serialize)]
pub struct Heartbeat {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub timestamp: String,
}

impl Heartbeat {
    pub fn now() -> Self {
        Self {
            kind: "heartbeat",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Logs when a client's stream is torn down
struct StreamGuard {
    user_id: i64,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        tracing::debug!(user_id = self.user_id, "Roster update stream closed");
    }
}

/// SSE handler
pub async fn roster_updates(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let period = Duration::from_secs(state.config.api.sse_heartbeat_secs);

    tracing::debug!(
        user_id = auth.user_id,
        period_secs = period.as_secs(),
        "Roster update stream opened"
    );

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let guard = StreamGuard {
        user_id: auth.user_id,
    };

    let stream = IntervalStream::new(ticker).map(move |_| {
        let _ = &guard;
        Event::default().json_data(Heartbeat::now())
    });

    Sse::new(stream)
}
