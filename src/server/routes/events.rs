//! Server-Sent Events stream of readings.

use axum::{
    extract::State,
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
};
use futures::stream::{self, Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;

use crate::fanout::Subscription;
use crate::server::state::AppState;

/// GET /events - Stream every published reading to this client.
///
/// The subscriber is registered before the response is returned and stays
/// registered until the body is dropped by the transport.
pub async fn events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let subscription = state.subscribe();
    tracing::debug!(
        subscriber = %subscription.id(),
        subscribers = state.registry().len(),
        "Subscriber connected"
    );

    (
        [(header::CONNECTION, "keep-alive")],
        Sse::new(reading_stream(subscription)).keep_alive(KeepAlive::default()),
    )
}

/// `: connected` first, then one `data:` event per queued message.
fn reading_stream(
    subscription: Subscription,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    let connected = stream::once(async {
        Ok::<_, Infallible>(Event::default().comment("connected"))
    });

    let readings = stream::unfold(subscription, |mut subscription| async move {
        let message = subscription.recv().await?;
        Some((
            Ok::<_, Infallible>(Event::default().data(message.as_str())),
            subscription,
        ))
    });

    connected.chain(readings)
}
