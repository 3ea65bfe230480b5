use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    extract::Extension,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use crate::app::services::AppServices;

/// Revalidation notices as server-sent events. Lagged receivers skip the
/// notices they missed.
pub async fn stream(
    Extension(services): Extension<Arc<AppServices>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.revalidator.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(notice) => {
            let data = serde_json::to_string(&notice).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event("revalidate").data(data)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
