// Server-sent event framing for live feed batches
use crate::domain::metric::DataPoint;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use tokio::sync::mpsc;

#[derive(Serialize)]
struct FeedEvent<'a> {
    data: &'a [DataPoint],
}

/// JSON payload of one event: `{"data":[...]}`
pub fn feed_payload(batch: &[DataPoint]) -> serde_json::Result<String> {
    serde_json::to_string(&FeedEvent { data: batch })
}

/// Turn a feed receiver into an SSE response. Dropping the response (client
/// disconnect) drops the receiver, which stops the feed task.
pub fn sse_from_receiver(
    mut rx: mpsc::Receiver<Vec<DataPoint>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        while let Some(batch) = rx.recv().await {
            match feed_payload(&batch) {
                Ok(payload) => yield Ok(Event::default().data(payload)),
                Err(e) => tracing::warn!("Dropping feed batch: {}", e),
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::Category;

    #[test]
    fn test_feed_payload_wraps_batch() {
        let batch = vec![DataPoint::new(10, 1.0, 2.0, 3.0, Category::Network, 4)];
        let payload: serde_json::Value =
            serde_json::from_str(&feed_payload(&batch).unwrap()).unwrap();

        assert_eq!(payload["data"].as_array().unwrap().len(), 1);
        assert_eq!(payload["data"][0]["category"], "Network");
        assert_eq!(payload["data"][0]["id"], 4);

        assert_eq!(feed_payload(&[]).unwrap(), r#"{"data":[]}"#);
    }
}
