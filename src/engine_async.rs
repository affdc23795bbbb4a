//! Timer-driven polling of an [`IngestEngine`] as an async stream.

use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::time::{Interval, MissedTickBehavior};

use crate::engine::{Batch, IngestEngine};
use crate::error::FileError;

/// Poll `engine` once per `period` and yield every non-empty batch.
///
/// The stream ends after the batch marked `last`, or after the first error.
/// An engine built with `following(true)` never produces a last batch, so
/// the stream runs until the caller drops it.
pub fn follow(engine: IngestEngine, period: Duration) -> BoxStream<'static, Result<Batch, FileError>> {
    stream::unfold(Some((engine, None::<Interval>)), move |state| async move {
        let (mut engine, ticker) = state?;
        let mut ticker = ticker.unwrap_or_else(|| {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            ticker.tick().await;
            match engine.poll() {
                Ok(batch) if batch.last => return Some((Ok(batch), None)),
                Ok(batch) if batch.records.is_empty() && batch.failures.is_empty() => continue,
                Ok(batch) => return Some((Ok(batch), Some((engine, Some(ticker))))),
                Err(e) => {
                    engine.close();
                    return Some((Err(e), None));
                }
            }
        }
    })
    .boxed()
}
