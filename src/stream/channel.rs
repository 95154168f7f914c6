//! Background producer and its handoff queue

use crate::context::{Context, OperationContext};
use crate::dispatch::Api;
use crate::error::{Error, Result};
use crate::object::Object;
use crate::pagination::{decode_record, PageIter, RawRecord};
use futures::Stream;
use std::fmt;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Single-use decoder for one listed record.
///
/// The producer waits until the retriever is consumed, either by
/// [`ObjectRetriever::retrieve`] or by being dropped, before it offers the
/// next record.
pub struct ObjectRetriever<O: Object> {
    record: RawRecord,
    context: OperationContext,
    full: Option<(Api, Context)>,
    consumed: Option<oneshot::Sender<()>>,
    _object: PhantomData<fn() -> O>,
}

impl<O: Object> ObjectRetriever<O> {
    fn new(
        record: RawRecord,
        context: OperationContext,
        full: Option<(Api, Context)>,
        consumed: oneshot::Sender<()>,
    ) -> Self {
        Self {
            record,
            context,
            full,
            consumed: Some(consumed),
            _object: PhantomData,
        }
    }

    /// The undecoded record
    pub fn record(&self) -> &RawRecord {
        &self.record
    }

    /// Decode the record into `dest`, through `dest`'s decode hook if it has
    /// one
    pub async fn retrieve(self, dest: &mut O) -> Result<()> {
        decode_record(
            dest,
            &self.context,
            &self.record,
            self.full.as_ref().map(|(api, ctx)| (api, ctx)),
        )
        .await
    }
}

impl<O: Object> Drop for ObjectRetriever<O> {
    fn drop(&mut self) {
        if let Some(consumed) = self.consumed.take() {
            let _ = consumed.send(());
        }
    }
}

impl<O: Object> fmt::Debug for ObjectRetriever<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRetriever")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

/// In-order queue of [`ObjectRetriever`]s fed by one background task.
///
/// The queue closes once the listing is exhausted, fails, or the context is
/// cancelled. A channel that is neither drained nor cancelled keeps its task
/// parked.
pub struct ObjectChannel<O: Object> {
    receiver: mpsc::Receiver<ObjectRetriever<O>>,
    task: JoinHandle<Result<()>>,
}

impl<O: Object> ObjectChannel<O> {
    pub(crate) fn spawn(pages: PageIter<O>, ctx: Context) -> Self {
        let (sender, receiver) = mpsc::channel(1);
        let task = tokio::spawn(produce(pages, ctx, sender));
        Self { receiver, task }
    }

    /// Next retriever; `None` once the channel is closed
    pub async fn recv(&mut self) -> Option<ObjectRetriever<O>> {
        self.receiver.recv().await
    }

    /// Close the channel and wait for the producer.
    ///
    /// Returns the error that ended the listing early, if any. Retrievers
    /// still held by the caller must be consumed first.
    pub async fn finish(self) -> Result<()> {
        let Self { receiver, task } = self;
        drop(receiver);
        task.await
            .map_err(|e| Error::Other(format!("listing task failed: {e}")))?
    }
}

impl<O: Object> Unpin for ObjectChannel<O> {}

impl<O: Object> Stream for ObjectChannel<O> {
    type Item = ObjectRetriever<O>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

impl<O: Object> fmt::Debug for ObjectChannel<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectChannel")
            .field("finished", &self.task.is_finished())
            .finish_non_exhaustive()
    }
}

async fn produce<O: Object>(
    mut pages: PageIter<O>,
    ctx: Context,
    sender: mpsc::Sender<ObjectRetriever<O>>,
) -> Result<()> {
    let full = pages.full_objects();

    loop {
        let next = tokio::select! {
            next = pages.next_records() => next,
            () = ctx.cancelled() => {
                debug!("Listing cancelled");
                return Ok(());
            }
        };
        let Some((context, records)) = next else {
            break;
        };

        for record in records {
            let (consumed_tx, consumed_rx) = oneshot::channel();
            let retriever = ObjectRetriever::new(record, context.clone(), full.clone(), consumed_tx);

            tokio::select! {
                sent = sender.send(retriever) => {
                    if sent.is_err() {
                        debug!("Listing receiver dropped");
                        return Ok(());
                    }
                }
                () = ctx.cancelled() => {
                    debug!("Listing cancelled");
                    return Ok(());
                }
            }

            // A dropped retriever counts as consumed
            tokio::select! {
                _ = consumed_rx => {}
                () = ctx.cancelled() => {
                    debug!("Listing cancelled");
                    return Ok(());
                }
            }
        }
    }

    match pages.take_error() {
        None | Some(Error::Cancelled) => {
            debug!(
                pages = pages.current_page(),
                items = pages.state().total_fetched,
                "Listing finished"
            );
            Ok(())
        }
        Some(error) => {
            warn!(error = %error, "Listing stopped on error");
            Err(error)
        }
    }
}
