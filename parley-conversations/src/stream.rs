//! Bridge from callback-driven native subscriptions to [`futures::Stream`].
//!
//! The native engine pushes items into a [`StreamCallback`] and hands back a
//! [`StreamCloser`]. [`open_stream`] wraps that pair in an [`ItemStream`]:
//! lazy (nothing subscribes until the first poll), cancellable (by
//! [`ItemStream::cancel`] or drop), and guaranteed to call
//! [`StreamCloser::end`] exactly once however the stream finishes.

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FusedStream, Stream};
use parking_lot::Mutex;
use parley_types::{ParleyError, ParleyResult};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// Sink the native engine delivers subscription events into.
///
/// Called from arbitrary threads; implementations must not block.
pub trait StreamCallback<T>: Send + Sync {
    fn on_item(&self, item: T);

    /// Terminal: no further items are delivered after an error.
    fn on_error(&self, error: ParleyError);

    /// Natural end of the subscription.
    fn on_close(&self);
}

/// Handle that tears down a live native subscription.
#[async_trait]
pub trait StreamCloser: Send + Sync {
    async fn end(&self) -> ParleyResult<()>;
}

/// Lifecycle of an [`ItemStream`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    /// Not yet polled; nothing subscribed.
    Unattached,
    /// Subscription started.
    Active,
    /// Terminal.
    Closed,
}

const UNATTACHED: u8 = 0;
const ACTIVE: u8 = 1;
const CLOSED: u8 = 2;

enum Event<T> {
    Item(T),
    Error(ParleyError),
    Closed,
}

/// State shared between the consumer, the emitter and the subscribe task.
struct Shared {
    state: AtomicU8,
    /// One-shot guard: whoever flips it owns teardown.
    closing: AtomicBool,
    closer: Mutex<Option<Box<dyn StreamCloser>>>,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(UNATTACHED),
            closing: AtomicBool::new(false),
            closer: Mutex::new(None),
        }
    }

    fn state(&self) -> StreamState {
        match self.state.load(Ordering::SeqCst) {
            UNATTACHED => StreamState::Unattached,
            ACTIVE => StreamState::Active,
            _ => StreamState::Closed,
        }
    }

    fn is_closing(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }

    /// Stores the closer, or hands it back if teardown already started.
    fn attach(&self, closer: Box<dyn StreamCloser>) -> Option<Box<dyn StreamCloser>> {
        let mut slot = self.closer.lock();
        if self.is_closing() {
            return Some(closer);
        }
        *slot = Some(closer);
        None
    }

    /// Marks the stream closed. Returns the closer to the first caller only.
    fn begin_close(&self) -> Option<Box<dyn StreamCloser>> {
        self.state.store(CLOSED, Ordering::SeqCst);
        if self.closing.swap(true, Ordering::SeqCst) {
            return None;
        }
        self.closer.lock().take()
    }

    fn close_on(&self, runtime: &Handle) {
        if let Some(closer) = self.begin_close() {
            runtime.spawn(end_subscription(closer));
        }
    }
}

async fn end_subscription(closer: Box<dyn StreamCloser>) {
    match closer.end().await {
        Ok(()) => debug!("native subscription closed"),
        Err(e) => warn!("failed to close native subscription: {e}"),
    }
}

/// Native-facing half of an [`ItemStream`].
pub struct Emitter<T> {
    tx: UnboundedSender<Event<T>>,
    shared: Arc<Shared>,
    runtime: Handle,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            shared: self.shared.clone(),
            runtime: self.runtime.clone(),
        }
    }
}

impl<T: Send + 'static> Emitter<T> {
    /// Adapts this emitter to a native callback producing `U`.
    pub fn map<U, F>(self, f: F) -> MappedEmitter<T, U, F>
    where
        F: Fn(U) -> T + Send + Sync,
    {
        MappedEmitter {
            inner: self,
            f,
            _marker: PhantomData,
        }
    }

    /// Whether teardown has started; further emissions are dropped.
    pub fn is_closed(&self) -> bool {
        self.shared.is_closing()
    }

    /// Delivers `item`, or fails with `Cancelled` once the consumer has
    /// cancelled or dropped the stream. Producers use this to stop early.
    pub fn emit(&self, item: T) -> ParleyResult<()> {
        if self.shared.is_closing() {
            return Err(ParleyError::Cancelled);
        }
        self.tx
            .send(Event::Item(item))
            .map_err(|_| ParleyError::Cancelled)
    }
}

impl<T: Send + 'static> StreamCallback<T> for Emitter<T> {
    fn on_item(&self, item: T) {
        let _ = self.emit(item);
    }

    fn on_error(&self, error: ParleyError) {
        if self.shared.is_closing() {
            debug!("dropping error from closed subscription: {error}");
            return;
        }
        let _ = self.tx.send(Event::Error(error));
        self.shared.close_on(&self.runtime);
    }

    fn on_close(&self) {
        if self.shared.is_closing() {
            return;
        }
        let _ = self.tx.send(Event::Closed);
        self.shared.close_on(&self.runtime);
    }
}

/// An [`Emitter`] that converts native values before delivering them.
pub struct MappedEmitter<T, U, F> {
    inner: Emitter<T>,
    f: F,
    _marker: PhantomData<fn(U)>,
}

impl<T, U, F> MappedEmitter<T, U, F>
where
    T: Send + 'static,
    F: Fn(U) -> T + Send + Sync,
{
    /// See [`Emitter::emit`]. `item` is not converted once cancelled.
    pub fn emit(&self, item: U) -> ParleyResult<()> {
        if self.inner.is_closed() {
            return Err(ParleyError::Cancelled);
        }
        self.inner.emit((self.f)(item))
    }
}

impl<T, U, F> StreamCallback<U> for MappedEmitter<T, U, F>
where
    T: Send + 'static,
    F: Fn(U) -> T + Send + Sync,
{
    fn on_item(&self, item: U) {
        let _ = self.emit(item);
    }

    fn on_error(&self, error: ParleyError) {
        self.inner.on_error(error);
    }

    fn on_close(&self) {
        self.inner.on_close();
    }
}

type Subscribe<T> =
    Box<dyn FnOnce(Emitter<T>) -> BoxFuture<'static, ParleyResult<Box<dyn StreamCloser>>> + Send>;

/// Lazy, cancellable stream over a native subscription.
///
/// Yields items in native delivery order. An upstream error is yielded once
/// and ends the stream. Items still buffered when the stream is cancelled
/// are discarded.
pub struct ItemStream<T> {
    subscribe: Option<Subscribe<T>>,
    tx: Option<UnboundedSender<Event<T>>>,
    rx: Option<UnboundedReceiver<Event<T>>>,
    shared: Arc<Shared>,
    runtime: Option<Handle>,
}

impl<T> Unpin for ItemStream<T> {}

/// Wraps a one-shot native subscription in an [`ItemStream`].
///
/// `subscribe` runs on a background task at the first poll. If it fails,
/// the stream yields that error and ends.
pub fn open_stream<T, F, Fut>(subscribe: F) -> ItemStream<T>
where
    T: Send + 'static,
    F: FnOnce(Emitter<T>) -> Fut + Send + 'static,
    Fut: Future<Output = ParleyResult<Box<dyn StreamCloser>>> + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    ItemStream {
        subscribe: Some(Box::new(move |emitter| subscribe(emitter).boxed())),
        tx: Some(tx),
        rx: Some(rx),
        shared: Arc::new(Shared::new()),
        runtime: None,
    }
}

impl<T: Send + 'static> ItemStream<T> {
    pub fn state(&self) -> StreamState {
        self.shared.state()
    }

    /// Stops delivery and releases the native subscription.
    ///
    /// Idempotent. Never waits for native teardown.
    pub fn cancel(&mut self) {
        self.finish();
    }

    fn start(&mut self, subscribe: Subscribe<T>) -> ParleyResult<()> {
        let runtime = Handle::try_current()
            .map_err(|_| ParleyError::capability("stream polled outside a tokio runtime"))?;
        let Some(tx) = self.tx.take() else {
            return Ok(());
        };

        let emitter = Emitter {
            tx: tx.clone(),
            shared: self.shared.clone(),
            runtime: runtime.clone(),
        };
        let shared = self.shared.clone();
        self.shared
            .state
            .compare_exchange(UNATTACHED, ACTIVE, Ordering::SeqCst, Ordering::SeqCst)
            .ok();

        runtime.spawn(async move {
            match subscribe(emitter).await {
                Ok(closer) => {
                    if let Some(closer) = shared.attach(closer) {
                        end_subscription(closer).await;
                    }
                }
                Err(e) => {
                    debug!("native subscribe failed: {e}");
                    let _ = tx.send(Event::Error(e));
                    shared.begin_close();
                }
            }
        });

        self.runtime = Some(runtime);
        Ok(())
    }

    fn finish(&mut self) {
        self.subscribe = None;
        self.tx = None;
        self.rx = None;
        match &self.runtime {
            Some(runtime) => self.shared.close_on(runtime),
            None => {
                self.shared.begin_close();
            }
        }
    }
}

impl<T: Send + 'static> Stream for ItemStream<T> {
    type Item = ParleyResult<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(subscribe) = this.subscribe.take() {
            if let Err(e) = this.start(subscribe) {
                this.finish();
                return Poll::Ready(Some(Err(e)));
            }
        }

        let Some(rx) = this.rx.as_mut() else {
            return Poll::Ready(None);
        };

        match rx.poll_recv(cx) {
            Poll::Ready(Some(Event::Item(item))) => Poll::Ready(Some(Ok(item))),
            Poll::Ready(Some(Event::Error(e))) => {
                this.finish();
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(Some(Event::Closed)) | Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T: Send + 'static> FusedStream for ItemStream<T> {
    fn is_terminated(&self) -> bool {
        self.rx.is_none() && self.subscribe.is_none()
    }
}

impl<T> Drop for ItemStream<T> {
    fn drop(&mut self) {
        if self.shared.is_closing() {
            return;
        }
        match &self.runtime {
            Some(runtime) => self.shared.close_on(runtime),
            None => {
                self.shared.begin_close();
            }
        }
    }
}

impl<T> std::fmt::Debug for ItemStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemStream")
            .field("state", &self.shared.state())
            .finish()
    }
}
