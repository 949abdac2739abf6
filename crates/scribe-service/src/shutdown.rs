//! Drain-on-shutdown middleware: refuse new work with 503 once shutdown
//! begins and let the server wait for requests already running.

use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::task::{Context, Poll};

use http::{Request, Response, StatusCode};
use http_body::Body;
use pin_project::pin_project;
use tokio::sync::Notify;
use tower::{Layer, Service};
use tracing::debug;

#[derive(Default)]
struct Inner {
    draining: AtomicBool,
    in_flight: AtomicUsize,
    drained: Notify,
}

impl Inner {
    fn is_drained(&self) -> bool {
        self.draining.load(Ordering::SeqCst) && self.in_flight.load(Ordering::SeqCst) == 0
    }
}

#[derive(Clone, Default)]
pub struct ShutdownState {
    inner: Arc<Inner>,
}

impl ShutdownState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop accepting requests; running ones are left to finish
    pub fn start_shutdown(&self) {
        self.inner.draining.store(true, Ordering::SeqCst);
        debug!(in_flight = self.in_flight_count(), "Draining requests");
        self.inner.drained.notify_waiters();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.draining.load(Ordering::SeqCst)
    }

    pub fn in_flight_count(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Resolves once shutdown has started and no request is in flight.
    /// Can be created before `start_shutdown` is called.
    pub fn completed(&self) -> impl Future<Output = ()> + Send + 'static {
        let inner = self.inner.clone();
        async move {
            loop {
                let notified = inner.drained.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();

                if inner.is_drained() {
                    return;
                }
                notified.await;
            }
        }
    }

    /// Registers a request, or `None` when shutdown has started
    fn admit(&self) -> Option<InFlight> {
        let guard = InFlight {
            inner: self.inner.clone(),
        };
        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);

        // Dropping the guard undoes the increment above
        (!self.is_shutting_down()).then_some(guard)
    }
}

/// Counts one running request until dropped
pub struct InFlight {
    inner: Arc<Inner>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let previous = self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
        if previous == 1 && self.inner.draining.load(Ordering::SeqCst) {
            self.inner.drained.notify_waiters();
        }
    }
}

#[derive(Clone)]
pub struct GracefulShutdownLayer {
    state: ShutdownState,
}

impl GracefulShutdownLayer {
    pub fn new(state: ShutdownState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for GracefulShutdownLayer {
    type Service = GracefulShutdownService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GracefulShutdownService {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct GracefulShutdownService<S> {
    inner: S,
    state: ShutdownState,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for GracefulShutdownService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    ResBody: Body + Default,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = GracefulShutdownFuture<S::Future, ResBody, S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        match self.state.admit() {
            Some(guard) => GracefulShutdownFuture::Running {
                inner: self.inner.call(req),
                guard: Some(guard),
            },
            None => {
                let mut response = Response::new(ResBody::default());
                *response.status_mut() = StatusCode::SERVICE_UNAVAILABLE;
                GracefulShutdownFuture::Rejected {
                    response: ready(Ok(response)),
                }
            }
        }
    }
}

#[pin_project(project = GracefulShutdownProj)]
pub enum GracefulShutdownFuture<F, B, E> {
    Running {
        #[pin]
        inner: F,
        guard: Option<InFlight>,
    },
    Rejected {
        #[pin]
        response: Ready<Result<Response<B>, E>>,
    },
}

impl<F, B, E> Future for GracefulShutdownFuture<F, B, E>
where
    F: Future<Output = Result<Response<B>, E>>,
{
    type Output = Result<Response<B>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            GracefulShutdownProj::Running { inner, guard } => {
                let result = inner.poll(cx);
                if result.is_ready() {
                    guard.take();
                }
                result
            }
            GracefulShutdownProj::Rejected { response } => response.poll(cx),
        }
    }
}
