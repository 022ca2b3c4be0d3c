//! Logging around method invocations.
//!
//! [`MethodLoggingInterceptor`] wraps a method body: it looks up the
//! method's [`Decision`], times the call, captures inputs and output as the
//! decision asks, and hands the completed [`LogEntry`] on. The wrapped call
//! is never affected: return values, `Err` values and panics reach the
//! caller unchanged, whatever happens inside the logging pipeline.
//!
//! # Example
//!
//! ```rust no_run
//! use flexlog::{config, loggable, method, params, FlexLog, MethodLoggingInterceptor};
//!
//! struct Orders {
//!     log: MethodLoggingInterceptor,
//! }
//!
//! #[loggable(log_both)]
//! impl Orders {
//!     fn place(&self, item: &str, qty: u32) -> u64 {
//!         self.log.invoke(method!(Orders, place), params!(item, qty), || 42)
//!     }
//! }
//!
//! # fn main() -> flexlog::Result<()> {
//! let host = FlexLog::builder(config()).build()?;
//! host.start()?;
//!
//! let orders = Orders { log: host.interceptor() };
//! orders.place("book", 2);
//!
//! host.shutdown()?;
//! # Ok(())
//! # }
//! ```

use std::{
    any::Any,
    fmt::Display,
    future::Future,
    marker::PhantomData,
    panic::{self, AssertUnwindSafe},
    pin::Pin,
    sync::Arc,
    task::{ready, Context, Poll},
};

use chrono::Utc;
use flexlog_clock::{Clock, Instant};
use pin_project_lite::pin_project;
use serde::Serialize;

use crate::{
    cache::InterceptionDecisionCache,
    decision::Decision,
    entry::{ExceptionInfo, InputParameter, LogEntry},
    format::value,
    processor::LogEntryProcessor,
    queue::BackgroundLog,
    registry::MethodRef,
};

/// Where completed entries go.
#[derive(Clone)]
pub(crate) enum EntrySink {
    /// Background queue
    Background(Arc<BackgroundLog>),
    /// Processed on the calling thread
    Direct(Arc<dyn LogEntryProcessor>),
}

/// Wraps method bodies with logging.
#[derive(Clone)]
pub struct MethodLoggingInterceptor {
    cache: Arc<InterceptionDecisionCache>,
    sink: EntrySink,
    clock: Arc<dyn Clock>,
    max_value_length: usize,
}

impl MethodLoggingInterceptor {
    /// Interceptor handing entries to the background queue.
    pub fn new(
        cache: Arc<InterceptionDecisionCache>,
        log: Arc<BackgroundLog>,
        clock: Arc<dyn Clock>,
        max_value_length: usize,
    ) -> Self {
        Self {
            cache,
            sink: EntrySink::Background(log),
            clock,
            max_value_length,
        }
    }

    /// Interceptor processing entries on the calling thread.
    pub fn direct(
        cache: Arc<InterceptionDecisionCache>,
        processor: Arc<dyn LogEntryProcessor>,
        clock: Arc<dyn Clock>,
        max_value_length: usize,
    ) -> Self {
        Self {
            cache,
            sink: EntrySink::Direct(processor),
            clock,
            max_value_length,
        }
    }

    pub fn cache(&self) -> &InterceptionDecisionCache {
        &self.cache
    }

    /// Starts logging an invocation of `method`.
    ///
    /// Returns `None` when the method is not logged. `inputs` is only called
    /// when the decision logs input.
    pub fn begin<I>(&self, method: MethodRef, inputs: I) -> Option<Invocation>
    where
        I: FnOnce() -> Vec<InputParameter>,
    {
        let decision = self.cache.get_decision(method)?;
        let started = self.clock.get_instant();
        let timestamp = self
            .clock
            .compute_system_time_from_instant(started)
            .unwrap_or_else(|_| Utc::now());

        let mut entry = LogEntry::create_start(method.type_name(), method.name(), decision.level)
            .with_timestamp(timestamp);
        if let Some(formatter) = decision.formatter {
            entry = entry.with_formatter(formatter);
        }
        if let Some(target) = &decision.target {
            entry = entry.with_target(target.as_str());
        }
        if let Some(template) = &decision.template {
            entry = entry.with_template(template.as_str());
        }
        if decision.logs_input() {
            // A panicking `Serialize` impl must not keep the method from running
            match panic::catch_unwind(AssertUnwindSafe(inputs)) {
                Ok(params) => {
                    let max = self.max_value_length;
                    let params = params
                        .into_iter()
                        .map(|p| InputParameter {
                            value: value::truncate(p.value, max),
                            ..p
                        })
                        .collect();
                    entry = entry.with_input(params);
                }
                Err(payload) => tracing::warn!(
                    type_name = method.type_name(),
                    method = method.name(),
                    error = %ExceptionInfo::from_panic(payload.as_ref()).message,
                    "capturing inputs panicked, logging the invocation without them"
                ),
            }
        }

        Some(Invocation {
            method,
            entry,
            decision,
            started,
            interceptor: self.clone(),
        })
    }

    /// Runs a synchronous method body. A panic is logged as a failure and
    /// resumed with its original payload.
    pub fn invoke<R, I, F>(&self, method: MethodRef, inputs: I, f: F) -> R
    where
        R: Serialize,
        I: FnOnce() -> Vec<InputParameter>,
        F: FnOnce() -> R,
    {
        let Some(invocation) = self.begin(method, inputs) else {
            return f();
        };

        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(output) => {
                invocation.complete(&output);
                output
            }
            Err(payload) => {
                invocation.fail_panic(payload.as_ref());
                panic::resume_unwind(payload)
            }
        }
    }

    /// Runs a fallible method body. `Err` is logged as a failure, with the
    /// error's type name and `Display` message, and returned unchanged.
    pub fn try_invoke<T, E, I, F>(&self, method: MethodRef, inputs: I, f: F) -> Result<T, E>
    where
        T: Serialize,
        E: Display,
        I: FnOnce() -> Vec<InputParameter>,
        F: FnOnce() -> Result<T, E>,
    {
        let Some(invocation) = self.begin(method, inputs) else {
            return f();
        };

        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => {
                Fallible::record(invocation, &result);
                result
            }
            Err(payload) => {
                invocation.fail_panic(payload.as_ref());
                panic::resume_unwind(payload)
            }
        }
    }

    /// Wraps an asynchronous method body. The entry is produced once, when
    /// the future completes; the output is passed through unchanged.
    pub fn invoke_async<Fut, I>(
        &self,
        method: MethodRef,
        inputs: I,
        future: Fut,
    ) -> Logged<Fut, PlainValue>
    where
        Fut: Future,
        Fut::Output: Serialize,
        I: FnOnce() -> Vec<InputParameter>,
    {
        Logged::new(future, self.begin(method, inputs))
    }

    /// [`invoke_async`](Self::invoke_async) for futures resolving to a
    /// `Result`; `Err` is logged as a failure.
    pub fn try_invoke_async<Fut, T, E, I>(
        &self,
        method: MethodRef,
        inputs: I,
        future: Fut,
    ) -> Logged<Fut, Fallible>
    where
        Fut: Future<Output = Result<T, E>>,
        T: Serialize,
        E: Display,
        I: FnOnce() -> Vec<InputParameter>,
    {
        Logged::new(future, self.begin(method, inputs))
    }

    fn enqueue(&self, method: MethodRef, entry: LogEntry) {
        match &self.sink {
            EntrySink::Background(log) => {
                if !log.try_enqueue(entry) {
                    tracing::warn!(
                        type_name = method.type_name(),
                        method = method.name(),
                        "background log is disposed, dropping entry"
                    );
                }
            }
            EntrySink::Direct(processor) => {
                let result = panic::catch_unwind(AssertUnwindSafe(|| processor.process_entry(&entry)));
                match result {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::warn!(
                        type_name = method.type_name(),
                        method = method.name(),
                        error = %e,
                        "failed to process log entry"
                    ),
                    Err(_) => tracing::warn!(
                        type_name = method.type_name(),
                        method = method.name(),
                        "log entry processing panicked"
                    ),
                }
            }
        }
    }
}

/// An invocation being logged, returned by [`MethodLoggingInterceptor::begin`].
///
/// Consumed by exactly one of [`complete`](Self::complete),
/// [`fail`](Self::fail) or [`fail_panic`](Self::fail_panic). Dropping it
/// logs nothing.
pub struct Invocation {
    method: MethodRef,
    entry: LogEntry,
    decision: Decision,
    started: Instant,
    interceptor: MethodLoggingInterceptor,
}

impl Invocation {
    pub fn decision(&self) -> &Decision {
        &self.decision
    }

    /// The start entry, including captured inputs.
    pub fn entry(&self) -> &LogEntry {
        &self.entry
    }

    /// Logs a successful completion. `output` is only serialized when the
    /// decision logs output.
    pub fn complete<T: Serialize + ?Sized>(self, output: &T) {
        self.finish(|entry, duration, decision, max| {
            let entry = entry.with_completion(true, duration, None);
            if decision.logs_output() {
                entry.with_output(value::capture_capped(output, max))
            } else {
                entry
            }
        });
    }

    /// Logs a failure from an error value.
    pub fn fail<E: Display + ?Sized>(self, error: &E) {
        self.finish(|entry, duration, _, _| {
            entry.with_completion(false, duration, Some(ExceptionInfo::from_error(error)))
        });
    }

    /// Logs a failure from a panic payload.
    pub fn fail_panic(self, payload: &(dyn Any + Send)) {
        self.finish(|entry, duration, _, _| {
            entry.with_completion(false, duration, Some(ExceptionInfo::from_panic(payload)))
        });
    }

    fn finish<B>(self, build: B)
    where
        B: FnOnce(LogEntry, std::time::Duration, &Decision, usize) -> LogEntry,
    {
        let Invocation {
            method,
            entry,
            decision,
            started,
            interceptor,
        } = self;
        let duration = interceptor.clock.elapsed_since(started);

        // A panicking `Serialize` or `Display` impl must not escape into the
        // intercepted call.
        let built = panic::catch_unwind(AssertUnwindSafe(|| {
            build(entry, duration, &decision, interceptor.max_value_length)
        }));
        match built {
            Ok(entry) => interceptor.enqueue(method, entry),
            Err(_) => tracing::warn!(
                type_name = method.type_name(),
                method = method.name(),
                "capturing the invocation outcome panicked, dropping entry"
            ),
        }
    }
}

/// How the output of a wrapped future is recorded.
pub trait Completion<T> {
    fn record(invocation: Invocation, output: &T);
}

/// Any output is a success.
pub struct PlainValue;

impl<T: Serialize> Completion<T> for PlainValue {
    fn record(invocation: Invocation, output: &T) {
        invocation.complete(output);
    }
}

/// `Ok` is a success, `Err` a failure.
pub struct Fallible;

impl<T: Serialize, E: Display> Completion<Result<T, E>> for Fallible {
    fn record(invocation: Invocation, output: &Result<T, E>) {
        match output {
            Ok(value) => invocation.complete(value),
            Err(error) => invocation.fail(error),
        }
    }
}

pin_project! {
    /// Future returned by [`MethodLoggingInterceptor::invoke_async`] and
    /// [`MethodLoggingInterceptor::try_invoke_async`].
    ///
    /// Resolves to the wrapped future's output. The invocation is logged
    /// when the wrapped future completes; a future dropped before then is
    /// not logged.
    #[must_use = "futures do nothing unless polled"]
    pub struct Logged<F, C> {
        #[pin]
        inner: F,
        invocation: Option<Invocation>,
        completion: PhantomData<fn() -> C>,
    }
}

impl<F, C> Logged<F, C> {
    fn new(inner: F, invocation: Option<Invocation>) -> Self {
        Self {
            inner,
            invocation,
            completion: PhantomData,
        }
    }
}

impl<F, C> Future for Logged<F, C>
where
    F: Future,
    C: Completion<F::Output>,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let inner = this.inner;

        let output = match panic::catch_unwind(AssertUnwindSafe(|| inner.poll(cx))) {
            Ok(poll) => ready!(poll),
            Err(payload) => {
                if let Some(invocation) = this.invocation.take() {
                    invocation.fail_panic(payload.as_ref());
                }
                panic::resume_unwind(payload)
            }
        };

        if let Some(invocation) = this.invocation.take() {
            C::record(invocation, &output);
        }
        Poll::Ready(output)
    }
}
