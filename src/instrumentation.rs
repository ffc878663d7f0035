//! Span timing for profiling searches.
//!
//! Built only with `--features instrumentation`. Functions marked with
//! `#[instrument]` are timed per thread, so the search worker never contends
//! with the UI thread, and the totals are merged when printed.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use once_cell::sync::Lazy;
use thread_local::ThreadLocal;
use tracing::span;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Span name -> (calls, total nanoseconds), one map per thread.
type Timings = HashMap<&'static str, (u64, u64)>;

static TIMINGS: Lazy<ThreadLocal<Mutex<Timings>>> = Lazy::new(ThreadLocal::new);

fn lock(timings: &Mutex<Timings>) -> MutexGuard<'_, Timings> {
    timings.lock().unwrap_or_else(PoisonError::into_inner)
}

struct TimingLayer;

impl<S> Layer<S> for TimingLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_enter(&self, id: &span::Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(Instant::now());
        }
    }

    fn on_exit(&self, id: &span::Id, ctx: Context<'_, S>) {
        let span = match ctx.span(id) {
            Some(span) => span,
            None => return,
        };
        let start = match span.extensions_mut().remove::<Instant>() {
            Some(start) => start,
            None => return,
        };

        let elapsed = start.elapsed().as_nanos() as u64;
        let cell = TIMINGS.get_or(|| Mutex::new(HashMap::new()));
        let mut timings = lock(cell);
        let entry = timings.entry(span.name()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += elapsed;
    }
}

/// Installs the timing layer. With `RUST_LOG` unset or `off` every span is
/// timed silently; otherwise span events are also printed, filtered by
/// `RUST_LOG`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = std::env::var("RUST_LOG").unwrap_or_default();
    let installed = if filter.is_empty() || filter == "off" {
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new("trace"))
            .with(TimingLayer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_level(false)
            .compact();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(TimingLayer)
            .with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    };

    if let Err(error) = installed {
        log::warn!("failed to install the timing subscriber: {}", error);
    }
}

/// Prints call counts and times of every instrumented function, slowest
/// total first.
pub fn print_timing_statistics() {
    let mut merged: HashMap<&'static str, (u64, u64)> = HashMap::new();
    for cell in TIMINGS.iter() {
        for (name, (calls, nanos)) in lock(cell).iter() {
            let entry = merged.entry(*name).or_insert((0, 0));
            entry.0 += calls;
            entry.1 += nanos;
        }
    }

    if merged.is_empty() {
        eprintln!("\nNo timing data collected.");
        return;
    }

    let mut rows: Vec<_> = merged.into_iter().collect();
    rows.sort_by_key(|(_, (_, nanos))| Reverse(*nanos));

    eprintln!("\n{:=<80}", "");
    eprintln!("Latency Statistics (sorted by total time)");
    eprintln!("{:=<80}", "");
    eprintln!(
        "{:<40} {:>12} {:>12} {:>12}",
        "Function", "Calls", "Total (ms)", "Avg (µs)"
    );
    eprintln!("{:-<80}", "");

    let mut total = 0u64;
    for (name, (calls, nanos)) in rows.iter().filter(|(_, (calls, _))| *calls > 0) {
        total += nanos;
        eprintln!(
            "{:<40} {:>12} {:>12.2} {:>12.2}",
            name,
            calls,
            *nanos as f64 / 1_000_000.0,
            *nanos as f64 / *calls as f64 / 1_000.0
        );
    }

    eprintln!("{:-<80}", "");
    eprintln!("Total instrumented time: {:.2} ms\n", total as f64 / 1_000_000.0);
}
