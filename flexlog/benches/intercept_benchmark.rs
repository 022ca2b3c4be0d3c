use criterion::{black_box, criterion_group, criterion_main, Bencher, Criterion};
use flexlog::config::{TargetConfig, TargetKind};
use flexlog::{config, loggable, method, params, FlexLog, LoggingConfig, MethodLoggingInterceptor};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Serialize)]
struct Order {
    id: u64,
    qty: u32,
    sku: &'static str,
}

struct Orders {
    log: MethodLoggingInterceptor,
}

#[loggable(log_input)]
impl Orders {
    fn place(&self, order: Order) -> u64 {
        self.log
            .invoke(method!(Orders, place), params!(order), || order.id)
    }

    #[log(log_both)]
    fn place_logging_output(&self, order: Order) -> Order {
        self.log
            .invoke(method!(Orders, place_logging_output), params!(order), || order)
    }

    #[log(no_log)]
    fn place_unlogged(&self, order: Order) -> u64 {
        self.log
            .invoke(method!(Orders, place_unlogged), params!(order), || order.id)
    }
}

fn noop_console(config: LoggingConfig) -> LoggingConfig {
    config.with_target("Console", TargetConfig::new(TargetKind::Noop))
}

fn order() -> Order {
    black_box(Order {
        id: 7,
        qty: 3,
        sku: "The quick brown fox jumps over the lazy dog",
    })
}

fn bench_with_host<F>(b: &mut Bencher, config: LoggingConfig, f: F)
where
    F: Fn(&Orders, Order) -> u64,
{
    let host = FlexLog::builder(noop_console(config)).build().unwrap();
    host.start().unwrap();
    let orders = Orders {
        log: host.interceptor(),
    };
    let order = order();

    b.iter(|| f(&orders, order));
    host.shutdown().unwrap();
}

fn bench_excluded(b: &mut Bencher) {
    bench_with_host(b, config(), |orders, order| orders.place_unlogged(order));
}

fn bench_background_input(b: &mut Bencher) {
    bench_with_host(b, config(), |orders, order| orders.place(order));
}

fn bench_background_input_output(b: &mut Bencher) {
    bench_with_host(b, config(), |orders, order| {
        orders.place_logging_output(order).id
    });
}

fn bench_direct_input(b: &mut Bencher) {
    bench_with_host(b, config().with_background_logging(false), |orders, order| {
        orders.place(order)
    });
}

fn bench_intercept(c: &mut Criterion) {
    let mut group = c.benchmark_group("Intercept");
    group.bench_function("excluded method", bench_excluded);
    group.bench_function("background, input", bench_background_input);
    group.bench_function("background, input and output", bench_background_input_output);
    group.bench_function("direct, input", bench_direct_input);
    group.finish();
}

criterion_group!(benches, bench_intercept);
criterion_main!(benches);
