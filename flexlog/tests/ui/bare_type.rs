// A bare `#[loggable]` only registers the methods.
use flexlog::registry::Loggable;
use flexlog::{config, loggable, method, params, FlexLog, MethodLoggingInterceptor};

struct Counter {
    log: MethodLoggingInterceptor,
}

#[loggable]
impl Counter {
    fn add(&self, a: i32, b: i32) -> i32 {
        self.log.invoke(method!(Counter, add), params!(a, b), || a + b)
    }
}

fn main() {
    assert!(Counter::descriptor().attributes.is_empty());

    let host = FlexLog::builder(config().with_background_logging(false))
        .build()
        .unwrap();
    let counter = Counter {
        log: host.interceptor(),
    };
    assert_eq!(counter.add(2, 3), 5);
}
