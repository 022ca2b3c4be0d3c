use std::time::Duration;

use flexlog::{config, loggable, method, params, MethodLoggingInterceptor};
use futures::FutureExt;

use common::host;

mod common;

struct Inventory {
    log: MethodLoggingInterceptor,
}

#[loggable(log_both)]
impl Inventory {
    async fn reserve(&self, item: &str, qty: u32) -> u32 {
        self.log
            .invoke_async(method!(Inventory, reserve), params!(item, qty), async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                qty
            })
            .await
    }

    async fn release(&self, sku: &str) -> Result<(), String> {
        self.log
            .try_invoke_async(method!(Inventory, release), params!(sku), async move {
                Err::<(), _>(format!("{} is not reserved", sku))
            })
            .await
    }
}

#[tokio::test]
async fn awaited_once_logged_once() {
    let (host, console) = host(config());
    host.start().unwrap();
    let inventory = Inventory {
        log: host.interceptor(),
    };

    let reserved = inventory.reserve("A-1", 3).shared();
    let (a, b) = tokio::join!(reserved.clone(), reserved);
    assert_eq!((a, b), (3, 3));
    assert!(inventory.release("B-2").await.is_err());

    host.shutdown().unwrap();
    let messages = console.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages[0],
        r#"Method async_methods::Inventory.reserve called with {"item":"A-1","qty":3} completed in 0.00ms returning 3"#
    );
    assert!(messages[1].starts_with("Method async_methods::Inventory.release failed after 0.00ms: "));
    assert!(messages[1].ends_with(" - B-2 is not reserved"));
}

#[tokio::test]
async fn dropped_before_completion_is_not_logged() {
    let (host, console) = host(config());
    host.start().unwrap();
    let inventory = Inventory {
        log: host.interceptor(),
    };

    let timed_out = tokio::time::timeout(Duration::from_millis(1), inventory.reserve("C-3", 1)).await;
    assert!(timed_out.is_err());

    host.shutdown().unwrap();
    assert!(console.lines().is_empty());
}
