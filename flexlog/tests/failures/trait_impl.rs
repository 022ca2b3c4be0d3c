use std::fmt::{self, Display};

use flexlog::loggable;

struct Orders;

#[loggable(log_both)]
impl Display for Orders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("orders")
    }
}

fn main() {
    let _ = Orders.to_string();
}
