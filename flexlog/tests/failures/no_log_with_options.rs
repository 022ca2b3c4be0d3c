use flexlog::loggable;

struct Orders;

#[loggable(log_both)]
impl Orders {
    #[log(no_log, level = "Debug")]
    fn place(&self) {}
}

fn main() {
    Orders.place();
}
