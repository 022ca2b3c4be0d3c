use flexlog::loggable;

struct Orders;

#[loggable(log_everything)]
impl Orders {
    fn place(&self) {}
}

fn main() {
    Orders.place();
}
