use flexlog::loggable;

struct Orders;

#[loggable(log_input)]
impl &'static Orders {
    fn place(&self) {}
}

fn main() {
    let _ = Orders;
}
