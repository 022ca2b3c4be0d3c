use flexlog::loggable;

struct Orders;

#[loggable]
impl Orders {
    #[log(log_input, log_output)]
    fn place(&self) {}
}

fn main() {
    Orders.place();
}
