use flexlog::loggable;

struct Orders;

#[loggable]
impl Orders {
    #[log(log_both, level = "Loud")]
    fn place(&self) {}
}

fn main() {
    Orders.place();
}
