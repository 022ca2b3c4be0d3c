use flexlog::loggable;

struct Orders;

#[loggable(log_output, formatter = "Xml")]
impl Orders {
    fn place(&self) {}
}

fn main() {
    Orders.place();
}
