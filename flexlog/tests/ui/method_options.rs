// Every option of `#[log]` ends up in the descriptor, other attributes stay.
use flexlog::format::FormatterType;
use flexlog::registry::{AttributeKind, Loggable};
use flexlog::{loggable, Level};

struct Gateway;

#[loggable(log_input, level = "warn", target = "Audit")]
impl Gateway {
    const RETRIES: u32 = 3;

    #[log(log_both, level = "Critical", formatter = "Json", target = "Ops", template = "Gateway")]
    #[inline]
    fn send(&self) -> u32 {
        Self::RETRIES
    }

    #[allow(dead_code)]
    #[log(no_auto_log)]
    fn ping(&self) {}

    fn close(self) {}
}

fn main() {
    assert_eq!(Gateway.send(), 3);
    Gateway.close();

    let descriptor = Gateway::descriptor();
    assert!(descriptor.type_name.ends_with("::Gateway"));
    assert_eq!(descriptor.attributes.len(), 1);
    assert_eq!(descriptor.attributes[0].kind, AttributeKind::LogInput);
    assert_eq!(descriptor.attributes[0].level, Some(Level::Warning));
    assert_eq!(descriptor.attributes[0].target, Some("Audit"));

    let names: Vec<_> = descriptor.methods.iter().map(|m| m.name).collect();
    assert_eq!(names, ["send", "ping", "close"]);

    let send = descriptor.method("send").unwrap().attributes[0];
    assert_eq!(send.kind, AttributeKind::LogBoth);
    assert_eq!(send.level, Some(Level::Critical));
    assert_eq!(send.formatter, Some(FormatterType::Json));
    assert_eq!(send.target, Some("Ops"));
    assert_eq!(send.template, Some("Gateway"));

    assert_eq!(
        descriptor.method("ping").unwrap().attributes[0].kind,
        AttributeKind::NoAutoLog
    );
    assert!(descriptor.method("close").unwrap().attributes.is_empty());
}
