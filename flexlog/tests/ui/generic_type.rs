// Generic types share one descriptor for all instantiations.
use flexlog::registry::Loggable;
use flexlog::{loggable, method};

struct Cache<K, V> {
    entries: Vec<(K, V)>,
}

#[loggable(log_output)]
impl<K: PartialEq, V: Clone> Cache<K, V>
where
    K: Copy,
{
    fn get(&self, key: K) -> Option<V> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
    }
}

fn main() {
    let cache = Cache {
        entries: vec![(1u8, "one")],
    };
    assert_eq!(cache.get(1), Some("one"));

    let a = <Cache<u8, &str> as Loggable>::descriptor();
    let b = <Cache<u16, String> as Loggable>::descriptor();
    assert!(std::ptr::eq(a, b));
    assert!(a.type_name.ends_with("::Cache"));
    assert_eq!(method!(Cache<u8, &str>, get).name(), "get");
}
