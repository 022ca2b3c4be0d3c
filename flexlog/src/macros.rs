/// Identifies a method of a [`Loggable`](crate::registry::Loggable) type as a
/// [`MethodRef`](crate::registry::MethodRef).
///
/// ```rust
/// # use flexlog::{loggable, method};
/// struct Orders;
///
/// #[loggable]
/// impl Orders {
///     fn place(&self) {}
/// }
///
/// # fn main() {
/// let place = method!(Orders, place);
/// assert_eq!(place.name(), "place");
/// # }
/// ```
#[macro_export]
macro_rules! method {
    ($ty:ty, $name:ident) => {
        $crate::registry::MethodRef::new(
            <$ty as $crate::registry::Loggable>::descriptor,
            ::std::stringify!($name),
        )
    };
}

/// Captures arguments as input parameters, named after the variables.
///
/// Expands to a closure, so the arguments are only serialized when the
/// method's decision logs input.
///
/// ```rust
/// # use flexlog::params;
/// # fn main() {
/// let (item, qty) = ("book", 2);
/// let inputs = params!(item, qty)();
/// assert_eq!(inputs[0].name, "item");
/// assert_eq!(inputs[1].value, 2);
/// # }
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::entry::InputParameter>::new
    };

    ($($arg:ident),+ $(,)?) => {
        || ::std::vec![
            $($crate::entry::InputParameter::capture(::std::stringify!($arg), &$arg)),+
        ]
    };
}
