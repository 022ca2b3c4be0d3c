//! Static logging attributes of types and their methods.
//!
//! Each loggable type exposes one [`TypeDescriptor`] through [`Loggable`].
//! The `#[loggable]` attribute macro generates the implementation from
//! `#[loggable(...)]` on an `impl` block and `#[log(...)]` on its methods,
//! but a descriptor can equally be written by hand:
//!
//! ```rust
//! use flexlog::registry::{LogAttribute, Loggable, MethodDescriptor, TypeDescriptor};
//! use flexlog::Level;
//!
//! struct Orders;
//!
//! impl Loggable for Orders {
//!     fn descriptor() -> &'static TypeDescriptor {
//!         static DESCRIPTOR: TypeDescriptor = TypeDescriptor::new(
//!             "app::Orders",
//!             &[LogAttribute::log_both().with_level(Level::Debug)],
//!             &[
//!                 MethodDescriptor::new("place", &[]),
//!                 MethodDescriptor::new("health", &[LogAttribute::no_log()]),
//!             ],
//!         );
//!         &DESCRIPTOR
//!     }
//! }
//! ```

use crate::{format::FormatterType, level::Level};

/// Marker kinds understood by the decision cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Never log
    NoLog,
    /// Exclude from automatic interception; explicit attributes are ignored too
    NoAutoLog,
    LogInput,
    LogOutput,
    LogBoth,
}

impl AttributeKind {
    pub fn is_exclusion(&self) -> bool {
        matches!(self, AttributeKind::NoLog | AttributeKind::NoAutoLog)
    }
}

/// A logging attribute on a type or method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogAttribute {
    pub kind: AttributeKind,
    pub level: Option<Level>,
    pub formatter: Option<FormatterType>,
    pub target: Option<&'static str>,
    /// Name of a configured template
    pub template: Option<&'static str>,
}

impl LogAttribute {
    pub const fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            level: None,
            formatter: None,
            target: None,
            template: None,
        }
    }

    pub const fn no_log() -> Self {
        Self::new(AttributeKind::NoLog)
    }

    pub const fn no_auto_log() -> Self {
        Self::new(AttributeKind::NoAutoLog)
    }

    pub const fn log_input() -> Self {
        Self::new(AttributeKind::LogInput)
    }

    pub const fn log_output() -> Self {
        Self::new(AttributeKind::LogOutput)
    }

    pub const fn log_both() -> Self {
        Self::new(AttributeKind::LogBoth)
    }

    pub const fn with_level(self, level: Level) -> Self {
        Self {
            level: Some(level),
            ..self
        }
    }

    pub const fn with_formatter(self, formatter: FormatterType) -> Self {
        Self {
            formatter: Some(formatter),
            ..self
        }
    }

    pub const fn with_target(self, target: &'static str) -> Self {
        Self {
            target: Some(target),
            ..self
        }
    }

    pub const fn with_template(self, template: &'static str) -> Self {
        Self {
            template: Some(template),
            ..self
        }
    }
}

/// Attributes of one method.
#[derive(Debug)]
pub struct MethodDescriptor {
    pub name: &'static str,
    pub attributes: &'static [LogAttribute],
}

impl MethodDescriptor {
    pub const fn new(name: &'static str, attributes: &'static [LogAttribute]) -> Self {
        Self { name, attributes }
    }
}

/// Attributes of a type and all of its loggable methods.
#[derive(Debug)]
pub struct TypeDescriptor {
    pub type_name: &'static str,
    pub attributes: &'static [LogAttribute],
    pub methods: &'static [MethodDescriptor],
}

impl TypeDescriptor {
    pub const fn new(
        type_name: &'static str,
        attributes: &'static [LogAttribute],
        methods: &'static [MethodDescriptor],
    ) -> Self {
        Self {
            type_name,
            attributes,
            methods,
        }
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// A type whose methods can be intercepted.
pub trait Loggable {
    fn descriptor() -> &'static TypeDescriptor;
}

/// Identity of a method: its declaring type's descriptor and its name.
///
/// Usually obtained through [`method!`](crate::method).
#[derive(Clone, Copy)]
pub struct MethodRef {
    descriptor: fn() -> &'static TypeDescriptor,
    name: &'static str,
}

impl MethodRef {
    pub const fn new(descriptor: fn() -> &'static TypeDescriptor, name: &'static str) -> Self {
        Self { descriptor, name }
    }

    pub fn of<T: Loggable>(name: &'static str) -> Self {
        Self::new(T::descriptor, name)
    }

    pub fn descriptor(&self) -> &'static TypeDescriptor {
        (self.descriptor)()
    }

    pub fn type_name(&self) -> &'static str {
        self.descriptor().type_name
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl std::fmt::Debug for MethodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.type_name(), self.name)
    }
}
