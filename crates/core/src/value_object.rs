//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects carry no identity of their own: two email addresses with the
/// same text are the same email address. They are immutable once built, and a
/// "change" means replacing the whole value.
///
/// Construction is where validation lives. Implementors expose fallible
/// constructors (`parse`, `build`) so that anything holding a value object can
/// assume it is well-formed.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct EmailAddress(String);
///
/// impl ValueObject for EmailAddress {}
///
/// assert_eq!(EmailAddress::parse("a@b.io")?, EmailAddress::parse("a@b.io")?);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
