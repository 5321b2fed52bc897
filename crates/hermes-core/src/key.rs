//! Type identity tokens and dispatch keys.
//!
//! Resolution is keyed by [`TypeId`], never by type names. Names are carried
//! along only so errors and logs stay readable.

use crate::contract::Request;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A stable identity token for a Rust type.
///
/// Two tokens are equal exactly when their [`TypeId`]s are equal.
#[derive(Clone, Copy)]
pub struct TypeToken {
    id: TypeId,
    name: &'static str,
}

impl TypeToken {
    /// Returns the token for `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns the type's [`TypeId`].
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the type's name, for diagnostics only.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeToken {}

impl Hash for TypeToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The (request type, result type) pair handlers and behaviors are bound to.
///
/// Static and dynamic dispatch build the same key for the same concrete
/// request type, so both resolve through a single set of registrations.
///
/// # Example
///
/// ```
/// use hermes_core::{DispatchKey, Request, TypeToken};
///
/// struct GetBalance;
///
/// impl Request for GetBalance {
///     type Output = i64;
/// }
///
/// let key = DispatchKey::of::<GetBalance>();
/// assert_eq!(key, DispatchKey::new(TypeToken::of::<GetBalance>(), TypeToken::of::<i64>()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatchKey {
    request: TypeToken,
    result: TypeToken,
}

impl DispatchKey {
    /// Creates a key from its two type tokens.
    #[must_use]
    pub const fn new(request: TypeToken, result: TypeToken) -> Self {
        Self { request, result }
    }

    /// Returns the key for a request type and its declared output.
    #[must_use]
    pub fn of<Req: Request>() -> Self {
        Self::new(TypeToken::of::<Req>(), TypeToken::of::<Req::Output>())
    }

    /// Returns the request type token.
    #[must_use]
    pub const fn request(&self) -> TypeToken {
        self.request
    }

    /// Returns the result type token.
    #[must_use]
    pub const fn result(&self) -> TypeToken {
        self.result
    }
}

impl fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.request, self.result)
    }
}
