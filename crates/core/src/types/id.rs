//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. Backend IDs are opaque
//! strings (e.g. `"KCRwjF7lN97HnEaY"`), so the wrappers hold a `String`.

/// Errors that can occur when parsing an ID.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The input string is empty or whitespace.
    #[error("id cannot be empty")]
    Empty,
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` as a plain string (empty strings are rejected)
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `parse()`, `as_str()`, `into_inner()`
/// - `FromStr`, `TryFrom<String>`, `AsRef<str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use qkart_core::define_id;
/// define_id!(ProductId);
/// define_id!(OrderId);
///
/// let product_id = ProductId::parse("v4sLtEcMpzabRyfx").unwrap();
/// let order_id = OrderId::parse("v4sLtEcMpzabRyfx").unwrap();
///
/// // These are different types, so this won't compile:
/// // let _: ProductId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse an ID from a string slice.
            ///
            /// # Errors
            ///
            /// Returns [`IdError::Empty`](crate::types::id::IdError::Empty) if
            /// the input is empty or whitespace only.
            pub fn parse(id: &str) -> ::core::result::Result<Self, $crate::types::id::IdError> {
                if id.trim().is_empty() {
                    return Err($crate::types::id::IdError::Empty);
                }
                Ok(Self(id.to_owned()))
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::types::id::IdError;

            fn try_from(id: String) -> ::core::result::Result<Self, Self::Error> {
                if id.trim().is_empty() {
                    return Err($crate::types::id::IdError::Empty);
                }
                Ok(Self(id))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
