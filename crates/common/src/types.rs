use serde::{Deserialize, Serialize};

/// Declares an integer-backed identifier newtype.
///
/// Catalog rows are keyed by database serials, so every identifier wraps the
/// integer the backing table hands out.
macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($inner);

        impl $name {
            /// Creates an identifier from its raw value.
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Returns the raw value.
            pub const fn get(&self) -> $inner {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

integer_id!(
    /// Unique identifier for a product in the catalog.
    ProductId(i64)
);

integer_id!(
    /// Unique identifier for a category.
    CategoryId(i32)
);

integer_id!(
    /// Unique identifier for a subcategory.
    SubcategoryId(i32)
);
