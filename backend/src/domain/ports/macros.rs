//! Macro for declaring port error enums.
//!
//! `define_port_error!` expands to a `thiserror` enum plus one snake_case
//! constructor per variant. Field constructors take `impl Into<T>` so call
//! sites can pass `&str` for `String` fields; unit variants get a
//! zero-argument constructor.
//!
//! ```ignore
//! define_port_error! {
//!     /// Errors raised by the store.
//!     pub enum StoreError {
//!         Query { message: String } => "query failed: {message}",
//!         Timeout => "timed out",
//!     }
//! }
//!
//! let err = StoreError::query("syntax");
//! assert_eq!(StoreError::timeout().to_string(), "timed out");
//! ```

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            #[must_use]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            #[must_use]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;
