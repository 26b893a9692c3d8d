//! Helper macro for declaring port error enums.
//!
//! Each variant gets a snake_case constructor whose fields accept
//! `impl Into<T>`, plus an `is_<variant>` predicate.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };

    (@is $variant:ident $($fields:tt)?) => {
        ::paste::paste! {
            #[doc = concat!("Return `true` for [`Self::", stringify!($variant), "`].")]
            pub fn [<is_ $variant:snake>](&self) -> bool {
                matches!(self, Self::$variant { .. })
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
                define_port_error!(@is $variant $( { $($field)* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for generated constructors and predicates.
    define_port_error! {
        pub enum LookupError {
            Missing => "nothing matched",
            Rejected { code: String, message: String } => "rejected {code}: {message}",
            Throttled { retry_after: u32 } => "retry after {retry_after}s",
        }
    }

    #[test]
    fn unit_variants_get_plain_constructors() {
        let err = LookupError::missing();
        assert_eq!(err.to_string(), "nothing matched");
        assert!(err.is_missing());
        assert!(!err.is_rejected());
    }

    #[test]
    fn string_fields_accept_str() {
        let err = LookupError::rejected("PGRST100", "bad filter");
        assert_eq!(err.to_string(), "rejected PGRST100: bad filter");
        assert!(err.is_rejected());
    }

    #[test]
    fn non_string_fields_keep_their_type() {
        let err = LookupError::throttled(30_u32);
        assert_eq!(err.to_string(), "retry after 30s");
        assert!(err.is_throttled());
    }
}
