//! Helper macro for port error enums.
//!
//! Every port error variant carries a single `message` field. The macro
//! derives `thiserror::Error`, prefixes each message, and generates a
//! snake_case constructor per variant plus a `message()` accessor.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $prefix:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error("{prefix}: {message}", prefix = $prefix)]
                $variant { message: String },
            )*
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = concat!("Build a `", stringify!($variant), "` error.")]
                    pub fn [<$variant:snake>](message: impl Into<String>) -> Self {
                        Self::$variant { message: message.into() }
                    }
                }
            )*

            /// Adapter-supplied detail without the variant prefix.
            pub fn message(&self) -> &str {
                match self {
                    $( Self::$variant { message } => message.as_str(), )*
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum SamplePortError {
            Connection => "sample connection failed",
            QueryTimeout => "sample query timed out",
        }
    }

    #[test]
    fn constructors_use_snake_case_names() {
        let err = SamplePortError::query_timeout("after 5s");
        assert_eq!(err, SamplePortError::QueryTimeout { message: "after 5s".into() });
        assert_eq!(err.to_string(), "sample query timed out: after 5s");
    }

    #[test]
    fn message_strips_prefix() {
        let err = SamplePortError::connection("refused");
        assert_eq!(err.message(), "refused");
    }
}
