//! Macros for reducing boilerplate when defining entities
//!
//! These macros generate the repetitive trait implementations needed for
//! reference entities and for enumerations that travel as text (storage
//! columns, JSON documents).

/// Implement `Entity` for a struct with `id: Uuid`
///
/// Unique keys are listed as `constraint => field`.
///
/// # Example
/// ```rust,ignore
/// impl_entity!(Exporter, "exporter", "Exporter", [constraints::EXPORTER_CODE => code]);
/// ```
#[macro_export]
macro_rules! impl_entity {
    ($type:ident, $entity_type:expr, $display:expr, [$($constraint:expr => $field:ident),* $(,)?]) => {
        impl $crate::core::entity::Entity for $type {
            fn entity_type() -> &'static str {
                $entity_type
            }

            fn display_name() -> &'static str {
                $display
            }

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn unique_keys(&self) -> Vec<$crate::core::entity::UniqueKey> {
                vec![$($crate::core::entity::UniqueKey::new($constraint, self.$field.clone())),*]
            }
        }
    };
}

/// Define a fieldless enum stored as SCREAMING_SNAKE_CASE text
///
/// Generates `as_str`, `ALL`, `Display`, `FromStr` and serde impls.
///
/// # Example
/// ```rust,ignore
/// text_enum!(
///     /// Mode of transport
///     Modal { Sea => "SEA", Air => "AIR" }
/// );
/// ```
#[macro_export]
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} '{}'", stringify!($name), other)),
                }
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                text.parse().map_err(::serde::de::Error::custom)
            }
        }
    };
}
