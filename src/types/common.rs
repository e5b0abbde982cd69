//! Shared building blocks for the wire models.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::error::{Error, Result};

/// Declare a string-valued state enum that degrades unknown server values to
/// `Unknown` instead of failing the parse.
///
/// The unknown raw value is reported once per enum type per process through
/// [`crate::logging::warn_once`]. `Unknown` serializes as the empty string.
macro_rules! lenient_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
            #[default]
            Unknown,
        }

        impl $name {
            /// Wire representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $value, )+
                    Self::Unknown => "",
                }
            }

            /// Parse a wire value, mapping anything unrecognized to `Unknown`.
            pub fn parse_lenient(raw: &str) -> Self {
                match raw {
                    $( $value => Self::$variant, )+
                    "" => Self::Unknown,
                    other => {
                        $crate::logging::warn_once(
                            stringify!($name),
                            &format!(
                                "Unknown value {:?} for {}, treating it as Unknown",
                                other,
                                stringify!($name)
                            ),
                        );
                        Self::Unknown
                    }
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    Self::Unknown => f.write_str("Unknown"),
                    other => f.write_str(other.as_str()),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
                s.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
                let raw = String::deserialize(d)?;
                Ok(Self::parse_lenient(&raw))
            }
        }
    };
}

pub(crate) use lenient_enum;

/// Cross-field checks run before a model is sent to the server.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<()> {
        match self {
            Some(inner) => inner.validate(),
            None => Ok(()),
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<()> {
        self.iter().try_for_each(Validate::validate)
    }
}

/// Metadata shared by every platform-owned entity.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub id: Option<String>,
    pub name: Option<String>,
    pub created_at: Option<i64>,
    pub last_modified_at: Option<i64>,
    pub owner: Option<String>,
    pub created_by: Option<String>,
    pub last_modified_by: Option<String>,
    pub semantic_version: Option<String>,
    pub version: Option<i64>,
    pub workspace: Option<String>,
}

impl Metadata {
    pub fn named(name: &str) -> Self {
        Self {
            id: Some(name.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }
}

/// Something a facade can address by id: a bare string or a typed entity.
pub trait AsResourceId {
    fn resource_id(&self) -> Result<&str>;
}

impl AsResourceId for str {
    fn resource_id(&self) -> Result<&str> {
        if self.is_empty() {
            return Err(Error::validation("resource id must not be empty"));
        }
        Ok(self)
    }
}

impl AsResourceId for String {
    fn resource_id(&self) -> Result<&str> {
        self.as_str().resource_id()
    }
}

/// Entities whose id lives in `metadata.id`.
pub(crate) fn metadata_id<'a>(metadata: &'a Option<Metadata>, kind: &str) -> Result<&'a str> {
    metadata
        .as_ref()
        .and_then(|m| m.id.as_deref())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::validation(format!("{kind} has no metadata id")))
}

macro_rules! impl_resource_id_from_metadata {
    ($($ty:ty => $kind:literal),+ $(,)?) => {
        $(
            impl $crate::types::common::AsResourceId for $ty {
                fn resource_id(&self) -> $crate::error::Result<&str> {
                    $crate::types::common::metadata_id(&self.metadata, $kind)
                }
            }
        )+
    };
}

pub(crate) use impl_resource_id_from_metadata;

/// Security context applied to user containers.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSecurityContext {
    pub run_as_user: Option<i64>,
    pub run_as_group: Option<i64>,
}
