//! Closed text enums mapped to PostgreSQL enum types.
//!
//! Each enum variant's text matches the labels declared by the corresponding
//! `CREATE TYPE ... AS ENUM` migration, and is also the form used in JSON and
//! in search documents.

/// Returned when parsing text that is not a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $pg_type:tt {
            $( $(#[$vmeta:meta])* $variant:ident = $text:tt ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            sqlx::Type, serde::Serialize, serde::Deserialize,
        )]
        #[sqlx(type_name = $pg_type)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[sqlx(rename = $text)]
                #[serde(rename = $text)]
                $variant
            ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The database / wire text for this variant.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: $pg_type,
                        value: value.to_string(),
                    }),
                }
            }
        }
    };
}

define_text_enum! {
    /// Kind of project listing. Slugs are unique per type.
    ProjectType as "project_type" {
        Mod = "mod",
    }
}

define_text_enum! {
    /// Moderation status. Only `Approved` projects are publicly visible.
    ProjectStatus as "project_status" {
        Draft = "draft",
        Approved = "approved",
        Rejected = "rejected",
        Banned = "banned",
    }
}

define_text_enum! {
    /// Role a member holds on a project.
    MemberRole as "project_member_role" {
        Owner = "owner",
        Admin = "admin",
        Developer = "developer",
        Maintainer = "maintainer",
        Member = "member",
    }
}
