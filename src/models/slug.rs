use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize;
use diesel::serialize::{IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// URL-friendly identifier of an item, stored as TEXT
///
/// A slug only ever contains lowercase ASCII letters, digits and single `-`
/// separators, and never starts or ends with a separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derives a slug from an item title
    ///
    /// The title is transliterated to ASCII first ("Café" becomes "Cafe").
    /// Letters are then lowercased, digits are kept, and every other run of
    /// characters collapses into one `-`. A title with no usable characters
    /// yields the slug `item`.
    pub fn from_title(title: &str) -> Self {
        let ascii = deunicode::deunicode(title);
        let mut slug = String::with_capacity(ascii.len());
        let mut pending_separator = false;

        for ch in ascii.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_separator && !slug.is_empty() {
                    slug.push('-');
                }
                pending_separator = false;
                slug.push(ch.to_ascii_lowercase());
            } else {
                pending_separator = true;
            }
        }

        if slug.is_empty() {
            slug.push_str("item");
        }

        Self(slug)
    }

    /// Returns the slug with a numeric suffix, e.g. `my-item-2`
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{}", self.0, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Slug {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl FromSql<Text, Sqlite> for Slug {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(Slug(text))
    }
}

impl ToSql<Text, Sqlite> for Slug {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.0.as_str());
        Ok(IsNull::No)
    }
}
