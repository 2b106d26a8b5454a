use crate::model::Amount;
use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// One spending record.
///
/// `date` is kept exactly as it was entered (normally `YYYY-MM-DD`) and parsed on demand with
/// `Expense::parsed_date`, so a malformed date never prevents the collection from loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Stable identity, assigned when the record is created. Records saved before ids existed get
    /// a fresh one when they are loaded.
    #[serde(default = "Uuid::new_v4", deserialize_with = "id_or_new")]
    pub(crate) id: Uuid,
    #[serde(default)]
    pub(crate) amount: Amount,
    pub(crate) category: String,
    pub(crate) date: String,
    #[serde(default)]
    pub(crate) notes: String,
}

impl Expense {
    /// Creates a new expense with a freshly generated id.
    pub fn new(
        amount: Amount,
        category: impl Into<String>,
        date: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            category: category.into(),
            date: date.into(),
            notes: notes.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// The first eight characters of the id, which is enough to tell records apart in a listing.
    pub fn short_id(&self) -> String {
        short_id(self.id)
    }

    /// Parses `date`, returning `None` when it cannot be understood.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    /// The calendar month, 1 through 12, of `date`.
    pub fn month(&self) -> Option<u32> {
        self.parsed_date().map(|d| d.month())
    }

    /// Returns a copy of `self` carrying `id`. Used when a record replaces another in place.
    pub(crate) fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// The first eight hex digits of `id`.
pub fn short_id(id: Uuid) -> String {
    let mut simple = id.simple().to_string();
    simple.truncate(8);
    simple
}

/// A `null` id is treated like a missing one.
fn id_or_new<'de, D>(deserializer: D) -> Result<Uuid, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Uuid>::deserialize(deserializer)?.unwrap_or_else(Uuid::new_v4))
}

/// Parses a `YYYY-MM-DD` date or, failing that, the date part of an RFC 3339 timestamp.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}
