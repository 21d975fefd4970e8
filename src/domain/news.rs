//! Scripted news events keyed by calendar date.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::time::Duration;

/// How long playback stays paused on a news day before resuming on its own.
pub const NEWS_PAUSE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub date: NaiveDate,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsBook {
    items: BTreeMap<NaiveDate, String>,
}

impl NewsBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later inserts for the same date replace earlier ones.
    pub fn insert(&mut self, date: NaiveDate, message: impl Into<String>) {
        self.items.insert(date, message.into());
    }

    pub fn get(&self, date: NaiveDate) -> Option<&str> {
        self.items.get(&date).map(String::as_str)
    }

    /// Every item dated on or before `date`, oldest first.
    pub fn history_until(&self, date: NaiveDate) -> Vec<NewsItem> {
        self.items
            .range(..=date)
            .map(|(d, m)| NewsItem {
                date: *d,
                message: m.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<(NaiveDate, String)> for NewsBook {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, String)>>(iter: I) -> Self {
        NewsBook {
            items: iter.into_iter().collect(),
        }
    }
}

/// Remembers the last news date that paused playback so that the same date
/// does not trigger twice in a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NewsTrigger {
    last_seen: Option<NaiveDate>,
}

impl NewsTrigger {
    pub fn last_seen(&self) -> Option<NaiveDate> {
        self.last_seen
    }

    /// Returns the message when `date` has news and was not the last date
    /// triggered, recording it.
    pub fn check<'a>(&mut self, date: NaiveDate, book: &'a NewsBook) -> Option<&'a str> {
        let message = book.get(date)?;
        if self.last_seen == Some(date) {
            return None;
        }
        self.last_seen = Some(date);
        Some(message)
    }

    pub fn clear(&mut self) {
        self.last_seen = None;
    }
}
