//! Staleness classification of date-partitioned index names

use chrono::{NaiveDate, NaiveDateTime};

/// Format of the date token that ends a time-partitioned index name
pub const INDEX_DATE_FORMAT: &str = "%Y.%m.%d";

/// An index whose name carries a parseable creation date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
	pub name: String,
	pub creation_date: NaiveDate,
}

impl IndexRecord {
	/// Parse the trailing `YYYY.MM.DD` token of an index name.
	///
	/// Returns `None` for names that are not date-partitioned.
	pub fn parse(name: &str) -> Option<Self> {
		let token = name.rsplit('-').next()?;
		let creation_date = NaiveDate::parse_from_str(token, INDEX_DATE_FORMAT).ok()?;

		// chrono accepts unpadded fields; only the canonical form counts
		if creation_date.format(INDEX_DATE_FORMAT).to_string() != token {
			return None;
		}

		Some(Self { name: name.to_string(), creation_date })
	}

	/// Whole days elapsed between the creation date and `now`
	pub fn age_days(&self, now: NaiveDateTime) -> i64 {
		now.date().signed_duration_since(self.creation_date).num_days()
	}

	/// Stale means strictly older than the threshold
	pub fn is_stale(&self, now: NaiveDateTime, threshold_days: i64) -> bool {
		self.age_days(now) > threshold_days
	}
}

/// Select the stale, date-partitioned indices from a listing, oldest first.
///
/// Names without a valid date token are skipped. Ties on creation date are
/// ordered by name so the result only depends on the inputs.
pub fn classify<I, S>(names: I, now: NaiveDateTime, threshold_days: i64) -> Vec<IndexRecord>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut stale: Vec<IndexRecord> = names
		.into_iter()
		.filter_map(|name| IndexRecord::parse(name.as_ref()))
		.filter(|record| record.is_stale(now, threshold_days))
		.collect();

	stale.sort_by(|a, b| {
		a.creation_date
			.cmp(&b.creation_date)
			.then_with(|| a.name.cmp(&b.name))
	});
	stale
}
