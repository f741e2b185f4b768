//! Ordered scope lists split from and joined into provider scope strings.

// std
use std::slice::Iter;
// self
use crate::_prelude::*;

/// Ordered sequence of granted scopes.
///
/// Providers disagree on the scope delimiter (space or comma), so the list never
/// normalizes, sorts, or deduplicates: `ScopeList::split(s, d).join(d) == s` for every
/// `s` without a leading or trailing delimiter. An empty scope string yields an empty
/// list, never a list holding one empty entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeList(Vec<String>);
impl ScopeList {
	/// Creates a list from already separated scopes.
	pub fn new<I, S>(scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self(scopes.into_iter().map(Into::into).collect())
	}

	/// Splits a provider scope string on `delimiter`.
	pub fn split(raw: &str, delimiter: char) -> Self {
		if raw.is_empty() {
			return Self::default();
		}

		Self(raw.split(delimiter).map(str::to_owned).collect())
	}

	/// Reads scopes from a JSON value: a delimited string or an array of strings.
	///
	/// Any other shape (null, numbers, objects) yields an empty list.
	pub fn from_value(value: &serde_json::Value, delimiter: char) -> Self {
		match value {
			serde_json::Value::String(raw) => Self::split(raw, delimiter),
			serde_json::Value::Array(items) =>
				Self(items.iter().filter_map(|item| item.as_str()).map(str::to_owned).collect()),
			_ => Self::default(),
		}
	}

	/// Joins the scopes with `delimiter`.
	pub fn join(&self, delimiter: char) -> String {
		let mut buf = String::new();

		for (idx, scope) in self.0.iter().enumerate() {
			if idx > 0 {
				buf.push(delimiter);
			}

			buf.push_str(scope);
		}

		buf
	}

	/// Number of scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no scopes are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true if the list contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.iter().any(|candidate| candidate == scope)
	}

	/// Iterator over scopes in provider order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Returns the underlying slice of scope strings.
	pub fn as_slice(&self) -> &[String] {
		&self.0
	}
}
impl<'a> IntoIterator for &'a ScopeList {
	type IntoIter = ScopeIter<'a>;
	type Item = &'a str;

	fn into_iter(self) -> Self::IntoIter {
		ScopeIter { inner: self.0.iter() }
	}
}

/// Iterator over scope strings.
pub struct ScopeIter<'a> {
	inner: Iter<'a, String>,
}
impl<'a> Iterator for ScopeIter<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next().map(|s| s.as_str())
	}
}
impl From<Vec<String>> for ScopeList {
	fn from(value: Vec<String>) -> Self {
		Self(value)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn empty_string_yields_empty_list() {
		assert!(ScopeList::split("", ' ').is_empty());
		assert!(ScopeList::split("", ',').is_empty());
		assert_eq!(ScopeList::split("", ',').join(','), "");
	}

	#[test]
	fn split_and_join_round_trip_for_both_delimiters() {
		for (raw, delimiter) in [
			("profile email", ' '),
			("read_user,api,read_repository", ','),
			("single", ' '),
			("ReadAccounts CallControl ReadPresence", ' '),
		] {
			let scopes = ScopeList::split(raw, delimiter);

			assert_eq!(scopes.join(delimiter), raw);
		}
	}

	#[test]
	fn split_preserves_provider_order() {
		let scopes = ScopeList::split("profile,email,profile", ',');

		assert_eq!(scopes.iter().collect::<Vec<_>>(), vec!["profile", "email", "profile"]);
		assert!(scopes.contains("email"));
		assert_eq!(scopes.len(), 3);
	}

	#[test]
	fn from_value_accepts_strings_and_arrays() {
		let from_string = ScopeList::from_value(&serde_json::json!("a b"), ' ');
		let from_array = ScopeList::from_value(&serde_json::json!(["a", "b", 3]), ' ');
		let from_null = ScopeList::from_value(&serde_json::Value::Null, ' ');

		assert_eq!(from_string, ScopeList::new(["a", "b"]));
		assert_eq!(from_array, ScopeList::new(["a", "b"]));
		assert!(from_null.is_empty());
	}
}
