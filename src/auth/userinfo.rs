//! Userinfo payloads returned by profile endpoints.

// crates.io
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Raw userinfo object; the schema is provider-defined so every lookup is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserInfo(Map<String, Value>);
impl UserInfo {
	/// Wraps an already parsed JSON object.
	pub fn new(fields: Map<String, Value>) -> Self {
		Self(fields)
	}

	/// Looks up a raw field.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Looks up a field and returns it only when it is a non-empty string.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(Value::as_str).filter(|value| !value.is_empty())
	}

	/// Returns the first non-empty string among `keys`.
	pub fn first_str(&self, keys: &[&str]) -> Option<&str> {
		keys.iter().find_map(|key| self.get_str(key))
	}

	/// Borrows the underlying object.
	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}
}
impl From<Map<String, Value>> for UserInfo {
	fn from(value: Map<String, Value>) -> Self {
		Self(value)
	}
}
impl TryFrom<Value> for UserInfo {
	type Error = Value;

	fn try_from(value: Value) -> Result<Self, Self::Error> {
		match value {
			Value::Object(fields) => Ok(Self(fields)),
			other => Err(other),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn lookups_skip_missing_and_empty_fields() {
		let info = UserInfo::try_from(serde_json::json!({
			"sub": "u-1",
			"nickname": "",
			"preferred_username": "jdoe",
		}))
		.expect("Objects convert into userinfo.");

		assert_eq!(info.get_str("sub"), Some("u-1"));
		assert_eq!(info.get_str("nickname"), None);
		assert_eq!(info.first_str(&["nickname", "preferred_username"]), Some("jdoe"));
		assert!(info.get("email").is_none());
		assert!(UserInfo::try_from(serde_json::json!([1])).is_err());
	}
}
