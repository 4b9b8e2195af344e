//! Raw provider metadata returned next to the token (`id_token`, custom claims, ...).

// crates.io
use serde_json::{Map, Value};

/// Extra fields captured from the token endpoint response.
///
/// Providers answer either with a form-encoded body (ordered key/value pairs, repeated keys
/// allowed) or a JSON object. Both are queried through [`TokenExtra::get`]; the representation
/// itself stays private.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenExtra(Repr);
impl TokenExtra {
	/// Captures form-encoded pairs, preserving their order.
	pub fn from_form_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		Self(Repr::Form(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()))
	}

	/// Captures a JSON object.
	pub fn from_json_map(map: Map<String, Value>) -> Self {
		Self(Repr::Json(map))
	}

	/// Returns the string value stored under `key`.
	///
	/// Form metadata yields the first value for a repeated key. JSON metadata only yields string
	/// values; numbers, booleans, and nested objects return `None`.
	pub fn get(&self, key: &str) -> Option<&str> {
		match &self.0 {
			Repr::Form(pairs) =>
				pairs.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str()),
			Repr::Json(map) => map.get(key).and_then(Value::as_str),
		}
	}

	/// Returns `true` when no metadata was captured.
	pub fn is_empty(&self) -> bool {
		match &self.0 {
			Repr::Form(pairs) => pairs.is_empty(),
			Repr::Json(map) => map.is_empty(),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
enum Repr {
	Form(Vec<(String, String)>),
	Json(Map<String, Value>),
}
