//! Product identifiers used as cart handles.
//!
//! Product pages hand the cart an opaque id that is stable per product and
//! variant. Pages emit either strings (`"hijab-rose"`) or plain integers
//! (`42`), so both shapes are accepted and each is written back exactly as it
//! was read.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a distinct product configuration in the cart.
///
/// Two ids are equal only when both their kind and their value match, so the
/// text id `"1"` and the numeric id `1` refer to different rows.
///
/// ```
/// use serenya_core::ItemId;
///
/// let text: ItemId = serde_json::from_str("\"A\"").unwrap();
/// let number: ItemId = serde_json::from_str("7").unwrap();
///
/// assert_eq!(text, ItemId::from("A"));
/// assert_eq!(number, ItemId::from(7));
/// assert_ne!(ItemId::from("7"), ItemId::from(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    /// Integer id, as emitted by pages that key products numerically.
    Number(i64),
    /// Free-form text id.
    Text(String),
}

impl ItemId {
    /// Parse an id coming from a form field.
    ///
    /// Form values are always text; a value made only of ASCII digits (with an
    /// optional leading minus) is read back as a numeric id so that it matches
    /// rows added through the JSON API with a numeric id. The `n:`/`s:` prefixes
    /// written by [`ItemId::to_form_value`] force the kind explicitly.
    #[must_use]
    pub fn from_form_value(raw: &str) -> Self {
        if let Some(text) = raw.strip_prefix("s:") {
            return Self::Text(text.to_string());
        }
        let digits = raw.strip_prefix("n:").unwrap_or(raw);
        digits
            .parse::<i64>()
            .map_or_else(|_| Self::Text(raw.to_string()), Self::Number)
    }

    /// Encode the id for a form field so that it parses back to the same kind.
    #[must_use]
    pub fn to_form_value(&self) -> String {
        match self {
            Self::Number(n) => format!("n:{n}"),
            Self::Text(s) => format!("s:{s}"),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_keeps_kind() {
        let ids: Vec<ItemId> = serde_json::from_str(r#"["A", 12, "12"]"#).unwrap();
        assert_eq!(
            ids,
            vec![
                ItemId::from("A"),
                ItemId::from(12),
                ItemId::Text("12".to_string())
            ]
        );
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"["A",12,"12"]"#);
    }

    #[test]
    fn test_form_value_round_trip() {
        for id in [ItemId::from("rose-chiffon"), ItemId::from(9), ItemId::from("9")] {
            assert_eq!(ItemId::from_form_value(&id.to_form_value()), id);
        }
    }

    #[test]
    fn test_form_value_without_prefix() {
        assert_eq!(ItemId::from_form_value("31"), ItemId::from(31));
        assert_eq!(ItemId::from_form_value("X"), ItemId::from("X"));
    }

    #[test]
    fn test_display() {
        assert_eq!(ItemId::from(5).to_string(), "5");
        assert_eq!(ItemId::from("silk").to_string(), "silk");
    }
}
