//! Query-string assembly for search endpoints.
//!
//! Values are percent-encoded individually. Multi-value filters are joined
//! with literal commas after each item is encoded, so the separator itself
//! stays readable on the wire (`TradeType=SELL,BUY`). Empty filter lists
//! produce no parameter at all.

use url::form_urlencoded::byte_serialize;

/// Incremental builder for a request's query string.
#[derive(Debug, Default)]
pub(crate) struct QueryBuilder {
    parts: Vec<String>,
}

impl QueryBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append `key=value` with the value percent-encoded.
    pub(crate) fn push(&mut self, key: &str, value: &str) -> &mut Self {
        self.parts.push(format!("{key}={}", encode(value)));
        self
    }

    /// Append `key=value` when the value is present.
    pub(crate) fn push_opt(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Append a comma-joined multi-value filter. An empty list appends
    /// nothing; a dangling `key=` would be a different request.
    pub(crate) fn push_list<S: AsRef<str>>(&mut self, key: &str, values: &[S]) -> &mut Self {
        if values.is_empty() {
            return self;
        }
        let joined = values
            .iter()
            .map(|v| encode(v.as_ref()))
            .collect::<Vec<_>>()
            .join(",");
        self.parts.push(format!("{key}={joined}"));
        self
    }

    /// Render as `path?a=1&b=2`, or just `path` when nothing was pushed.
    pub(crate) fn apply(&self, path: &str) -> String {
        if self.parts.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{}", self.parts.join("&"))
        }
    }
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_encodes_values() {
        let mut q = QueryBuilder::new();
        q.push("DType", "W").push("Order", "A B");
        assert_eq!(q.apply("p"), "p?DType=W&Order=A+B");
    }

    #[test]
    fn push_opt_skips_none() {
        let mut q = QueryBuilder::new();
        q.push_opt("SDate", None).push_opt("EDate", Some("20250131"));
        assert_eq!(q.apply("p"), "p?EDate=20250131");
    }

    #[test]
    fn empty_list_emits_no_parameter() {
        let mut q = QueryBuilder::new();
        q.push_list::<&str>("TradeType", &[]);
        assert_eq!(q.apply("p"), "p");
    }

    #[test]
    fn list_joins_with_literal_comma() {
        let mut q = QueryBuilder::new();
        q.push_list("TradeType", &["SELL", "BUY", "TRUSTEE"]);
        assert_eq!(q.apply("p"), "p?TradeType=SELL,BUY,TRUSTEE");
    }

    #[test]
    fn list_items_are_encoded_individually() {
        let mut q = QueryBuilder::new();
        q.push_list("TaxRegID", &["4:001", "4:002"]);
        assert_eq!(q.apply("p"), "p?TaxRegID=4%3A001,4%3A002");
    }

    #[test]
    fn no_parts_renders_bare_path() {
        assert_eq!(QueryBuilder::new().apply("HomeTax/Cashbill/JobList"),
            "HomeTax/Cashbill/JobList");
    }
}
