//! Decoding of the `q` query-string parameter, e.g.
//! `?q={"filters":[{"name":"price","op":"ge","val":20000}]}`.

use query_filter::FilterError;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct SearchRequest {
    #[serde(default)]
    filters: Option<Vec<Value>>,
}

/// Returns the raw filter list. A missing or blank `q`, or one without
/// `filters`, means "no filtering".
pub fn parse_search_query(q: Option<&str>) -> Result<Option<Vec<Value>>, FilterError> {
    let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) else {
        return Ok(None);
    };
    let request: SearchRequest = serde_json::from_str(q)
        .map_err(|e| FilterError::MalformedFilter(format!("invalid search query: {}", e)))?;
    Ok(request.filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_or_blank_query() {
        assert_eq!(parse_search_query(None), Ok(None));
        assert_eq!(parse_search_query(Some("  ")), Ok(None));
        assert_eq!(parse_search_query(Some("{}")), Ok(None));
        assert_eq!(parse_search_query(Some(r#"{"filters": null}"#)), Ok(None));
    }

    #[test]
    fn test_filters_extracted() {
        let parsed = parse_search_query(Some(
            r#"{"filters": [{"name": "price", "op": "ge", "val": 20000}]}"#,
        ))
        .unwrap()
        .unwrap();
        assert_eq!(parsed, vec![json!({"name": "price", "op": "ge", "val": 20000})]);

        assert_eq!(parse_search_query(Some(r#"{"filters": []}"#)), Ok(Some(vec![])));
    }

    #[test]
    fn test_malformed_query() {
        for q in ["not json", r#"{"filters": {"name": "price"}}"#, "[1, 2]"] {
            let err = parse_search_query(Some(q)).unwrap_err();
            assert_eq!(err.cause(), "malformed_filter", "{}", q);
        }
    }
}
