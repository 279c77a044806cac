use std::collections::HashMap;

use axum::http::{header, HeaderMap};
use percent_encoding::percent_decode;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, thiserror::Error)]
pub enum FormBodyError {
    #[error("Expected an application/x-www-form-urlencoded body, got '{0}'")]
    ContentType(String),
    #[error("Invalid percent escape in '{0}'")]
    Escape(String),
    #[error("Form data is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Decodes a urlencoded form body. Unlike a lenient decoder, a stray `%`
/// or bytes that do not decode to UTF-8 reject the whole body. The first
/// value wins when a field repeats.
pub fn parse_form_body(
    headers: &HeaderMap,
    body: &[u8],
) -> Result<HashMap<String, String>, FormBodyError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let essence = content_type.split(';').next().unwrap_or("").trim();
    if !essence.eq_ignore_ascii_case(FORM_CONTENT_TYPE) {
        return Err(FormBodyError::ContentType(content_type.to_string()));
    }

    let body = std::str::from_utf8(body)?;
    let mut fields = HashMap::new();
    for pair in body.split('&').filter(|pair| !pair.is_empty()) {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = decode_component(name)?;
        let value = decode_component(value)?;
        fields.entry(name).or_insert(value);
    }
    Ok(fields)
}

fn decode_component(raw: &str) -> Result<String, FormBodyError> {
    let bytes = raw.as_bytes();
    for (i, _) in raw.match_indices('%') {
        let escape = bytes.get(i + 1..i + 3);
        if !matches!(escape, Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()) {
            return Err(FormBodyError::Escape(raw.to_string()));
        }
    }

    let spaced = raw.replace('+', " ");
    Ok(percent_decode(spaced.as_bytes()).decode_utf8()?.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn form_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );
        headers
    }

    #[test]
    fn test_decodes_fields() {
        let fields = parse_form_body(
            &form_headers(),
            b"first_name=Zo%C3%AB&last_name=van+Dyke&email=z%40x.com&note=1%2B1&empty=",
        )
        .unwrap();

        assert_eq!(fields["first_name"], "Zoë");
        assert_eq!(fields["last_name"], "van Dyke");
        assert_eq!(fields["email"], "z@x.com");
        assert_eq!(fields["note"], "1+1");
        assert_eq!(fields["empty"], "");
    }

    #[test]
    fn test_first_value_wins() {
        let fields = parse_form_body(&form_headers(), b"a=1&a=2").unwrap();
        assert_eq!(fields["a"], "1");
    }

    #[test]
    fn test_empty_body_is_an_empty_form() {
        assert!(parse_form_body(&form_headers(), b"").unwrap().is_empty());
    }

    #[test]
    fn test_bad_escapes_are_rejected() {
        for body in [&b"first_name=%zz"[..], b"first_name=abc%", b"first_name=%4", b"%g1=x"] {
            let err = parse_form_body(&form_headers(), body).unwrap_err();
            assert!(matches!(err, FormBodyError::Escape(_)), "{:?}", body);
        }
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let err = parse_form_body(&form_headers(), b"first_name=Jo%FF%FEhn").unwrap_err();
        assert!(matches!(err, FormBodyError::Utf8(_)));

        let err = parse_form_body(&form_headers(), b"first_name=Jo\xFFhn").unwrap_err();
        assert!(matches!(err, FormBodyError::Utf8(_)));
    }

    #[test]
    fn test_wrong_content_type_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let err = parse_form_body(&headers, b"{}").unwrap_err();
        assert!(matches!(err, FormBodyError::ContentType(ref ct) if ct == "application/json"));

        let err = parse_form_body(&HeaderMap::new(), b"a=1").unwrap_err();
        assert!(matches!(err, FormBodyError::ContentType(_)));
    }
}
