//! Parameter encoding and response decoding.
//!
//! All functions take the [`EncodingStrategy`] to apply and install it for
//! the duration of the serde call. Struct fields are written in declaration
//! order, which is part of the wire contract.

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{ContentType, EncodingStrategy, Error, Result};

/// Parameters of a request once encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    /// The request has no parameters.
    Empty,
    /// Query string (without the leading `?`) to append to the path.
    Query(String),
    /// Request body and its content type.
    Body {
        /// Content type of `bytes`.
        content_type: ContentType,
        /// Encoded body.
        bytes: Bytes,
    },
}

/// Serialize a value to JSON bytes.
///
/// # Example
///
/// ```
/// use sendkit_core::{EncodingStrategy, to_json};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Unsubscribe { group_id: u32, emails: Vec<String> }
///
/// let body = Unsubscribe { group_id: 7, emails: vec!["a@example.com".to_string()] };
/// let bytes = to_json(&body, EncodingStrategy::default()).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"group_id":7,"emails":["a@example.com"]}"#);
/// ```
pub fn to_json<T: Serialize + ?Sized>(value: &T, strategy: EncodingStrategy) -> Result<Bytes> {
    strategy
        .scope(|| serde_json::to_vec(value))
        .map(Bytes::from)
        .map_err(|e| Error::encoding(e.to_string()))
}

/// Serialize a value to form URL-encoded bytes.
///
/// # Example
///
/// ```
/// use sendkit_core::{EncodingStrategy, to_form};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Login { username: String, password: String }
///
/// let login = Login { username: "alice".to_string(), password: "secret".to_string() };
/// let bytes = to_form(&login, EncodingStrategy::default()).expect("serialize");
/// assert_eq!(bytes.as_ref(), b"username=alice&password=secret");
/// ```
pub fn to_form<T: Serialize + ?Sized>(value: &T, strategy: EncodingStrategy) -> Result<Bytes> {
    strategy
        .scope(|| serde_urlencoded::to_string(value))
        .map(|s| Bytes::from(s.into_bytes()))
        .map_err(|e| Error::encoding(e.to_string()))
}

/// Serialize a value to a query string.
///
/// Uses `serde_html_form`, so `Vec<T>` fields become repeated keys
/// (`emails=a&emails=b`) and `None` fields marked with
/// `skip_serializing_if` are left out.
///
/// # Example
///
/// ```
/// use sendkit_core::{EncodingStrategy, to_query_string};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Search {
///     username: String,
///     #[serde(skip_serializing_if = "Option::is_none")]
///     limit: Option<u32>,
/// }
///
/// let search = Search { username: "bob".to_string(), limit: Some(10) };
/// let query = to_query_string(&search, EncodingStrategy::default()).expect("serialize");
/// assert_eq!(query, "username=bob&limit=10");
/// ```
pub fn to_query_string<T: Serialize + ?Sized>(
    value: &T,
    strategy: EncodingStrategy,
) -> Result<String> {
    strategy
        .scope(|| serde_html_form::to_string(value))
        .map_err(|e| Error::encoding(e.to_string()))
}

/// Serialize a value as a body of the given content type.
///
/// Only JSON and form URL-encoded bodies can be produced from structured
/// parameters.
pub fn to_body<T: Serialize + ?Sized>(
    value: &T,
    content_type: ContentType,
    strategy: EncodingStrategy,
) -> Result<Bytes> {
    match content_type {
        ContentType::Json => to_json(value, strategy),
        ContentType::FormUrlEncoded => to_form(value, strategy),
        other => Err(Error::encoding(format!(
            "parameters cannot be encoded as {other}"
        ))),
    }
}

/// Deserialize a JSON body with path-aware error messages.
///
/// An empty body is read as JSON `null`, so `()` and `Option<T>` models
/// accept `202 Accepted` and `204 No Content` responses.
///
/// # Errors
///
/// Returns [`Error::Decoding`] with the path to the field that failed
/// (e.g. `result[0].email`) and a copy of the raw body.
pub fn from_json<T: DeserializeOwned>(body: &Bytes, strategy: EncodingStrategy) -> Result<T> {
    let input: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        body
    };

    strategy
        .scope(|| {
            let mut deserializer = serde_json::Deserializer::from_slice(input);
            serde_path_to_error::deserialize(&mut deserializer)
        })
        .map_err(|e| Error::decoding(e.path().to_string(), e.inner().to_string(), body.clone()))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::{Binary, DateEncoding, Page, Timestamp};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Attachment {
        filename: String,
        content: Binary,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        content_id: Option<String>,
        uploaded_at: Timestamp,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        expires_at: Option<Timestamp>,
    }

    fn attachment() -> Attachment {
        Attachment {
            filename: "report.csv".to_string(),
            content: Binary::from(&b"a,b\n1,2\n"[..]),
            content_id: None,
            uploaded_at: Timestamp::from_unix(1_500_000_000).expect("timestamp"),
            expires_at: None,
        }
    }

    #[test]
    fn json_keeps_declaration_order_and_omits_none() {
        let bytes = to_json(&attachment(), EncodingStrategy::default()).expect("serialize");
        insta::assert_snapshot!(
            String::from_utf8(bytes.to_vec()).expect("utf8"),
            @r#"{"filename":"report.csv","content":"YSxiCjEsMgo=","uploaded_at":"2017-07-14T02:40:00Z"}"#
        );
    }

    #[test]
    fn encoding_is_deterministic() {
        let first = to_json(&attachment(), EncodingStrategy::default()).expect("first");
        let second = to_json(&attachment(), EncodingStrategy::default()).expect("second");
        assert_eq!(first, second);

        let first = to_query_string(&Page::new(4, 8), EncodingStrategy::default()).expect("first");
        let second =
            to_query_string(&Page::new(4, 8), EncodingStrategy::default()).expect("second");
        assert_eq!(first, second);
        assert_eq!(first, "limit=4&offset=8");
    }

    #[test]
    fn round_trip_with_default_strategy() {
        let mut value = attachment();
        value.content_id = Some("cid-1".to_string());
        value.expires_at = Timestamp::from_unix(1_600_000_000);

        for original in [attachment(), value] {
            let bytes = to_json(&original, EncodingStrategy::default()).expect("serialize");
            let decoded: Attachment =
                from_json(&bytes, EncodingStrategy::default()).expect("deserialize");
            assert_eq!(decoded, original);
        }
    }

    #[test]
    fn query_string_follows_date_rule() {
        #[derive(Serialize)]
        struct Window {
            start_time: Timestamp,
            end_time: Timestamp,
        }

        let window = Window {
            start_time: Timestamp::from_unix(15).expect("start"),
            end_time: Timestamp::from_unix(16).expect("end"),
        };

        assert_eq!(
            to_query_string(&window, EncodingStrategy::unix_seconds()).expect("query"),
            "start_time=15&end_time=16"
        );
        assert_eq!(
            to_query_string(&window, EncodingStrategy::default()).expect("query"),
            "start_time=1970-01-01T00%3A00%3A15Z&end_time=1970-01-01T00%3A00%3A16Z"
        );
        assert_eq!(
            to_query_string(
                &window,
                EncodingStrategy::default().with_dates(DateEncoding::MillisecondsSince1970)
            )
            .expect("query"),
            "start_time=15000&end_time=16000"
        );
    }

    #[test]
    fn form_body() {
        let body = to_body(
            &Page::new(10, 0),
            ContentType::FormUrlEncoded,
            EncodingStrategy::default(),
        )
        .expect("form");
        assert_eq!(body.as_ref(), b"limit=10&offset=0");

        let err = to_body(&Page::new(10, 0), ContentType::Csv, EncodingStrategy::default())
            .expect_err("csv is not supported");
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn empty_body_decodes_as_null() {
        let unit: () = from_json(&Bytes::new(), EncodingStrategy::default()).expect("unit");
        assert_eq!(unit, ());

        let missing: Option<Page> =
            from_json(&Bytes::from_static(b"  \n"), EncodingStrategy::default()).expect("none");
        assert_eq!(missing, None);
    }

    #[test]
    fn decode_error_has_path_and_body() {
        let body = Bytes::from(r#"[{"limit":1,"offset":0},{"limit":"x","offset":0}]"#);
        let err = from_json::<Vec<Page>>(&body, EncodingStrategy::default())
            .expect_err("should fail");

        match err {
            Error::Decoding {
                path,
                body: raw,
                ..
            } => {
                assert_eq!(path, "[1].limit");
                assert_eq!(raw, body);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn serialization_failure_is_encoding_error() {
        #[derive(Serialize)]
        struct Nested {
            inner: Page,
        }

        let err = to_query_string(
            &Nested {
                inner: Page::new(1, 0),
            },
            EncodingStrategy::default(),
        )
        .expect_err("nested structs cannot be query encoded");
        assert!(matches!(err, Error::Encoding(_)));
    }
}
