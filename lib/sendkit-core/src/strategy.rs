//! Encoding strategy for dates and binary payloads.
//!
//! An [`EncodingStrategy`] selects one date rule and one binary rule. The
//! encoders in this crate install the strategy of the request being encoded
//! for the duration of a (synchronous) serde call, and the wire types
//! [`Timestamp`] and [`Binary`] read it back from their `Serialize` and
//! `Deserialize` impls. Outside of a scope the default strategy applies.
//!
//! ```
//! use sendkit_core::{EncodingStrategy, Timestamp, to_json};
//!
//! #[derive(serde::Serialize)]
//! struct Schedule { send_at: Timestamp }
//!
//! let schedule = Schedule { send_at: Timestamp::from_unix(15).unwrap() };
//! let body = to_json(&schedule, EncodingStrategy::unix_seconds()).unwrap();
//! assert_eq!(body.as_ref(), br#"{"send_at":15}"#);
//! ```

use std::cell::Cell;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

thread_local! {
    static ACTIVE: Cell<Option<EncodingStrategy>> = const { Cell::new(None) };
}

// ============================================================================
// Date Encoding
// ============================================================================

/// Custom date transform, one function per direction.
#[derive(Clone, Copy)]
pub struct DateCodec {
    encode: fn(&DateTime<Utc>) -> String,
    decode: fn(&str) -> Option<DateTime<Utc>>,
}

impl DateCodec {
    /// Create a codec from an encoding and a decoding function.
    #[must_use]
    pub const fn new(
        encode: fn(&DateTime<Utc>) -> String,
        decode: fn(&str) -> Option<DateTime<Utc>>,
    ) -> Self {
        Self { encode, decode }
    }
}

impl fmt::Debug for DateCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateCodec").finish_non_exhaustive()
    }
}

/// How dates are written to and read from the wire.
#[derive(Debug, Clone, Copy, Default)]
pub enum DateEncoding {
    /// RFC 3339 / ISO-8601 text, e.g. `2024-05-01T12:00:00Z`.
    #[default]
    Iso8601,
    /// Integer seconds since the Unix epoch.
    SecondsSince1970,
    /// Integer milliseconds since the Unix epoch.
    MillisecondsSince1970,
    /// Text produced and parsed by user functions.
    Custom(DateCodec),
}

impl DateEncoding {
    fn write<S: Serializer>(
        self,
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match self {
            Self::Iso8601 => {
                serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Self::SecondsSince1970 => serializer.serialize_i64(value.timestamp()),
            Self::MillisecondsSince1970 => serializer.serialize_i64(value.timestamp_millis()),
            Self::Custom(codec) => serializer.serialize_str(&(codec.encode)(value)),
        }
    }

    fn decode_str(self, value: &str) -> Option<DateTime<Utc>> {
        match self {
            Self::Iso8601 => DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|date| date.with_timezone(&Utc)),
            Self::SecondsSince1970 | Self::MillisecondsSince1970 => {
                value.trim().parse().ok().and_then(|v| self.decode_int(v))
            }
            Self::Custom(codec) => (codec.decode)(value),
        }
    }

    fn decode_int(self, value: i64) -> Option<DateTime<Utc>> {
        match self {
            Self::Iso8601 => None,
            Self::SecondsSince1970 => DateTime::from_timestamp(value, 0),
            Self::MillisecondsSince1970 => DateTime::from_timestamp_millis(value),
            Self::Custom(codec) => (codec.decode)(&value.to_string()),
        }
    }
}

// ============================================================================
// Data Encoding
// ============================================================================

/// Custom binary transform, one function per direction.
#[derive(Clone, Copy)]
pub struct DataCodec {
    encode: fn(&[u8]) -> String,
    decode: fn(&str) -> Option<Vec<u8>>,
}

impl DataCodec {
    /// Create a codec from an encoding and a decoding function.
    #[must_use]
    pub const fn new(encode: fn(&[u8]) -> String, decode: fn(&str) -> Option<Vec<u8>>) -> Self {
        Self { encode, decode }
    }
}

impl fmt::Debug for DataCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataCodec").finish_non_exhaustive()
    }
}

/// How binary payloads are written to and read from the wire.
#[derive(Debug, Clone, Copy, Default)]
pub enum DataEncoding {
    /// Standard base64 with padding.
    #[default]
    Base64,
    /// URL-safe base64 alphabet with padding.
    Base64UrlSafe,
    /// Text produced and parsed by user functions.
    Custom(DataCodec),
}

impl DataEncoding {
    fn encode(self, value: &[u8]) -> String {
        match self {
            Self::Base64 => STANDARD.encode(value),
            Self::Base64UrlSafe => URL_SAFE.encode(value),
            Self::Custom(codec) => (codec.encode)(value),
        }
    }

    fn decode(self, value: &str) -> Option<Vec<u8>> {
        match self {
            Self::Base64 => STANDARD.decode(value).ok(),
            Self::Base64UrlSafe => URL_SAFE.decode(value).ok(),
            Self::Custom(codec) => (codec.decode)(value),
        }
    }
}

// ============================================================================
// Strategy
// ============================================================================

/// The active date rule and binary rule.
///
/// The default is ISO-8601 dates and standard base64 data.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingStrategy {
    /// Date rule.
    pub dates: DateEncoding,
    /// Binary rule.
    pub data: DataEncoding,
}

impl EncodingStrategy {
    /// Create a strategy from both rules.
    #[must_use]
    pub const fn new(dates: DateEncoding, data: DataEncoding) -> Self {
        Self { dates, data }
    }

    /// Epoch-seconds dates with base64 data, used by most v3 endpoints.
    #[must_use]
    pub const fn unix_seconds() -> Self {
        Self::new(DateEncoding::SecondsSince1970, DataEncoding::Base64)
    }

    /// Replace the date rule.
    #[must_use]
    pub const fn with_dates(mut self, dates: DateEncoding) -> Self {
        self.dates = dates;
        self
    }

    /// Replace the binary rule.
    #[must_use]
    pub const fn with_data(mut self, data: DataEncoding) -> Self {
        self.data = data;
        self
    }

    /// Run `f` with this strategy installed for the current thread.
    ///
    /// The previous strategy is restored when `f` returns or unwinds.
    pub fn scope<R>(self, f: impl FnOnce() -> R) -> R {
        struct Restore(Option<EncodingStrategy>);

        impl Drop for Restore {
            fn drop(&mut self) {
                let previous = self.0;
                ACTIVE.with(|active| active.set(previous));
            }
        }

        let _restore = Restore(ACTIVE.with(|active| active.replace(Some(self))));
        f()
    }

    /// The strategy installed by the innermost [`EncodingStrategy::scope`].
    #[must_use]
    pub fn current() -> Self {
        ACTIVE.with(Cell::get).unwrap_or_default()
    }
}

// ============================================================================
// Timestamp
// ============================================================================

/// A UTC instant encoded with the active [`DateEncoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Wrap a UTC date time.
    #[must_use]
    pub const fn new(value: DateTime<Utc>) -> Self {
        Self(value)
    }

    /// Instant at `seconds` after the Unix epoch, `None` when out of range.
    #[must_use]
    pub fn from_unix(seconds: i64) -> Option<Self> {
        DateTime::from_timestamp(seconds, 0).map(Self)
    }

    /// The current instant.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// The wrapped date time.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Whole seconds since the Unix epoch.
    #[must_use]
    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(value: Timestamp) -> Self {
        value.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EncodingStrategy::current()
            .dates
            .write(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TimestampVisitor(EncodingStrategy::current().dates))
    }
}

struct TimestampVisitor(DateEncoding);

impl Visitor<'_> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            DateEncoding::Iso8601 => f.write_str("an RFC 3339 date"),
            DateEncoding::SecondsSince1970 => f.write_str("seconds since the Unix epoch"),
            DateEncoding::MillisecondsSince1970 => {
                f.write_str("milliseconds since the Unix epoch")
            }
            DateEncoding::Custom(_) => f.write_str("a date in the custom format"),
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        self.0
            .decode_str(value)
            .map(Timestamp)
            .ok_or_else(|| E::invalid_value(Unexpected::Str(value), &self))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        self.0
            .decode_int(value)
            .map(Timestamp)
            .ok_or_else(|| E::invalid_value(Unexpected::Signed(value), &self))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        i64::try_from(value)
            .ok()
            .and_then(|v| self.0.decode_int(v))
            .map(Timestamp)
            .ok_or_else(|| E::invalid_value(Unexpected::Unsigned(value), &self))
    }
}

// ============================================================================
// Binary
// ============================================================================

/// Binary payload encoded with the active [`DataEncoding`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Binary(Bytes);

impl Binary {
    /// Wrap raw bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// The raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Vec<u8>> for Binary {
    fn from(value: Vec<u8>) -> Self {
        Self(Bytes::from(value))
    }
}

impl From<Bytes> for Binary {
    fn from(value: Bytes) -> Self {
        Self(value)
    }
}

impl From<&'static [u8]> for Binary {
    fn from(value: &'static [u8]) -> Self {
        Self(Bytes::from_static(value))
    }
}

impl AsRef<[u8]> for Binary {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Binary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&EncodingStrategy::current().data.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Binary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(BinaryVisitor(EncodingStrategy::current().data))
    }
}

struct BinaryVisitor(DataEncoding);

impl Visitor<'_> for BinaryVisitor {
    type Value = Binary;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            DataEncoding::Base64 => f.write_str("a base64 string"),
            DataEncoding::Base64UrlSafe => f.write_str("a URL-safe base64 string"),
            DataEncoding::Custom(_) => f.write_str("binary data in the custom format"),
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        self.0
            .decode(value)
            .map(Binary::from)
            .ok_or_else(|| E::invalid_value(Unexpected::Str(value), &self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(seconds: i64) -> Timestamp {
        Timestamp::from_unix(seconds).expect("valid timestamp")
    }

    fn json<T: Serialize>(strategy: EncodingStrategy, value: &T) -> String {
        strategy.scope(|| serde_json::to_string(value).expect("serialize"))
    }

    #[test]
    fn default_strategy_outside_scope() {
        let strategy = EncodingStrategy::current();
        assert!(matches!(strategy.dates, DateEncoding::Iso8601));
        assert!(matches!(strategy.data, DataEncoding::Base64));
    }

    #[test]
    fn scope_restores_previous_strategy() {
        EncodingStrategy::unix_seconds().scope(|| {
            assert!(matches!(
                EncodingStrategy::current().dates,
                DateEncoding::SecondsSince1970
            ));
            EncodingStrategy::default().scope(|| {
                assert!(matches!(
                    EncodingStrategy::current().dates,
                    DateEncoding::Iso8601
                ));
            });
            assert!(matches!(
                EncodingStrategy::current().dates,
                DateEncoding::SecondsSince1970
            ));
        });
        assert!(matches!(
            EncodingStrategy::current().dates,
            DateEncoding::Iso8601
        ));
    }

    #[test]
    fn timestamp_date_rules() {
        let ts = at(1_500_000_000);
        assert_eq!(
            json(EncodingStrategy::default(), &ts),
            r#""2017-07-14T02:40:00Z""#
        );
        assert_eq!(json(EncodingStrategy::unix_seconds(), &ts), "1500000000");
        assert_eq!(
            json(
                EncodingStrategy::default().with_dates(DateEncoding::MillisecondsSince1970),
                &ts
            ),
            "1500000000000"
        );
    }

    #[test]
    fn timestamp_custom_rule() {
        let codec = DateCodec::new(
            |date| date.format("%Y/%m/%d").to_string(),
            |text| {
                chrono::NaiveDate::parse_from_str(text, "%Y/%m/%d")
                    .ok()
                    .and_then(|day| day.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
            },
        );
        let strategy = EncodingStrategy::default().with_dates(DateEncoding::Custom(codec));
        let ts = at(1_500_000_000);

        assert_eq!(json(strategy, &ts), r#""2017/07/14""#);

        let decoded: Timestamp = strategy
            .scope(|| serde_json::from_str(r#""2017/07/14""#))
            .expect("decode");
        assert_eq!(decoded.unix_seconds(), 1_499_990_400);
    }

    #[test]
    fn timestamp_decode_matches_rule() {
        let seconds: Timestamp = EncodingStrategy::unix_seconds()
            .scope(|| serde_json::from_str("15"))
            .expect("decode seconds");
        assert_eq!(seconds, at(15));

        let iso: Timestamp = EncodingStrategy::default()
            .scope(|| serde_json::from_str(r#""1970-01-01T00:00:16Z""#))
            .expect("decode iso");
        assert_eq!(iso, at(16));

        let wrong: Result<Timestamp, _> =
            EncodingStrategy::default().scope(|| serde_json::from_str("15"));
        assert!(wrong.is_err());
    }

    #[test]
    fn binary_data_rules() {
        let data = Binary::from(vec![0xfb, 0xff, 0x00]);
        assert_eq!(json(EncodingStrategy::default(), &data), r#""+//A""#);
        assert_eq!(
            json(
                EncodingStrategy::default().with_data(DataEncoding::Base64UrlSafe),
                &data
            ),
            r#""-__A""#
        );

        let decoded: Binary = EncodingStrategy::default()
            .scope(|| serde_json::from_str(r#""+//A""#))
            .expect("decode");
        assert_eq!(decoded, data);
    }

    #[test]
    fn binary_custom_rule() {
        let codec = DataCodec::new(
            |bytes| bytes.iter().map(|b| format!("{b:02x}")).collect(),
            |_| None,
        );
        let strategy = EncodingStrategy::default().with_data(DataEncoding::Custom(codec));
        assert_eq!(json(strategy, &Binary::from(&b"hi"[..])), r#""6869""#);

        let rejected: Result<Binary, _> = strategy.scope(|| serde_json::from_str(r#""6869""#));
        assert!(rejected.is_err());
    }
}
