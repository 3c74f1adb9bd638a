// Envelope normalization
//
// The UpCloud API wraps every payload in one or two redundant named layers:
// `{"server": {...}}` for single objects and `{"servers": {"server": [...]}}`
// for collections. Embedded plural fields repeat the pattern
// (`"tags": {"tag": [...]}`). This module strips those layers at
// deserialization time and puts them back when encoding request bodies.
//
// Wrapper key names are ignored on the way in; only the shape matters.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, DeserializeOwned, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ── Decoding entry points ────────────────────────────────────────────

/// Decode a single-object response shaped `{"<name>": {...}}`.
///
/// Fields missing from the inner object keep their default values.
pub fn normalize<T: DeserializeOwned>(raw: &[u8]) -> Result<T, Error> {
    decode::<Single<T>>(raw).map(|single| single.0)
}

/// Decode a collection response shaped `{"<plural>": {"<singular>": [...]}}`.
///
/// Items keep the order the provider returned them in. An empty array or an
/// empty inner object (`{"servers": {}}`) yields an empty `Vec`.
pub fn normalize_list<T: DeserializeOwned>(raw: &[u8]) -> Result<Vec<T>, Error> {
    decode::<Single<Nested<T>>>(raw).map(|single| single.0.0)
}

fn decode<T: DeserializeOwned>(raw: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(raw).map_err(|source| Error::Deserialization {
        source,
        body: String::from_utf8_lossy(raw).into_owned(),
    })
}

// ── Single named layer ───────────────────────────────────────────────

/// An object with exactly one entry whose key is irrelevant.
struct Single<T>(T);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Single<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SingleVisitor(PhantomData))
    }
}

struct SingleVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for SingleVisitor<T> {
    type Value = Single<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with a single named entry")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let Some((IgnoredAny, value)) = map.next_entry::<IgnoredAny, T>()? else {
            return Err(de::Error::invalid_length(0, &self));
        };
        if map.next_key::<IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(2, &self));
        }
        Ok(Single(value))
    }
}

// ── Named array inside a named layer ─────────────────────────────────

/// `{"<singular>": [...]}`, `{}` or `null`, flattened to the array.
struct Nested<T>(Vec<T>);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nested<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NestedVisitor(PhantomData))
    }
}

struct NestedVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for NestedVisitor<T> {
    type Value = Nested<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object wrapping a single named array")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Nested(Vec::new()))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Nested(Vec::new()))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let items = match map.next_entry::<IgnoredAny, Option<Vec<T>>>()? {
            Some((IgnoredAny, items)) => items.unwrap_or_default(),
            None => Vec::new(),
        };
        if map.next_key::<IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(2, &self));
        }
        Ok(Nested(items))
    }
}

/// `deserialize_with` target for embedded plural fields.
pub fn deserialize_nested<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Nested::deserialize(deserializer).map(|nested| nested.0)
}

// ── Encoding ─────────────────────────────────────────────────────────

/// A value serialized as `{"<key>": value}`.
#[derive(Debug, Clone, Copy)]
pub struct Wrapped<T> {
    key: &'static str,
    inner: T,
}

impl<T: Serialize> Serialize for Wrapped<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, &self.inner)?;
        map.end()
    }
}

/// Wrap a value in one named layer, the shape of every request body and
/// single-object response.
pub fn wrap<T: Serialize>(key: &'static str, inner: T) -> Wrapped<T> {
    Wrapped { key, inner }
}

/// Wrap a slice in the two named layers of a collection response.
pub fn wrap_list<'a, T: Serialize>(
    plural: &'static str,
    singular: &'static str,
    items: &'a [T],
) -> Wrapped<Wrapped<&'a [T]>> {
    wrap(plural, wrap(singular, items))
}

macro_rules! nested_fields {
    ($($module:ident => $key:literal),+ $(,)?) => {
        $(
            #[doc = concat!("Serde adapter for `{\"", $key, "\": [...]}` plural fields.")]
            pub mod $module {
                pub use super::super::deserialize_nested as deserialize;

                pub fn serialize<S, T>(items: &[T], serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                    T: serde::Serialize,
                {
                    serde::Serialize::serialize(&super::super::wrap($key, items), serializer)
                }
            }
        )+
    };
}

/// Adapters for the embedded plural fields, used with `#[serde(with = ...)]`.
pub mod nested {
    nested_fields! {
        tag => "tag",
        label => "label",
        ip_address => "ip_address",
        storage_device => "storage_device",
        backup => "backup",
        server => "server",
    }
}

// ── Scalar quirks ────────────────────────────────────────────────────

/// Integers the API transmits as JSON strings (`"core_number": "2"`).
///
/// Bare JSON integers are accepted too; anything else is a decode error.
pub mod string_int {
    use std::fmt::{self, Display};
    use std::marker::PhantomData;
    use std::str::FromStr;

    use serde::de::{self, Deserializer, Visitor};
    use serde::ser::Serializer;

    pub fn serialize<S, N>(value: &N, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        N: Display,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D, N>(deserializer: D) -> Result<N, D::Error>
    where
        D: Deserializer<'de>,
        N: FromStr + TryFrom<u64> + TryFrom<i64>,
        <N as FromStr>::Err: Display,
    {
        deserializer.deserialize_any(StringIntVisitor(PhantomData))
    }

    struct StringIntVisitor<N>(PhantomData<N>);

    impl<N> Visitor<'_> for StringIntVisitor<N>
    where
        N: FromStr + TryFrom<u64> + TryFrom<i64>,
        <N as FromStr>::Err: Display,
    {
        type Value = N;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer encoded as a string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<N, E> {
            v.trim()
                .parse()
                .map_err(|e| E::custom(format_args!("invalid integer string {v:?}: {e}")))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<N, E> {
            <N as TryFrom<u64>>::try_from(v)
                .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<N, E> {
            <N as TryFrom<i64>>::try_from(v)
                .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
        }
    }

    /// Serialization of optional request fields; `None` is expected to be
    /// skipped with `skip_serializing_if`.
    pub mod option {
        use std::fmt::Display;

        use serde::ser::Serializer;

        pub fn serialize<S, N>(value: &Option<N>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
            N: Display,
        {
            match value {
                Some(v) => serializer.collect_str(v),
                None => serializer.serialize_none(),
            }
        }
    }
}

fn parse_flag<E: de::Error>(v: &str, truthy: &str, falsy: &str) -> Result<bool, E> {
    if v.eq_ignore_ascii_case(truthy) {
        Ok(true)
    } else if v.eq_ignore_ascii_case(falsy) || v.is_empty() {
        Ok(false)
    } else {
        Err(E::custom(format_args!(
            "expected {truthy:?} or {falsy:?}, got {v:?}"
        )))
    }
}

struct FlagVisitor {
    truthy: &'static str,
    falsy: &'static str,
}

impl Visitor<'_> for FlagVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} or {:?}", self.truthy, self.falsy)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
        parse_flag(v, self.truthy, self.falsy)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
        Ok(v)
    }
}

/// Booleans the API transmits as `"yes"` / `"no"`.
pub mod yes_no {
    use serde::de::Deserializer;
    use serde::ser::Serializer;

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "yes" } else { "no" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(super::FlagVisitor {
            truthy: "yes",
            falsy: "no",
        })
    }

    /// Optional request fields; pair with `skip_serializing_if = "Option::is_none"`.
    pub mod option {
        use serde::ser::Serializer;

        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(
            value: &Option<bool>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }
    }
}

/// Booleans the API transmits as `"on"` / `"off"`.
pub mod on_off {
    use serde::de::Deserializer;
    use serde::ser::Serializer;

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "on" } else { "off" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(super::FlagVisitor {
            truthy: "on",
            falsy: "off",
        })
    }

    /// Optional request fields; pair with `skip_serializing_if = "Option::is_none"`.
    pub mod option {
        use serde::ser::Serializer;

        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(
            value: &Option<bool>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }
    }
}

/// Optional objects the API reports as `""` when unset
/// (`"backup_rule": ""`).
pub mod blank_as_none {
    use std::fmt;
    use std::marker::PhantomData;

    use serde::de::value::MapAccessDeserializer;
    use serde::de::{self, DeserializeOwned, Deserializer, MapAccess, Visitor};
    use serde::{Deserialize, Serialize, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(v) => v.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        deserializer.deserialize_any(BlankVisitor(PhantomData))
    }

    struct BlankVisitor<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for BlankVisitor<T> {
        type Value = Option<T>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an object or an empty string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            if v.is_empty() {
                Ok(None)
            } else {
                Err(E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        // Inner errors pass through untouched so the decode error names the
        // offending field value.
        fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
            T::deserialize(MapAccessDeserializer::new(map)).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::error::ErrorKind;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Item {
        uuid: String,
        #[serde(with = "string_int")]
        core_number: u32,
        #[serde(with = "nested::tag")]
        tags: Vec<String>,
    }

    #[test]
    fn single_object_ignores_outer_key() {
        let raw = br#"{"whatever": {"uuid": "abc", "core_number": "4"}}"#;
        let item: Item = normalize(raw).unwrap();
        assert_eq!(item.uuid, "abc");
        assert_eq!(item.core_number, 4);
        assert!(item.tags.is_empty());
    }

    #[test]
    fn single_object_rejects_empty_and_ambiguous_envelopes() {
        let empty = normalize::<Item>(b"{}").unwrap_err();
        assert_eq!(empty.kind(), ErrorKind::Decode);

        let ambiguous = normalize::<Item>(br#"{"a": {}, "b": {}}"#).unwrap_err();
        assert_eq!(ambiguous.kind(), ErrorKind::Decode);
    }

    #[test]
    fn list_preserves_provider_order() {
        let raw = br#"{"servers": {"server": [
            {"uuid": "c"}, {"uuid": "a"}, {"uuid": "b"}
        ]}}"#;
        let items: Vec<Item> = normalize_list(raw).unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.uuid.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn empty_lists_normalize_to_empty_vec() {
        for raw in [
            &br#"{"servers": {"server": []}}"#[..],
            &br#"{"servers": {}}"#[..],
            &br#"{"servers": null}"#[..],
            &br#"{"servers": {"server": null}}"#[..],
        ] {
            let items: Vec<Item> = normalize_list(raw).unwrap();
            assert!(items.is_empty(), "{}", String::from_utf8_lossy(raw));
        }
    }

    #[test]
    fn embedded_tags_unwrap_to_plain_strings() {
        let raw = br#"{"server": {"uuid": "x", "tags": {"tag": ["DEV", "WEB"]}}}"#;
        let item: Item = normalize(raw).unwrap();
        assert_eq!(item.tags, ["DEV", "WEB"]);

        let raw = br#"{"server": {"uuid": "x", "tags": {}}}"#;
        let item: Item = normalize(raw).unwrap();
        assert!(item.tags.is_empty());
    }

    #[test]
    fn numeric_string_must_be_an_integer() {
        let err = normalize::<Item>(br#"{"server": {"core_number": "abc"}}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.to_string().contains("abc"), "{err}");

        let item: Item = normalize(br#"{"server": {"core_number": 2}}"#).unwrap();
        assert_eq!(item.core_number, 2);
    }

    #[test]
    fn bad_value_inside_nested_item_keeps_its_cause() {
        #[derive(Debug, Deserialize)]
        struct Outer {
            #[serde(with = "nested::server")]
            #[allow(dead_code)]
            servers: Vec<Item>,
        }

        let raw = br#"{"storage": {"servers": {"server": [{"uuid": "a", "core_number": "x9"}]}}}"#;
        match normalize::<Outer>(raw) {
            Err(Error::Deserialization { source, .. }) => {
                let cause = source.to_string();
                assert!(cause.contains("invalid integer string"), "{cause}");
                assert!(cause.contains("x9"), "{cause}");
            }
            other => panic!("expected Deserialization error, got: {other:?}"),
        }
    }

    #[test]
    fn bad_value_inside_optional_object_keeps_its_cause() {
        #[derive(Debug, Deserialize)]
        struct Outer {
            #[serde(default, with = "blank_as_none")]
            #[allow(dead_code)]
            inner: Option<Item>,
        }

        let raw = br#"{"storage": {"inner": {"core_number": "abc"}}}"#;
        match normalize::<Outer>(raw) {
            Err(Error::Deserialization { source, .. }) => {
                let cause = source.to_string();
                assert!(cause.contains("invalid integer string"), "{cause}");
                assert!(cause.contains("abc"), "{cause}");
            }
            other => panic!("expected Deserialization error, got: {other:?}"),
        }

        let err = normalize::<Outer>(br#"{"storage": {"inner": "daily"}}"#).unwrap_err();
        assert!(err.to_string().contains("daily"), "{err}");
    }

    #[test]
    fn malformed_json_surfaces_parse_error() {
        let raw = br#"{"server": {"uuid": "#;
        match normalize::<Item>(raw) {
            Err(Error::Deserialization { source, body }) => {
                assert!(source.is_eof());
                assert_eq!(body, String::from_utf8_lossy(raw));
            }
            other => panic!("expected Deserialization error, got: {other:?}"),
        }
    }

    #[test]
    fn type_mismatch_is_a_decode_error() {
        let err = normalize::<Item>(br#"{"server": {"uuid": 12}}"#).unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }), "{err:?}");
    }

    #[test]
    fn wrapped_encoding_normalizes_back() {
        let items = vec![
            Item {
                uuid: "one".into(),
                core_number: 1,
                tags: vec!["A".into()],
            },
            Item {
                uuid: "two".into(),
                core_number: 8,
                tags: Vec::new(),
            },
        ];

        let raw = serde_json::to_vec(&wrap_list("servers", "server", &items)).unwrap();
        let decoded: Vec<Item> = normalize_list(&raw).unwrap();
        assert_eq!(decoded, items);

        let encoded = serde_json::to_value(wrap("server", &items[0])).unwrap();
        assert_eq!(
            encoded,
            serde_json::json!({
                "server": { "uuid": "one", "core_number": "1", "tags": { "tag": ["A"] } }
            })
        );
    }

    #[test]
    fn flags_accept_words_and_booleans() {
        #[derive(Debug, Deserialize)]
        struct Flags {
            #[serde(with = "yes_no")]
            metadata: bool,
            #[serde(with = "on_off")]
            firewall: bool,
        }

        let f: Flags = serde_json::from_str(r#"{"metadata": "yes", "firewall": "off"}"#).unwrap();
        assert!(f.metadata);
        assert!(!f.firewall);

        let f: Flags = serde_json::from_str(r#"{"metadata": false, "firewall": "on"}"#).unwrap();
        assert!(!f.metadata);
        assert!(f.firewall);

        let bad = serde_json::from_str::<Flags>(r#"{"metadata": "maybe", "firewall": "on"}"#);
        assert!(bad.is_err());
    }
}
