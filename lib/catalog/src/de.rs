//! Scalar coercion for catalog YAML.
//!
//! Version strings are written unquoted in real catalogs (`version: 1.0`),
//! which YAML parses as numbers. These helpers accept any scalar and keep
//! its textual form, so `1.0` stays `"1.0"` and `1.1` stays `"1.1"`.

use std::fmt;

use serde::Deserializer;
use serde::de::{SeqAccess, Visitor};

fn format_float(v: f64) -> String {
    // A whole-number float came from a scalar like `1.0`; keep the
    // trailing zero so version strings survive the round trip.
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string or numeric scalar")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: serde::de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<String, E> {
        Ok(format_float(v))
    }
}

/// Deserialize a string field from any scalar.
pub(crate) fn string_scalar<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    d.deserialize_any(ScalarVisitor)
}

/// Deserialize a `Vec<String>` field from a sequence of scalars.
pub(crate) fn string_scalar_vec<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    struct SeqVisitor;

    impl<'de> Visitor<'de> for SeqVisitor {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a sequence of scalars")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<String>, A::Error> {
            struct Element(String);
            impl<'de> serde::Deserialize<'de> for Element {
                fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                    d.deserialize_any(ScalarVisitor).map(Element)
                }
            }

            let mut out = Vec::new();
            while let Some(Element(s)) = seq.next_element()? {
                out.push(s);
            }
            Ok(out)
        }
    }

    d.deserialize_seq(SeqVisitor)
}
