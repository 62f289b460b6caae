//! JSON form of `f32` fields.
//!
//! Finite values are numbers at single precision. NaN, the no-change
//! sentinel, is `null`. Infinities are the strings `"inf"` and `"-inf"`, so
//! a measured infinity survives a round trip through the projection and is
//! never mistaken for "leave unchanged".

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

const INF: &str = "inf";
const NEG_INF: &str = "-inf";

pub(crate) fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_nan() {
        serializer.serialize_none()
    } else if *value == f32::INFINITY {
        serializer.serialize_str(INF)
    } else if *value == f32::NEG_INFINITY {
        serializer.serialize_str(NEG_INF)
    } else {
        serializer.serialize_f32(*value)
    }
}

pub(crate) fn serialize_array<S: Serializer, const N: usize>(
    values: &[f32; N],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter().map(|v| Projected(*v)))
}

/// `null` is `None`; numbers and the infinity strings are `Some`.
pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f32>, D::Error> {
    match Option::<Repr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Repr::Number(v)) => Ok(Some(v)),
        Some(Repr::Text(s)) => match s.as_str() {
            INF => Ok(Some(f32::INFINITY)),
            NEG_INF => Ok(Some(f32::NEG_INFINITY)),
            other => Err(de::Error::invalid_value(
                de::Unexpected::Str(other),
                &"a number, null, \"inf\" or \"-inf\"",
            )),
        },
    }
}

pub(crate) fn deserialize_array<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<[Option<f32>; 4], D::Error> {
    let slots = <[Slot; 4]>::deserialize(deserializer)?;
    Ok(slots.map(|s| s.0))
}

struct Projected(f32);

impl Serialize for Projected {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize(&self.0, serializer)
    }
}

struct Slot(Option<f32>);

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize(deserializer).map(Slot)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Number(f32),
    Text(String),
}
