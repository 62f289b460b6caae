use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{WireReader, WireWriter};
use crate::sentinel::RGB_NO_CHANGE_COMPONENT;

/// One LED colour. Serialized as an `[r, g, b]` triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    /// Bytes per colour on the wire.
    pub const WIRE_SIZE: usize = 3;
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    /// All channels set to the per-channel no-change value.
    pub const NO_CHANGE: Rgb = Rgb::new(
        RGB_NO_CHANGE_COMPONENT,
        RGB_NO_CHANGE_COMPONENT,
        RGB_NO_CHANGE_COMPONENT,
    );

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn to_tuple(self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }

    pub(crate) fn write_fields(&self, w: &mut WireWriter) {
        w.u8(self.red);
        w.u8(self.green);
        w.u8(self.blue);
    }

    pub(crate) fn read_fields(r: &mut WireReader<'_>) -> Self {
        let [red, green, blue] = r.array::<3>();
        Self { red, green, blue }
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self { red, green, blue }
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_tuple().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <(u8, u8, u8)>::deserialize(deserializer).map(Rgb::from)
    }
}

#[test]
fn test_rgb_wire_order() {
    let mut w = WireWriter::default();
    Rgb::new(10, 20, 30).write_fields(&mut w);
    let data = w.into_inner();
    assert_eq!(data, vec![10, 20, 30]);
    assert_eq!(Rgb::read_fields(&mut WireReader::new(&data)), Rgb::new(10, 20, 30));
}

#[test]
fn test_rgb_json_triple() {
    let v = serde_json::to_value(Rgb::new(1, 2, 3)).unwrap();
    assert_eq!(v, serde_json::json!([1, 2, 3]));
    let back: Rgb = serde_json::from_value(v).unwrap();
    assert_eq!(back, Rgb::new(1, 2, 3));
}

#[test]
fn test_rgb_no_change() {
    assert_eq!(Rgb::NO_CHANGE.to_tuple(), (0xff, 0xff, 0xff));
}
