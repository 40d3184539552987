use alloc::{boxed::Box, string::String, vec::Vec};

use quickcheck::{Arbitrary, Gen};

use crate::{Array, Number, Object, Value};

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct JsonNumber(Number);

impl Arbitrary for JsonNumber {
    fn arbitrary(g: &mut Gen) -> Self {
        if bool::arbitrary(g) {
            return Self(Number::Int(i64::arbitrary(g)));
        }
        let mut value = f64::arbitrary(g);
        while !value.is_finite() {
            value = f64::arbitrary(g);
        }
        Self(Number::Float(value))
    }
}

impl Arbitrary for Value {
    fn arbitrary(g: &mut Gen) -> Self {
        fn gen_val(g: &mut Gen, depth: usize) -> Value {
            let kinds = if depth == 0 { 4 } else { 6 };
            match usize::arbitrary(g) % kinds {
                0 => Value::Null,
                1 => Value::Boolean(bool::arbitrary(g)),
                2 => Value::Number(JsonNumber::arbitrary(g).0),
                3 => Value::String(String::arbitrary(g)),
                4 => {
                    let len = usize::arbitrary(g) % 4;
                    let array: Array = (0..len).map(|_| gen_val(g, depth - 1)).collect();
                    Value::Array(array)
                }
                _ => {
                    let len = usize::arbitrary(g) % 4;
                    let object = Object::new();
                    for _ in 0..len {
                        object.insert(String::arbitrary(g), gen_val(g, depth - 1));
                    }
                    Value::Object(object)
                }
            }
        }

        let depth = usize::arbitrary(g) % 6;
        gen_val(g, depth)
    }
}

/// A byte string that is valid UTF-8.
#[derive(Debug, Clone)]
pub(crate) struct Utf8Bytes(pub Vec<u8>);

impl Arbitrary for Utf8Bytes {
    fn arbitrary(g: &mut Gen) -> Self {
        Self(String::arbitrary(g).into_bytes())
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let text = String::from_utf8_lossy(&self.0).into_owned();
        Box::new(text.shrink().map(|s| Self(s.into_bytes())))
    }
}
