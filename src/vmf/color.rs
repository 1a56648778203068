use crate::{Error, KeyValues, Marshaler, Result};

/// An 8-bit color stored as the value `"r g b"`.
///
/// The node name is not checked: the same value appears under `color`,
/// `_light` and other keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Rgb { red, green, blue }
    }
}

impl Marshaler for Rgb {
    fn to_key_values(&self) -> KeyValues {
        KeyValues::leaf(
            "color",
            format!("{} {} {}", self.red, self.green, self.blue),
        )
    }

    fn from_key_values(&mut self, kv: &KeyValues) -> Result<()> {
        let parts: Vec<&str> = kv.as_str("").split_whitespace().collect();
        if parts.len() != 3 {
            return Err(Error::invalid_record(
                "RGB",
                format!("color has {} components, but expected 3", parts.len()),
            ));
        }

        let mut components = [0u8; 3];
        for ((slot, part), label) in components
            .iter_mut()
            .zip(&parts)
            .zip(["red", "green", "blue"])
        {
            // u8::from_str takes a leading '+', decimal color text doesn't
            let parsed = if part.starts_with('+') {
                Err("invalid digit found in string".to_string())
            } else {
                part.parse::<u8>().map_err(|err| err.to_string())
            };
            *slot = parsed.map_err(|err| {
                Error::invalid_record("RGB", format!("error parsing {label} component: {err}"))
            })?;
        }

        let [red, green, blue] = components;
        *self = Rgb { red, green, blue };
        Ok(())
    }
}
