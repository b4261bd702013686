//! Toy controls (sliders, selects, checkboxes, buttons)
//!
//! A toy declares its controls as static [`ControlSpec`]s keyed by element
//! id. The platform reads raw DOM values (always strings) and turns them
//! into typed [`ControlValue`]s here before the toy sees them.

use crate::error::{Result, ToyError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlKind {
    Slider { min: f32, max: f32 },
    Select(&'static [&'static str]),
    Checkbox,
    Button,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSpec {
    /// Element id
    pub id: &'static str,
    pub label: &'static str,
    pub kind: ControlKind,
}

impl ControlSpec {
    pub const fn slider(id: &'static str, label: &'static str, min: f32, max: f32) -> Self {
        Self {
            id,
            label,
            kind: ControlKind::Slider { min, max },
        }
    }

    pub const fn select(id: &'static str, label: &'static str, options: &'static [&'static str]) -> Self {
        Self {
            id,
            label,
            kind: ControlKind::Select(options),
        }
    }

    pub const fn checkbox(id: &'static str, label: &'static str) -> Self {
        Self {
            id,
            label,
            kind: ControlKind::Checkbox,
        }
    }

    pub const fn button(id: &'static str, label: &'static str) -> Self {
        Self {
            id,
            label,
            kind: ControlKind::Button,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    Number(f32),
    Choice(String),
    Flag(bool),
    Pressed,
}

impl ControlValue {
    /// Parse a raw element value according to the control's kind
    pub fn parse(spec: &ControlSpec, raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let invalid = || ToyError::InvalidControlValue {
            id: spec.id.to_string(),
            value: raw.to_string(),
        };

        match spec.kind {
            ControlKind::Slider { min, max } => {
                let v: f32 = raw.parse().map_err(|_| invalid())?;
                if !v.is_finite() || v < min || v > max {
                    return Err(invalid());
                }
                Ok(ControlValue::Number(v))
            }
            ControlKind::Select(options) => options
                .iter()
                .find(|o| o.eq_ignore_ascii_case(raw))
                .map(|o| ControlValue::Choice(o.to_string()))
                .ok_or_else(invalid),
            ControlKind::Checkbox => match raw.to_lowercase().as_str() {
                "true" | "on" | "1" | "yes" => Ok(ControlValue::Flag(true)),
                "false" | "off" | "0" | "no" | "" => Ok(ControlValue::Flag(false)),
                _ => Err(invalid()),
            },
            ControlKind::Button => Ok(ControlValue::Pressed),
        }
    }
}

/// Look up a control by id
pub fn find<'a>(specs: &'a [ControlSpec], id: &str) -> Option<&'a ControlSpec> {
    specs.iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAVITY: ControlSpec = ControlSpec::slider("gravity", "Gravity", 0.0, 1.0);
    const COLOR: ControlSpec = ControlSpec::select("color", "Color", &["white", "pink"]);

    #[test]
    fn test_slider_parse() {
        assert_eq!(ControlValue::parse(&GRAVITY, " 0.25 ").unwrap(), ControlValue::Number(0.25));
        assert!(ControlValue::parse(&GRAVITY, "1.5").is_err());
        assert!(ControlValue::parse(&GRAVITY, "-0.1").is_err());
        assert!(ControlValue::parse(&GRAVITY, "NaN").is_err());
        assert!(ControlValue::parse(&GRAVITY, "abc").is_err());
    }

    #[test]
    fn test_select_parse() {
        assert_eq!(
            ControlValue::parse(&COLOR, "Pink").unwrap(),
            ControlValue::Choice("pink".to_string())
        );
        let err = ControlValue::parse(&COLOR, "blue").unwrap_err();
        assert!(matches!(err, ToyError::InvalidControlValue { ref id, .. } if id == "color"));
    }

    #[test]
    fn test_checkbox_parse() {
        let spec = ControlSpec::checkbox("auto", "Auto");
        assert_eq!(ControlValue::parse(&spec, "on").unwrap(), ControlValue::Flag(true));
        assert_eq!(ControlValue::parse(&spec, "").unwrap(), ControlValue::Flag(false));
        assert!(ControlValue::parse(&spec, "maybe").is_err());
    }

    #[test]
    fn test_find() {
        let specs = [GRAVITY, COLOR];
        assert_eq!(find(&specs, "color").map(|s| s.label), Some("Color"));
        assert!(find(&specs, "speed").is_none());
    }
}
