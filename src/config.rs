use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Library default for the outward envelope.
pub const DEFAULT_ENVELOPE: f64 = 0.03;

/// Library default for the inward safe margin.
pub const DEFAULT_MARGIN: f64 = 0.01;

/// Suggested tolerances seeded into every model built from this value.
///
/// Set these before models are constructed. A model copies them once, so
/// changing a `ToleranceDefaults` afterwards affects only models built later.
/// Both values are always finite and non-negative; every constructor,
/// setter and the `Deserialize` impl check them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTolerances")]
pub struct ToleranceDefaults {
    envelope: f64,
    margin: f64,
}

#[derive(Deserialize)]
#[serde(default)]
struct RawTolerances {
    envelope: f64,
    margin: f64,
}

impl Default for RawTolerances {
    fn default() -> Self {
        Self {
            envelope: DEFAULT_ENVELOPE,
            margin: DEFAULT_MARGIN,
        }
    }
}

impl TryFrom<RawTolerances> for ToleranceDefaults {
    type Error = ConfigError;

    fn try_from(raw: RawTolerances) -> Result<Self, Self::Error> {
        Self::new(raw.envelope, raw.margin)
    }
}

fn check(name: &str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be finite and non-negative, got {value}"
        )))
    }
}

impl Default for ToleranceDefaults {
    fn default() -> Self {
        Self {
            envelope: DEFAULT_ENVELOPE,
            margin: DEFAULT_MARGIN,
        }
    }
}

impl ToleranceDefaults {
    /// Creates validated defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a value is negative or not finite.
    pub fn new(envelope: f64, margin: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            envelope: check("envelope", envelope)?,
            margin: check("margin", margin)?,
        })
    }

    /// Outward envelope. A value of zero only yields contacts once surfaces
    /// touch, which is unstable under explicit integration.
    #[must_use]
    pub fn envelope(&self) -> f64 {
        self.envelope
    }

    /// Inward safe margin.
    #[must_use]
    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `envelope` is negative or not finite.
    pub fn set_envelope(&mut self, envelope: f64) -> Result<(), ConfigError> {
        self.envelope = check("envelope", envelope)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `margin` is negative or not finite.
    pub fn set_margin(&mut self, margin: f64) -> Result<(), ConfigError> {
        self.margin = check("margin", margin)?;
        Ok(())
    }

    /// Parses defaults from a TOML document with optional `envelope` and
    /// `margin` keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawTolerances = toml::from_str(text)?;
        raw.try_into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn library_constants() {
        let d = ToleranceDefaults::default();
        assert!((d.envelope() - 0.03).abs() < f64::EPSILON);
        assert!((d.margin() - 0.01).abs() < f64::EPSILON);
    }

    #[test]
    fn toml_overrides_present_keys() {
        let d = ToleranceDefaults::from_toml_str("envelope = 0.05\n").unwrap();
        assert!((d.envelope() - 0.05).abs() < f64::EPSILON);
        assert!((d.margin() - DEFAULT_MARGIN).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_value_is_invalid() {
        let r = ToleranceDefaults::from_toml_str("margin = -0.1");
        assert!(matches!(r, Err(ConfigError::Invalid(_))));
        assert!(ToleranceDefaults::new(-1.0, 0.0).is_err());
        assert!(ToleranceDefaults::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn setters_keep_values_valid() {
        let mut d = ToleranceDefaults::default();
        assert!(d.set_envelope(-0.5).is_err());
        assert!(d.set_margin(f64::INFINITY).is_err());
        assert_eq!(d, ToleranceDefaults::default());

        d.set_envelope(0.0).unwrap();
        assert!(d.envelope().abs() < f64::EPSILON);
    }

    #[test]
    fn deserialize_rejects_negative_envelope() {
        let r = serde_json::from_str::<ToleranceDefaults>(r#"{"envelope":-0.5,"margin":0.01}"#);
        assert!(r.is_err());

        let d: ToleranceDefaults = serde_json::from_str(r#"{"margin":0.02}"#).unwrap();
        assert!((d.envelope() - DEFAULT_ENVELOPE).abs() < f64::EPSILON);
        assert!((d.margin() - 0.02).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let r = ToleranceDefaults::from_toml_str("envelope = ");
        assert!(matches!(r, Err(ConfigError::Parse(_))));
    }
}
