use crate::fields::{FieldBlock, FieldError};

/// A globular cluster, described by a King profile.
#[derive(Clone, Debug, PartialEq)]
pub struct Globular {
    detail: f32,
    /// Arc minutes.
    core_radius: f32,
    king_concentration: f32,
}

impl Globular {
    pub const DEFAULT_CORE_RADIUS: f32 = 0.83;
    pub const DEFAULT_KING_CONCENTRATION: f32 = 2.1;

    /// Reads `Detail`, `CoreRadius` and `KingConcentration`.
    pub(crate) fn from_fields(fields: FieldBlock) -> Result<Self, FieldError> {
        Ok(Self {
            detail: fields.number("Detail")?.map_or(1.0, |value| value as f32),
            core_radius: fields
                .number("CoreRadius")?
                .map_or(Self::DEFAULT_CORE_RADIUS, |value| value as f32),
            king_concentration: fields
                .number("KingConcentration")?
                .map_or(Self::DEFAULT_KING_CONCENTRATION, |value| value as f32),
        })
    }

    pub fn detail(&self) -> f32 {
        self.detail
    }

    /// The core radius in arc minutes.
    pub fn core_radius(&self) -> f32 {
        self.core_radius
    }

    pub fn king_concentration(&self) -> f32 {
        self.king_concentration
    }

    /// The tidal radius in arc minutes; `core_radius * 10^king_concentration`.
    pub fn tidal_radius(&self) -> f32 {
        self.core_radius * 10.0f32.powf(self.king_concentration)
    }
}

impl Default for Globular {
    fn default() -> Self {
        Self {
            detail: 1.0,
            core_radius: Self::DEFAULT_CORE_RADIUS,
            king_concentration: Self::DEFAULT_KING_CONCENTRATION,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults() {
        let value = json!({});
        let fields = FieldBlock::from_value(&value).expect("value should be an object");
        let globular = Globular::from_fields(fields).expect("fields should load");
        assert_eq!(globular, Globular::default());
    }

    #[test]
    fn king_profile() {
        let value = json!({ "CoreRadius": 0.5, "KingConcentration": 2.0, "Detail": 0.25 });
        let fields = FieldBlock::from_value(&value).expect("value should be an object");
        let globular = Globular::from_fields(fields).expect("fields should load");
        assert_eq!(globular.core_radius(), 0.5);
        assert_eq!(globular.king_concentration(), 2.0);
        assert_eq!(globular.detail(), 0.25);
        assert_relative_eq!(globular.tidal_radius(), 50.0, max_relative = 1e-6);
    }

    #[test]
    fn wrong_type() {
        let value = json!({ "CoreRadius": [1] });
        let fields = FieldBlock::from_value(&value).expect("value should be an object");
        assert!(Globular::from_fields(fields).is_err());
    }
}
