//! Deep sky objects: galaxies, globular clusters, nebulae and open clusters.

pub mod galaxy;
pub mod globular;
pub mod nebula;

use std::{fmt, path::Path};

use deepsky_lib::{astro::equatorial_to_cartesian, octree::OctreeObject};
use glam::{DQuat, DVec3};

use crate::fields::{FieldBlock, FieldError};
pub use galaxy::{Galaxy, GalaxyForm};
pub use globular::Globular;
pub use nebula::Nebula;

/// The absolute magnitude of objects that do not specify one.
///
/// Far brighter than anything real, so such objects are never culled by brightness.
pub const DEFAULT_ABSOLUTE_MAGNITUDE: f32 = -1000.0;

/// Reserved; never the catalog number of an actual object.
pub const INVALID_CATALOG_NUMBER: u32 = u32::MAX;

/// The type tag of a catalog record.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum DsoType {
    Galaxy,
    Globular,
    Nebula,
    OpenCluster,
}

impl DsoType {
    pub const ALL: [Self; 4] = [Self::Galaxy, Self::Globular, Self::Nebula, Self::OpenCluster];

    /// Parses a type tag, ignoring ASCII case.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|dso_type| dso_type.tag().eq_ignore_ascii_case(tag))
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Galaxy => "Galaxy",
            Self::Globular => "Globular",
            Self::Nebula => "Nebula",
            Self::OpenCluster => "OpenCluster",
        }
    }
}

impl fmt::Display for DsoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.tag())
    }
}

/// Data specific to each [`DsoType`].
#[derive(Clone, Debug, PartialEq)]
pub enum DsoKind {
    Galaxy(Galaxy),
    Globular(Globular),
    Nebula(Nebula),
    OpenCluster,
}

impl DsoKind {
    /// Reads the type-specific fields of the given `dso_type`.
    ///
    /// Relative paths are resolved against `resource_path`.
    pub fn from_fields(
        dso_type: DsoType,
        fields: FieldBlock,
        resource_path: &Path,
    ) -> Result<Self, FieldError> {
        Ok(match dso_type {
            DsoType::Galaxy => Self::Galaxy(Galaxy::from_fields(fields)?),
            DsoType::Globular => Self::Globular(Globular::from_fields(fields)?),
            DsoType::Nebula => Self::Nebula(Nebula::from_fields(fields, resource_path)?),
            DsoType::OpenCluster => Self::OpenCluster,
        })
    }

    pub fn dso_type(&self) -> DsoType {
        match self {
            Self::Galaxy(_) => DsoType::Galaxy,
            Self::Globular(_) => DsoType::Globular,
            Self::Nebula(_) => DsoType::Nebula,
            Self::OpenCluster => DsoType::OpenCluster,
        }
    }
}

/// A single entry of a deep sky catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct DeepSkyObject {
    catalog_number: u32,
    /// Light years.
    position: DVec3,
    orientation: DQuat,
    /// Light years.
    radius: f32,
    absolute_magnitude: f32,
    info_url: Option<String>,
    visible: bool,
    clickable: bool,
    kind: DsoKind,
}

impl DeepSkyObject {
    /// Constructs an object with default properties at the given `position`.
    ///
    /// The catalog number is [`INVALID_CATALOG_NUMBER`] until one is assigned.
    pub fn new(kind: DsoKind, position: DVec3) -> Self {
        Self {
            catalog_number: INVALID_CATALOG_NUMBER,
            position,
            orientation: DQuat::IDENTITY,
            radius: 1.0,
            absolute_magnitude: DEFAULT_ABSOLUTE_MAGNITUDE,
            info_url: None,
            visible: true,
            clickable: true,
            kind,
        }
    }

    /// Reads an object from the field block of a catalog record.
    ///
    /// The position is taken from `Position` if present. Otherwise it is computed from `RA` and
    /// `Dec` in degrees and `Distance` in light years, which default to `0`, `0` and `1`.
    pub fn from_fields(
        dso_type: DsoType,
        fields: FieldBlock,
        resource_path: &Path,
    ) -> Result<Self, FieldError> {
        let position = match fields.vector("Position")? {
            Some(position) => position,
            None => {
                let ra = fields.number("RA")?.unwrap_or(0.0);
                let dec = fields.number("Dec")?.unwrap_or(0.0);
                let distance = fields.number("Distance")?.unwrap_or(1.0);
                equatorial_to_cartesian(ra * 24.0 / 360.0, dec, distance)
            }
        };

        let axis = fields.direction("Axis")?.unwrap_or(DVec3::X);
        let angle = fields.number("Angle")?.unwrap_or(0.0);

        Ok(Self {
            catalog_number: INVALID_CATALOG_NUMBER,
            position,
            orientation: DQuat::from_axis_angle(axis, angle.to_radians()),
            radius: fields.number("Radius")?.unwrap_or(1.0) as f32,
            absolute_magnitude: fields
                .number("AbsMag")?
                .map_or(DEFAULT_ABSOLUTE_MAGNITUDE, |mag| mag as f32),
            info_url: fields.string("InfoURL")?.map(str::to_owned),
            visible: fields.boolean("Visible")?.unwrap_or(true),
            clickable: fields.boolean("Clickable")?.unwrap_or(true),
            kind: DsoKind::from_fields(dso_type, fields, resource_path)?,
        })
    }

    pub fn catalog_number(&self) -> u32 {
        self.catalog_number
    }

    pub fn set_catalog_number(&mut self, catalog_number: u32) {
        self.catalog_number = catalog_number;
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn orientation(&self) -> DQuat {
        self.orientation
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn absolute_magnitude(&self) -> f32 {
        self.absolute_magnitude
    }

    pub fn set_absolute_magnitude(&mut self, absolute_magnitude: f32) {
        self.absolute_magnitude = absolute_magnitude;
    }

    /// Whether the catalog specified an absolute magnitude, rather than leaving the placeholder.
    pub fn has_absolute_magnitude(&self) -> bool {
        self.absolute_magnitude != DEFAULT_ABSOLUTE_MAGNITUDE
    }

    pub fn info_url(&self) -> Option<&str> {
        self.info_url.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_clickable(&self) -> bool {
        self.clickable
    }

    pub fn kind(&self) -> &DsoKind {
        &self.kind
    }

    pub fn dso_type(&self) -> DsoType {
        self.kind.dso_type()
    }
}

impl OctreeObject for DeepSkyObject {
    fn position(&self) -> DVec3 {
        self.position
    }

    fn absolute_magnitude(&self) -> f32 {
        self.absolute_magnitude
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn load(dso_type: DsoType, value: serde_json::Value) -> Result<DeepSkyObject, FieldError> {
        let fields = FieldBlock::from_value(&value).expect("value should be an object");
        DeepSkyObject::from_fields(dso_type, fields, Path::new("extras/nebulae"))
    }

    #[rstest]
    #[case("Galaxy", Some(DsoType::Galaxy))]
    #[case("galaxy", Some(DsoType::Galaxy))]
    #[case("GLOBULAR", Some(DsoType::Globular))]
    #[case("Nebula", Some(DsoType::Nebula))]
    #[case("opencluster", Some(DsoType::OpenCluster))]
    #[case("Open Cluster", None)]
    #[case("Star", None)]
    #[case("", None)]
    fn type_tags(#[case] tag: &str, #[case] expected: Option<DsoType>) {
        assert_eq!(DsoType::from_tag(tag), expected);
    }

    #[test]
    fn defaults() {
        let dso = load(DsoType::OpenCluster, json!({})).expect("empty fields should load");
        assert_eq!(dso.catalog_number(), INVALID_CATALOG_NUMBER);
        assert_eq!(dso.absolute_magnitude(), DEFAULT_ABSOLUTE_MAGNITUDE);
        assert!(!dso.has_absolute_magnitude());
        assert_eq!(dso.radius(), 1.0);
        assert_eq!(dso.orientation(), DQuat::IDENTITY);
        assert!(dso.is_visible());
        assert!(dso.is_clickable());
        assert_eq!(dso.info_url(), None);
        assert_eq!(dso.kind(), &DsoKind::OpenCluster);
        // RA 0, Dec 0 at 1 ly
        assert_relative_eq!(dso.position().x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn common_fields() {
        let dso = load(
            DsoType::Galaxy,
            json!({
                "Position": [10, -20, 30],
                "Axis": [0, 0, 2],
                "Angle": 90,
                "Radius": 50000,
                "AbsMag": -21.5,
                "InfoURL": "https://example.org/m31",
                "Clickable": false,
            }),
        )
        .expect("fields should load");

        assert_eq!(dso.position(), DVec3::new(10.0, -20.0, 30.0));
        assert!(dso.orientation().abs_diff_eq(
            DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2),
            1e-12
        ));
        assert_eq!(dso.radius(), 50000.0);
        assert_eq!(dso.absolute_magnitude(), -21.5);
        assert!(dso.has_absolute_magnitude());
        assert_eq!(dso.info_url(), Some("https://example.org/m31"));
        assert!(dso.is_visible());
        assert!(!dso.is_clickable());
        assert_eq!(dso.dso_type(), DsoType::Galaxy);
    }

    #[test]
    fn equatorial_position() {
        // the north celestial pole lies in the Y-Z plane of the ecliptic frame
        let dso = load(
            DsoType::Nebula,
            json!({ "RA": 123.0, "Dec": 90.0, "Distance": 500.0 }),
        )
        .expect("fields should load");
        assert_relative_eq!(dso.position().length(), 500.0, max_relative = 1e-12);
        assert_relative_eq!(dso.position().x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn position_wins_over_equatorial() {
        let dso = load(
            DsoType::OpenCluster,
            json!({ "Position": [1, 2, 3], "RA": 10.0, "Dec": 20.0, "Distance": 30.0 }),
        )
        .expect("fields should load");
        assert_eq!(dso.position(), DVec3::new(1.0, 2.0, 3.0));
    }

    #[rstest]
    #[case(json!({ "AbsMag": "bright" }))]
    #[case(json!({ "Position": [1, 2] }))]
    #[case(json!({ "Axis": [0, 0, 0] }))]
    #[case(json!({ "Visible": 1 }))]
    #[case(json!({ "InfoURL": 42 }))]
    fn malformed_fields(#[case] value: serde_json::Value) {
        assert!(load(DsoType::OpenCluster, value).is_err());
    }
}
