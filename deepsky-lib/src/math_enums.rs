use std::ops::{Index, IndexMut};

use enum_map::Enum;
use enumset::{EnumSet, EnumSetType};
use glam::DVec3;

macro_rules! impl_from_for_vec {
    { $enum_type:ident for $value_type:ident {
        $( $variant:ident => ( $( $value:expr ),* ), )*
    } } => {
        impl From<$enum_type> for $value_type {
            fn from(value: $enum_type) -> Self {
                match value {
                    $( <$enum_type>::$variant => Self::new( $( $value as _ ),* ), )*
                }
            }
        }

        impl TryFrom<$value_type> for $enum_type {
            type Error = ();

            fn try_from(value: $value_type) -> Result<Self, Self::Error> {
                $( if value == $value_type::new( $( $value as _ ),* ) {
                    return Ok(<$enum_type>::$variant);
                } )*
                Err(())
            }
        }
    };
    { $enum_type:ident for [ $( $value_type:ident ),* ] $values:tt } => { $(
        impl_from_for_vec! {
            $enum_type for $value_type
            $values
        }
    )* };
}

macro_rules! impl_index_for_vec {
    { $axis_type:ident for $base_type:ident: $vector_type:ident {
        $( $axis_name:ident => $axis_field:ident, )*
    } } => {
        impl Index<$axis_type> for $vector_type {
            type Output = $base_type;

            fn index(&self, index: $axis_type) -> &Self::Output {
                match index {
                    $( $axis_type::$axis_name => &self.$axis_field, )*
                }
            }
        }

        impl IndexMut<$axis_type> for $vector_type {
            fn index_mut(&mut self, index: $axis_type) -> &mut Self::Output {
                match index {
                    $( $axis_type::$axis_name => &mut self.$axis_field, )*
                }
            }
        }
    };
    { $axis_type:ident for [
        $( $base_type:ident: $( $vector_type:ident ),* ; )*
    ] $axes:tt } => { $( $(
        impl_index_for_vec! {
            $axis_type for $base_type: $vector_type
            $axes
        }
    )* )* };
}

/// A three-dimensional axis; `X`, `Y`, or `Z`.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Enum, EnumSetType)]
#[enumset(no_super_impls)]
pub enum Axis3 {
    X,
    Y,
    Z,
}

impl_index_for_vec! {
    Axis3 for [
        f64: DVec3;
    ] {
        X => x,
        Y => y,
        Z => z,
    }
}

/// A set of three-dimensional axes.
pub type Axes3 = EnumSet<Axis3>;

/// A corner of a 3D cube, which doubles as the octant of an octree node.
///
/// The discriminant is the 3-bit octant code: bit 0 is set for the positive X half, bit 1 for the
/// positive Y half and bit 2 for the positive Z half.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Enum, EnumSetType)]
#[enumset(no_super_impls)]
pub enum Corner3 {
    X0Y0Z0,
    X1Y0Z0,
    X0Y1Z0,
    X1Y1Z0,
    X0Y0Z1,
    X1Y0Z1,
    X0Y1Z1,
    X1Y1Z1,
}

impl Corner3 {
    /// Returns the octant of a cube centered at `center` that contains `point`.
    ///
    /// Axes are compared in X, Y, Z order. A coordinate equal to the center (greater-or-equal) goes
    /// to the positive half, so points on a boundary always end up in the same octant. A `NaN`
    /// coordinate goes to the negative half.
    pub fn from_point(center: DVec3, point: DVec3) -> Self {
        Self::from_positive_axes(
            Axes3::all()
                .iter()
                .filter(|&axis| point[axis] >= center[axis])
                .collect(),
        )
    }

    /// Returns the corner that lies on the positive side of exactly the given `axes`.
    pub fn from_positive_axes(axes: Axes3) -> Self {
        Self::from_usize(usize::from(axes.as_u8()))
    }

    /// The axes along which this corner lies on the positive side.
    pub fn positive_axes(self) -> Axes3 {
        Axes3::from_u8(self as u8)
    }

    /// The 3-bit octant code of this corner.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether the corner lies on the positive side of the given `axis`.
    pub fn is_positive_along(self, axis: Axis3) -> bool {
        (self as u8) & (1 << axis as u8) != 0
    }

    /// Returns `-1.0` or `1.0` for each axis, depending on which side the corner lies on.
    pub fn signum(self) -> DVec3 {
        DVec3::from(self) * 2.0 - DVec3::ONE
    }
}

impl_from_for_vec! {
    Corner3 for DVec3 {
        X0Y0Z0 => (0, 0, 0),
        X1Y0Z0 => (1, 0, 0),
        X0Y1Z0 => (0, 1, 0),
        X1Y1Z0 => (1, 1, 0),
        X0Y0Z1 => (0, 0, 1),
        X1Y0Z1 => (1, 0, 1),
        X0Y1Z1 => (0, 1, 1),
        X1Y1Z1 => (1, 1, 1),
    }
}

pub type Corners3 = EnumSet<Corner3>;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn index_dvec3_by_axis() {
        let mut vec = DVec3::new(1.0, 2.0, 3.0);
        assert_eq!(vec[Axis3::X], 1.0);
        assert_eq!(vec[Axis3::Y], 2.0);
        assert_eq!(vec[Axis3::Z], 3.0);
        vec[Axis3::Y] = 5.0;
        assert_eq!(vec.y, 5.0);
    }

    #[test]
    fn corner_codes_match_positive_axes() {
        for corner in Corners3::all() {
            assert_eq!(Corner3::from_positive_axes(corner.positive_axes()), corner);
            for axis in Axes3::all() {
                assert_eq!(
                    corner.is_positive_along(axis),
                    corner.positive_axes().contains(axis)
                );
            }
        }
        assert_eq!(Corner3::X1Y0Z1.code(), 0b101);
        assert_eq!(Corner3::X0Y1Z0.code(), 0b010);
    }

    #[rstest]
    #[case(DVec3::new(1.0, 1.0, 1.0), Corner3::X1Y1Z1)]
    #[case(DVec3::new(-1.0, -1.0, -1.0), Corner3::X0Y0Z0)]
    #[case(DVec3::new(1.0, -1.0, -1.0), Corner3::X1Y0Z0)]
    #[case(DVec3::new(-1.0, 1.0, 1.0), Corner3::X0Y1Z1)]
    #[case(DVec3::new(0.0, 0.0, 0.0), Corner3::X1Y1Z1)]
    #[case(DVec3::new(0.0, -1.0, 0.0), Corner3::X1Y0Z1)]
    fn corner_from_point(#[case] point: DVec3, #[case] expected: Corner3) {
        assert_eq!(Corner3::from_point(DVec3::ZERO, point), expected);
    }

    #[test]
    fn corner_from_point_is_deterministic_on_boundary() {
        let center = DVec3::new(10.0, -4.0, 2.5);
        let first = Corner3::from_point(center, center);
        for _ in 0..16 {
            assert_eq!(Corner3::from_point(center, center), first);
        }
        assert_eq!(first, Corner3::X1Y1Z1);
    }

    #[test]
    fn corner_from_point_nan_goes_negative() {
        let point = DVec3::new(f64::NAN, 1.0, 1.0);
        assert_eq!(Corner3::from_point(DVec3::ZERO, point), Corner3::X0Y1Z1);
    }

    #[test]
    fn corner_signum() {
        assert_eq!(Corner3::X0Y0Z0.signum(), DVec3::splat(-1.0));
        assert_eq!(Corner3::X1Y0Z1.signum(), DVec3::new(1.0, -1.0, 1.0));
    }

    #[test]
    fn corner_vec_conversion() {
        assert_eq!(DVec3::from(Corner3::X1Y1Z0), DVec3::new(1.0, 1.0, 0.0));
        assert_eq!(Corner3::try_from(DVec3::new(0.0, 1.0, 1.0)), Ok(Corner3::X0Y1Z1));
        assert_eq!(Corner3::try_from(DVec3::new(0.5, 1.0, 1.0)), Err(()));
    }
}
