pub mod bounds;
pub mod frustum;
