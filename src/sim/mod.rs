pub mod batch;
pub mod ecm;
pub mod interpolation;
pub mod planar;
pub mod spherical;
