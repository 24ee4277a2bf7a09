/// Conversion of points from one coordinate space into another.
pub trait Projection {
    /// Input point type.
    type InPoint;
    /// Output point type.
    type OutPoint;

    /// Projects a point. Returns `None` if the point cannot be represented in the output space.
    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint>;
    /// Inverse of [`Projection::project`].
    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint>;
}
