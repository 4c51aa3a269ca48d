//! Axis-aligned bounding boxes.

use cgmath::{EuclideanSpace, Matrix4, Point3, Transform as _, Vector3};

/// An axis-aligned box given by its minimum and maximum corner.
///
/// `min <= max` holds component-wise for every box built through [`Aabb::new`]
/// or [`Aabb::from_points`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    /// Creates a box from two opposite corners in any order.
    pub fn new(a: Point3<f32>, b: Point3<f32>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Smallest box containing all `points`, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |aabb, p| aabb.grow(p)))
    }

    pub fn grow(&self, p: Point3<f32>) -> Self {
        Self {
            min: Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            max: Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        }
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        self.grow(other.min).grow(other.max)
    }

    pub fn center(&self) -> Point3<f32> {
        self.min.midpoint(self.max)
    }

    /// Half of the diagonal, i.e. the vector from the centre to `max`.
    pub fn extent(&self) -> Vector3<f32> {
        (self.max - self.min) * 0.5
    }

    pub fn corners(&self) -> [Point3<f32>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Box enclosing this box after applying `matrix` to each of its corners.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Aabb {
        let corners = self.corners().map(|corner| matrix.transform_point(corner));
        let mut aabb = Self::new(corners[0], corners[0]);
        for corner in &corners[1..] {
            aabb = aabb.grow(*corner);
        }
        aabb
    }
}
