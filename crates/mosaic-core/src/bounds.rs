use crate::error::{CoreError, CoreResult};
use crate::geom::Vec3;

/// A box described by its edge lengths and angles (degrees).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundBox {
    pub lengths: [f64; 3],
    pub angles: [f64; 3],
}

impl BoundBox {
    pub fn new(lengths: [f64; 3], angles: [f64; 3]) -> CoreResult<Self> {
        if lengths.iter().any(|&l| l <= 0.0) {
            return Err(CoreError::Invalid("box lengths must be positive".into()));
        }
        if angles.iter().any(|&a| a <= 0.0 || a >= 180.0) {
            return Err(CoreError::Invalid(
                "box angles must lie in (0, 180) degrees".into(),
            ));
        }
        Ok(Self { lengths, angles })
    }

    pub fn orthogonal(lengths: [f64; 3]) -> CoreResult<Self> {
        Self::new(lengths, [90.0; 3])
    }

    /// Tight bounding box of a point set.
    pub fn tight(points: &[Vec3]) -> CoreResult<Self> {
        if points.is_empty() {
            return Err(CoreError::Invalid(
                "bounding box requires at least one point".into(),
            ));
        }
        let mut min = points[0];
        let mut max = points[0];
        for p in points {
            min = Vec3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Vec3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        Self::orthogonal(max.sub(min).to_array())
    }

    /// Same angles, lengths multiplied componentwise by `counts`.
    pub fn scaled(self, counts: [usize; 3]) -> Self {
        Self {
            lengths: [
                self.lengths[0] * counts[0] as f64,
                self.lengths[1] * counts[1] as f64,
                self.lengths[2] * counts[2] as f64,
            ],
            angles: self.angles,
        }
    }
}
