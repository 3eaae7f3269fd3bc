use crate::bounds::BoundBox;
use crate::geom::Vec3;

/// Displacement `a - b` under the minimum-image convention, wrapped only
/// along axes flagged periodic.
pub fn min_image_delta(a: Vec3, b: Vec3, box_: &BoundBox, periodicity: [bool; 3]) -> Vec3 {
    let mut d = [a.x - b.x, a.y - b.y, a.z - b.z];
    for axis in 0..3 {
        let l = box_.lengths[axis];
        if periodicity[axis] && l > 0.0 {
            d[axis] -= (d[axis] / l).round() * l;
        }
    }
    Vec3::from_array(d)
}

pub fn min_periodic_distance(a: Vec3, b: Vec3, box_: &BoundBox, periodicity: [bool; 3]) -> f64 {
    min_image_delta(a, b, box_, periodicity).length()
}
