//! Bond repair: find the bonds that crossed the template's own periodic
//! boundary and rewire each one to the correct image particle in a
//! neighboring replica.

use fxhash::FxHashSet;

use mosaic_core::{min_periodic_distance, Bond, Compound, ParticleId, PeriodicNeighborIndex};

use crate::error::{TileError, TileResult};
use crate::replicate::Replicated;

/// Unordered pair of template indices identifying a bond family shared by
/// every replica.
type IndexPair = (usize, usize);

fn canonical(a: usize, b: usize) -> IndexPair {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Half the shortest box length over the periodic axes. Bonds longer than
/// this cannot be satisfied within a single image; infinite when no axis
/// is periodic.
pub fn distance_threshold(lengths: [f64; 3], periodicity: [bool; 3]) -> f64 {
    let mut shortest = f64::INFINITY;
    for axis in 0..3 {
        if periodicity[axis] {
            shortest = shortest.min(lengths[axis]);
        }
    }
    shortest / 2.0
}

/// Template bonds whose raw endpoint distance exceeds the threshold: the
/// template could only have satisfied them through its own periodic wrap.
pub fn periodic_bond_set(tile: &Compound, dist_thresh: f64) -> FxHashSet<IndexPair> {
    let mut set = FxHashSet::default();
    for bond in tile.bonds() {
        let (a, b) = bond.endpoints();
        let raw = tile
            .particle(a)
            .position
            .sub(tile.particle(b).position)
            .length();
        if raw > dist_thresh {
            set.insert(canonical(a, b));
        }
    }
    set
}

/// Rewire every replicated bond that is a cross-boundary artifact. The
/// neighbor index lives only for the duration of this call.
pub fn repair_bonds(rep: &mut Replicated, tile: &Compound, k: usize) -> TileResult<()> {
    let dist_thresh = distance_threshold(rep.template_box.lengths, tile.periodicity);
    let periodic_bonds = periodic_bond_set(tile, dist_thresh);
    if periodic_bonds.is_empty() {
        return Ok(());
    }

    let out = &mut rep.compound;
    let index = PeriodicNeighborIndex::new(&out.positions(), rep.lattice_box, out.periodicity)?;

    let mut to_remove: FxHashSet<Bond> = FxHashSet::default();
    let mut to_add: FxHashSet<Bond> = FxHashSet::default();
    let bonds: Vec<Bond> = out.bonds().collect();
    for bond in bonds {
        let (p1, p2) = bond.endpoints();
        let pair = canonical(rep.template_index[p1], rep.template_index[p2]);
        if !periodic_bonds.contains(&pair) {
            continue;
        }
        // Interior copies of a periodic bond family can still be short in
        // the lattice; only geometrically long ones are artifacts.
        let dist = min_periodic_distance(
            out.particle(p1).position,
            out.particle(p2).position,
            &rep.lattice_box,
            out.periodicity,
        );
        if dist <= dist_thresh {
            continue;
        }

        to_remove.insert(bond);
        let image2 = find_image(out, &index, &rep.template_index, tile, p1, p2, k)?;
        let image1 = find_image(out, &index, &rep.template_index, tile, p2, p1, k)?;
        to_add.insert(Bond::new(p1, image2));
        to_add.insert(Bond::new(p2, image1));
    }

    // Remove strictly before adding so no duplicate-bond state is ever
    // observable.
    for bond in &to_remove {
        out.remove_bond(*bond);
    }
    for bond in &to_add {
        out.add_bond(*bond);
    }

    // The two lookups for one bond are independent; re-measure what they
    // produced and fail loudly rather than return a silently long bond.
    for bond in &to_add {
        let (a, b) = bond.endpoints();
        let dist = min_periodic_distance(
            out.particle(a).position,
            out.particle(b).position,
            &rep.lattice_box,
            out.periodicity,
        );
        if dist > dist_thresh {
            return Err(TileError::Stitch(format!(
                "stitched bond {a}-{b} is still {dist:.4} long (threshold {dist_thresh:.4})"
            )));
        }
    }
    Ok(())
}

/// Among the `k` nearest neighbors of `query`, return the particle that
/// carries the same template index as `matching`.
fn find_image(
    out: &Compound,
    index: &PeriodicNeighborIndex,
    template_index: &[usize],
    tile: &Compound,
    query: ParticleId,
    matching: ParticleId,
    k: usize,
) -> TileResult<ParticleId> {
    let want = template_index[matching];
    for neighbor in index.query(out.particle(query).position, k) {
        if template_index[neighbor] == want {
            return Ok(neighbor);
        }
    }
    let per_tile = tile.particle_count().max(1);
    Err(TileError::Stitch(format!(
        "no image of template particle {want} among the {k} nearest neighbors of \
         particle {query} (replica {})",
        query / per_tile
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::{BoundBox, Particle, Vec3};

    fn ring_tile() -> Compound {
        let mut tile = Compound::new("ring");
        tile.periodicity = [true, false, false];
        tile.box_ = Some(BoundBox::orthogonal([4.0, 4.0, 4.0]).unwrap());
        for i in 0..4 {
            tile.add_particle(Particle::new(
                "C",
                "C",
                Vec3::new(0.5 + i as f64, 2.0, 2.0),
            ));
        }
        tile.add_bond(Bond::new(0, 1));
        tile.add_bond(Bond::new(1, 2));
        tile.add_bond(Bond::new(2, 3));
        // Closed through the periodic x boundary: raw length 3.0.
        tile.add_bond(Bond::new(3, 0));
        tile
    }

    #[test]
    fn threshold_ignores_non_periodic_axes() {
        let t = distance_threshold([4.0, 2.0, 2.0], [true, false, false]);
        assert_eq!(t, 2.0);
        let t = distance_threshold([4.0, 2.0, 2.0], [true, true, false]);
        assert_eq!(t, 1.0);
    }

    #[test]
    fn threshold_is_infinite_without_periodicity() {
        assert_eq!(distance_threshold([4.0, 4.0, 4.0], [false; 3]), f64::INFINITY);
    }

    #[test]
    fn only_wrapped_bonds_are_periodic() {
        let tile = ring_tile();
        let set = periodic_bond_set(&tile, 2.0);
        assert_eq!(set.len(), 1);
        assert!(set.contains(&(0, 3)));
    }

    #[test]
    fn canonical_pairs_are_order_independent() {
        assert_eq!(canonical(5, 2), canonical(2, 5));
    }
}
