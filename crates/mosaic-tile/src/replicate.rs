//! Tile replication: place translated copies of the template on the grid
//! and hoist each copy's connection points to the output compound.

use mosaic_core::{BoundBox, Child, Compound, Vec3};

use crate::config::TilingSpec;
use crate::error::{TileError, TileResult};

/// Scratch state handed from replication to stitching.
pub struct Replicated {
    pub compound: Compound,
    /// Side map from particle id in the tiled compound to the particle's
    /// index in the template enumeration. Scoped to one tiling call.
    pub template_index: Vec<usize>,
    pub template_box: BoundBox,
    pub lattice_box: BoundBox,
}

/// Every axis with more than one copy must be periodic in the template.
pub fn check_periodicity(tile: &Compound, n_tiles: [usize; 3]) -> TileResult<()> {
    for axis in 0..3 {
        if n_tiles[axis] > 1 && !tile.periodicity[axis] {
            return Err(TileError::Config(format!(
                "tile '{}' is not periodic along axis {axis} but {} copies were requested",
                tile.name, n_tiles[axis]
            )));
        }
    }
    Ok(())
}

/// Place `n_tiles` translated copies of `tile` into a fresh compound. Each
/// copy is labeled `<name>_<i>-<j>-<k>` and its ports are re-exposed at the
/// top level.
pub fn replicate(tile: &Compound, spec: &TilingSpec, name: &str) -> TileResult<Replicated> {
    let template_box = match tile.box_ {
        Some(b) => b,
        None => tile.bounding_box()?,
    };
    let [nx, ny, nz] = spec.n_tiles;
    let lattice_box = template_box.scaled(spec.n_tiles);

    let mut out = Compound::new(name);
    out.periodicity = tile.periodicity;
    out.box_ = Some(lattice_box);

    let mut template_index = Vec::with_capacity(spec.total_tiles() * tile.particle_count());
    let lengths = template_box.lengths;
    for i in 0..nx {
        for j in 0..ny {
            for k in 0..nz {
                let mut replica = tile.clone();
                replica.translate(Vec3::new(
                    i as f64 * lengths[0],
                    j as f64 * lengths[1],
                    k as f64 * lengths[2],
                ));
                let label = format!("{name}_{i}-{j}-{k}");
                let offsets = out.add_substructure(&label, &replica);
                template_index.extend(0..tile.particle_count());
                for child in replica.children() {
                    if let Child::ConnectionPoint(id) = child {
                        out.hoist_port(offsets.port + id);
                    }
                }
            }
        }
    }

    Ok(Replicated {
        compound: out,
        template_index,
        template_box,
        lattice_box,
    })
}
