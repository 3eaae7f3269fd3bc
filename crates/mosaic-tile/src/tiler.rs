//! Entry point: replicate a tile, then stitch the bonds its periodic
//! boundary cut. The result is built on a scratch compound and returned
//! only from the success path, so no partially repaired structure is ever
//! observable.

use std::time::{Duration, Instant};

use mosaic_core::Compound;

use crate::config::{TilingSpec, DEFAULT_NEIGHBOR_WIDTH};
use crate::error::TileResult;
use crate::replicate::{check_periodicity, replicate};
use crate::stitch::repair_bonds;

#[derive(Default)]
struct TileProfile {
    replicate: Duration,
    stitch: Duration,
}

impl TileProfile {
    fn enabled() -> bool {
        std::env::var("MOSAIC_TILE_PROFILE").is_ok()
    }

    fn report(&self, name: &str) {
        let secs = |d: Duration| d.as_secs_f64();
        eprintln!(
            "mosaic-tile profile '{name}' (s): total={:.3} replicate={:.3} stitch={:.3}",
            secs(self.replicate + self.stitch),
            secs(self.replicate),
            secs(self.stitch),
        );
    }
}

/// Replicate `tile` `spec.n_tiles` times along x, y, z and repair the
/// connectivity across the copies. The template is never mutated.
pub fn tile(tile: &Compound, spec: &TilingSpec) -> TileResult<Compound> {
    let spec = spec.normalized()?;
    check_periodicity(tile, spec.n_tiles)?;
    let [nx, ny, nz] = spec.n_tiles;
    let name = spec
        .name
        .clone()
        .unwrap_or_else(|| format!("{}_{nx}x{ny}x{nz}", tile.name));

    let mut profile = TileProfile::default();
    let start = Instant::now();
    let mut rep = replicate(tile, &spec, &name)?;
    profile.replicate = start.elapsed();

    // A single copy has no cross-replica bonds to fix.
    if !spec.is_identity() {
        let start = Instant::now();
        let k = spec.k.unwrap_or(DEFAULT_NEIGHBOR_WIDTH);
        repair_bonds(&mut rep, tile, k)?;
        profile.stitch = start.elapsed();
    }

    if TileProfile::enabled() {
        profile.report(&name);
    }
    Ok(rep.compound)
}
