use serde::{Deserialize, Serialize};

use crate::error::{TileError, TileResult};

/// Default width of the nearest-neighbor search used to relocate a cut
/// bond's partner image.
pub const DEFAULT_NEIGHBOR_WIDTH: usize = 10;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TilingSpec {
    /// Copies of the tile along x, y, z.
    pub n_tiles: [usize; 3],
    /// Name for the tiled compound; derived from the tile name when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Neighbor-search width for image lookup. Not retried internally:
    /// callers tune it and resubmit.
    #[serde(default)]
    pub k: Option<usize>,
}

impl TilingSpec {
    pub fn new(n_tiles: [usize; 3]) -> Self {
        Self {
            n_tiles,
            name: None,
            k: None,
        }
    }

    pub fn from_json(text: &str) -> TileResult<Self> {
        serde_json::from_str(text).map_err(|e| TileError::Config(format!("json: {e}")))
    }

    /// Validate and fill defaults.
    pub fn normalized(&self) -> TileResult<TilingSpec> {
        let mut spec = self.clone();
        spec.validate()?;
        if spec.k.is_none() {
            spec.k = Some(DEFAULT_NEIGHBOR_WIDTH);
        }
        Ok(spec)
    }

    fn validate(&self) -> TileResult<()> {
        if self.n_tiles.iter().any(|&n| n == 0) {
            return Err(TileError::Config(
                "number of tiles must be positive in every direction".into(),
            ));
        }
        if self.k == Some(0) {
            return Err(TileError::Config(
                "neighbor-search width k must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn is_identity(&self) -> bool {
        self.n_tiles == [1, 1, 1]
    }

    pub fn total_tiles(&self) -> usize {
        self.n_tiles.iter().product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_fills_neighbor_width() {
        let spec = TilingSpec::new([2, 1, 3]).normalized().unwrap();
        assert_eq!(spec.k, Some(DEFAULT_NEIGHBOR_WIDTH));
        assert_eq!(spec.total_tiles(), 6);
        assert!(!spec.is_identity());
    }

    #[test]
    fn zero_tile_count_rejected() {
        assert!(TilingSpec::new([2, 0, 1]).normalized().is_err());
    }

    #[test]
    fn zero_k_rejected() {
        let mut spec = TilingSpec::new([2, 1, 1]);
        spec.k = Some(0);
        assert!(spec.normalized().is_err());
    }

    #[test]
    fn parses_json_spec() {
        let spec = TilingSpec::from_json(r#"{"n_tiles": [2, 2, 1], "k": 4}"#).unwrap();
        assert_eq!(spec.n_tiles, [2, 2, 1]);
        assert_eq!(spec.k, Some(4));
        assert!(spec.name.is_none());
    }

    #[test]
    fn bad_json_is_a_config_error() {
        assert!(matches!(
            TilingSpec::from_json("{"),
            Err(TileError::Config(_))
        ));
    }
}
