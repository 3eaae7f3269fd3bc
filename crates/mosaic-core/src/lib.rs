#![forbid(unsafe_code)]

pub mod bounds;
pub mod compound;
pub mod error;
pub mod geom;
pub mod neighbor;
pub mod pbc;

pub use bounds::BoundBox;
pub use compound::{Bond, Child, Compound, Particle, ParticleId, Port, PortId, SubOffsets};
pub use error::{CoreError, CoreResult};
pub use geom::Vec3;
pub use neighbor::PeriodicNeighborIndex;
pub use pbc::{min_image_delta, min_periodic_distance};
