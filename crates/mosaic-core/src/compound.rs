//! Structure container: particles, bonds, and open connection points.
//!
//! A `Compound` is either a flat template (particles + ports) or the
//! assembled result of a recipe, in which case its top-level children are
//! labeled sub-structures plus connection points hoisted out of them.

use fxhash::FxHashSet;

use crate::bounds::BoundBox;
use crate::error::CoreResult;
use crate::geom::Vec3;

pub type ParticleId = usize;
pub type PortId = usize;

/// A single particle with name, element, and 3D position.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub name: String,
    pub element: String,
    pub position: Vec3,
}

impl Particle {
    pub fn new(name: &str, element: &str, position: Vec3) -> Self {
        Self {
            name: name.to_string(),
            element: element.to_string(),
            position,
        }
    }
}

/// An open connection point where another structure may attach.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub position: Vec3,
    pub anchor: Option<ParticleId>,
}

impl Port {
    pub fn new(position: Vec3, anchor: Option<ParticleId>) -> Self {
        Self { position, anchor }
    }
}

/// Canonical unordered pair of particle ids. The constructor orders the
/// endpoints, so `(a, b)` and `(b, a)` are the same bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bond(ParticleId, ParticleId);

impl Bond {
    pub fn new(a: ParticleId, b: ParticleId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn endpoints(self) -> (ParticleId, ParticleId) {
        (self.0, self.1)
    }
}

/// A top-level child of a compound. Traversals filter on the tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Particle(ParticleId),
    SubStructure {
        label: String,
        particles: Vec<ParticleId>,
        ports: Vec<PortId>,
    },
    /// A reference to a port, either owned directly (templates) or hoisted
    /// out of a sub-structure without changing containment.
    ConnectionPoint(PortId),
}

/// Ids assigned to a copied sub-structure's particles and ports.
#[derive(Debug, Clone, Copy)]
pub struct SubOffsets {
    pub particle: ParticleId,
    pub port: PortId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    pub name: String,
    pub periodicity: [bool; 3],
    pub box_: Option<BoundBox>,
    particles: Vec<Particle>,
    ports: Vec<Port>,
    bonds: FxHashSet<Bond>,
    children: Vec<Child>,
}

impl Compound {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            periodicity: [false; 3],
            box_: None,
            particles: Vec::new(),
            ports: Vec::new(),
            bonds: FxHashSet::default(),
            children: Vec::new(),
        }
    }

    pub fn add_particle(&mut self, particle: Particle) -> ParticleId {
        let id = self.particles.len();
        self.particles.push(particle);
        self.children.push(Child::Particle(id));
        id
    }

    pub fn add_port(&mut self, port: Port) -> PortId {
        let id = self.ports.len();
        self.ports.push(port);
        self.children.push(Child::ConnectionPoint(id));
        id
    }

    /// Returns false if the bond was already present.
    pub fn add_bond(&mut self, bond: Bond) -> bool {
        self.bonds.insert(bond)
    }

    /// Returns false if the bond was not present.
    pub fn remove_bond(&mut self, bond: Bond) -> bool {
        self.bonds.remove(&bond)
    }

    /// Copy `other`'s particles, ports, and bonds into this compound as a
    /// labeled sub-structure child. Ids are shifted by the returned offsets.
    pub fn add_substructure(&mut self, label: &str, other: &Compound) -> SubOffsets {
        let offsets = SubOffsets {
            particle: self.particles.len(),
            port: self.ports.len(),
        };
        self.particles.extend(other.particles.iter().cloned());
        for port in &other.ports {
            self.ports.push(Port {
                position: port.position,
                anchor: port.anchor.map(|a| a + offsets.particle),
            });
        }
        for bond in &other.bonds {
            let (a, b) = bond.endpoints();
            self.bonds
                .insert(Bond::new(a + offsets.particle, b + offsets.particle));
        }
        self.children.push(Child::SubStructure {
            label: label.to_string(),
            particles: (offsets.particle..self.particles.len()).collect(),
            ports: (offsets.port..self.ports.len()).collect(),
        });
        offsets
    }

    /// Re-expose a port owned by a sub-structure at the top level. The port
    /// stays logically inside its sub-structure; only a reference is added.
    pub fn hoist_port(&mut self, id: PortId) {
        self.children.push(Child::ConnectionPoint(id));
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle(&self, id: ParticleId) -> &Particle {
        &self.particles[id]
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn bonds(&self) -> impl Iterator<Item = Bond> + '_ {
        self.bonds.iter().copied()
    }

    pub fn has_bond(&self, bond: Bond) -> bool {
        self.bonds.contains(&bond)
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    pub fn positions(&self) -> Vec<Vec3> {
        self.particles.iter().map(|p| p.position).collect()
    }

    /// Top-level connection points, in child order.
    pub fn top_level_ports(&self) -> impl Iterator<Item = PortId> + '_ {
        self.children.iter().filter_map(|child| match child {
            Child::ConnectionPoint(id) => Some(*id),
            _ => None,
        })
    }

    /// Move every particle and port by `v`.
    pub fn translate(&mut self, v: Vec3) {
        for particle in &mut self.particles {
            particle.position = particle.position.add(v);
        }
        for port in &mut self.ports {
            port.position = port.position.add(v);
        }
    }

    /// Tight bounding box of the particle positions.
    pub fn bounding_box(&self) -> CoreResult<BoundBox> {
        BoundBox::tight(&self.positions())
    }
}
