use super::types::ComponentKind;
use crate::core::errors::{SimError, SimResult};
use crate::core::types::{InstanceId, Node, Orientation, Point};
use serde::{Deserialize, Serialize};

/// A placed component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instance {
    pub id: InstanceId,
    pub kind: ComponentKind,
    pub pos: Point,
    pub orientation: Orientation,
}

/// A resolved port of a placed instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Port {
    pub index: usize,
    pub node: Node,
}

impl Instance {
    /// Create an instance with a fresh identifier
    pub fn new(kind: ComponentKind, pos: Point, orientation: Orientation) -> Self {
        Self { id: InstanceId::new(), kind, pos, orientation }
    }

    /// Ports in port-table order, rotated and moved onto the grid
    pub fn ports(&self) -> impl Iterator<Item = Port> + '_ {
        self.kind.ports().iter().enumerate().map(move |(index, spec)| Port {
            index,
            node: Node::new(self.pos + self.orientation.rotate(spec.offset), spec.flags),
        })
    }

    pub fn inputs(&self) -> impl Iterator<Item = Port> + '_ {
        self.ports().filter(|p| p.node.flags.is_input())
    }

    pub fn outputs(&self) -> impl Iterator<Item = Port> + '_ {
        self.ports().filter(|p| p.node.flags.is_output())
    }
}

/// Placed instances in placement order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceTable {
    instances: Vec<Instance>,
}

impl InstanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, instance: Instance) -> SimResult<()> {
        if self.get(&instance.id).is_some() {
            return Err(SimError::DuplicateInstance(instance.id));
        }
        self.instances.push(instance);
        Ok(())
    }

    pub fn remove(&mut self, id: &InstanceId) -> SimResult<Instance> {
        let index = self
            .instances
            .iter()
            .position(|i| i.id == *id)
            .ok_or(SimError::UnknownInstance(*id))?;
        Ok(self.instances.remove(index))
    }

    pub fn get(&self, id: &InstanceId) -> Option<&Instance> {
        self.instances.iter().find(|i| i.id == *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
