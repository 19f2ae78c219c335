pub mod netlist;
pub mod union_find;

pub use netlist::{EditRegion, Netlist, PortRef, Subnet, SubnetId, Terminal};
pub use union_find::UnionFind;
