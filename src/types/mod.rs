//! Value types shared by the connection and statement layers.

mod consistency;
mod parameter;

pub use consistency::ConsistencyLevel;
pub use parameter::Parameter;
