// Domain layer: command model and the ports the dispatch entry points depend on.

pub mod model;
pub mod ports;
