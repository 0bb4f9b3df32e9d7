// Domain layer: order model, pricing and ports. No I/O here.

pub mod model;
pub mod ports;
pub mod pricing;
