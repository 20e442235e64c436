// Domain layer: calendar models, settings and ports (interfaces). No I/O here.

pub mod model;
pub mod ports;
pub mod settings;
