// Domain layer: case models, ports, the formatter and the host parser.

pub mod format;
pub mod model;
pub mod parser;
pub mod ports;
pub mod table;
