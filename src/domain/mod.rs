// Domain layer: records, ports (interfaces) and the site's naming rules.

pub mod model;
pub mod ports;

pub mod services;
