// Adapters layer: concrete implementations of the ports (storage, http, html parsing).

pub mod html;
pub mod http;
pub mod storage;
