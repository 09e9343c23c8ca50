pub mod instrument;
pub mod position;
pub mod trade;
