pub mod models;
pub mod upload;

pub use models::*;
pub use upload::transport_for;
