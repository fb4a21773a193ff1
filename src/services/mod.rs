pub mod fortune_service;
pub mod health_service;
pub mod roster_service;

pub use fortune_service::*;
pub use health_service::*;
pub use roster_service::*;
