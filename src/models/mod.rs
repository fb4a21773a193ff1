pub mod draw;
pub mod fortune;
pub mod roster;

pub use draw::*;
pub use fortune::*;
pub use roster::*;
