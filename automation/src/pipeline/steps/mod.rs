pub mod battle;
pub mod primitive;

pub use battle::*;
pub use primitive::*;
