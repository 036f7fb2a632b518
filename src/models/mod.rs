pub mod enums;
pub mod lab;
pub mod table;

pub use enums::*;
pub use lab::*;
pub use table::*;
