mod constants;
pub mod util;
mod value;

pub use constants::*;
pub use value::*;
