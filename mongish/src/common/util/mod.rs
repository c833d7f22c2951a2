mod date_utils;
mod naming;
mod task_util;

pub use date_utils::*;
pub use naming::*;
pub use task_util::*;
