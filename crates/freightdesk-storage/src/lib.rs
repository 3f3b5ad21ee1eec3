pub mod eval;
pub mod mem;
pub mod sql;
pub mod traits;

pub use mem::InMemoryExecutor;
pub use traits::*;
