pub mod flatten;
pub mod record;

pub use flatten::*;
pub use record::*;
