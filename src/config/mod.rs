pub mod env;
pub mod settings;
pub mod sources;

pub use env::*;
pub use settings::*;
pub use sources::*;
