pub mod specific;

pub use specific::{execute, Outcome};
