pub mod assertions;
pub mod snapshot;
