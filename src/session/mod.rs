pub mod gate;
pub mod state;
pub mod store;
pub mod verifier;

pub use gate::*;
pub use state::*;
pub use store::*;
pub use verifier::*;
