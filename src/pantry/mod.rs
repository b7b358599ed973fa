//! Pantry state: the store that owns it and the binding views use to read it

pub mod binding;
pub mod store;

pub use binding::{BindingPhase, PantryBinding};
pub use store::{PantryStore, Subscription};
