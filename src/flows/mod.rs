//! Side-effecting flows triggered from the navigation layer.

pub mod confirm;
pub mod location;

pub use confirm::{commit, Consequence, ConfirmFlow, FlowState, Mutation, Prompt};
pub use location::{LocationState, Provenance};
