pub mod builder;
pub mod controller;
pub mod state;

pub use builder::WorkflowControllerBuilder;
pub use controller::{Completion, WorkflowController};
pub use state::{Phase, WorkflowState};
