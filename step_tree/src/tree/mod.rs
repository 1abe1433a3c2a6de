pub mod node;

pub use node::{StepNode, StepTree};
