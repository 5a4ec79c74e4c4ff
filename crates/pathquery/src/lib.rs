pub mod ast;
pub mod axes;
pub mod dom;
pub mod engine;
pub mod error;
pub mod functions;
pub mod operators;
pub mod parser;

pub use ast::{BareTest, Operand, PathExpression, Predicate, Scope, Selector, Step, StepChain};
pub use dom::DocumentNode;
pub use engine::{QueryResult, evaluate};
pub use error::PathError;
pub use functions::{AxisFn, FilterFn, Registry, SelectFn};
pub use operators::{OpValue, OperatorFn, OperatorRegistry};
pub use parser::compile;

// Re-export test utilities for integration testing in downstream crates
pub use dom::tests;
