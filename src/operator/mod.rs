pub mod construction;
pub mod model;
pub mod serialization;

pub use construction::OperatorBuilder;
pub use model::{ForwardOperator, OperatorSpec};
pub use serialization::{OperatorLoader, OperatorWriter, RawOperator};
