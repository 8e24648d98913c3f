pub mod jacobian;
pub mod lm;
pub mod options;
pub mod stepwise;

pub use jacobian::JacobianBuilder;
pub use lm::{train_lm, LMReport};
pub use options::{LMOptions, StepOptions};
pub use stepwise::{
    train_lm_stepwise, train_lm_stepwise_no_validation, HeuristicOutputInit, NoopOutputInit, OutputInitializer,
    StepwiseReport,
};
