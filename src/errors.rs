use thiserror::Error;

/// Error taxonomy for graph construction, evaluation and training.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetError {
    #[error("algebraic loop detected: {0}")]
    AlgebraicLoop(String),
    #[error("network has no input neurons")]
    NoInputs,
    #[error("network has no output neurons")]
    NoOutputs,
    #[error("neuron {0} is neither input nor output and has no incoming or outgoing edges")]
    UnusedNeuron(usize),
    #[error("index out of range: {0}")]
    OutOfRange(String),
    #[error("singular system encountered during linear solve")]
    SingularSystem,
    #[error("training error became non-finite and could not be clamped")]
    NumericalInstability,
}

pub type NetResult<T> = Result<T, NetError>;
