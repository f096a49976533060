use thiserror::Error;

/// Catalog or generation mismatch. Never recovered inside the core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("unknown item: {0}")]
    UnknownItem(String),
    #[error("unknown recipe: {0}")]
    UnknownRecipe(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("the run is already over")]
    RunFinished,
    #[error("no combat action was supplied for an ongoing encounter")]
    MissingCombatInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("journal ran out of inputs at sequence {seq}")]
    MissingInput { seq: u64 },
    #[error("journal record {seq} does not match the expected input kind")]
    UnexpectedInput { seq: u64 },
    #[error("journal was recorded under config {recorded:016x}, replay was given {supplied:016x}")]
    ConfigMismatch { recorded: u64, supplied: u64 },
    #[error(transparent)]
    Game(#[from] GameError),
}
