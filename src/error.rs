use thiserror::Error;

use crate::models::BagId;

/// Failures raised while turning stored text back into item stacks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("expected {expected} item stacks, found {found}")]
    StackCount { expected: usize, found: usize },
    #[error("could not parse {field} from item stack text {text:?}")]
    Field { field: &'static str, text: String },
}

#[derive(Debug, Error)]
pub enum GravebagError {
    /// The static slot layout has no category for this index. Always a table bug.
    #[error("slot index {index} falls outside every layout category")]
    Layout { index: usize },
    #[error("gravebag inventory holds {found} slots, expected {expected}")]
    SlotCount { expected: usize, found: usize },
    #[error("gravebag store failure: {0}")]
    Store(String),
    #[error("malformed gravebag row: {0}")]
    Format(#[from] FormatError),
    #[error("gravebag {id} has no stored row")]
    MissingRow { id: BagId },
    #[error("no world has been loaded yet")]
    WorldNotReady,
    #[error("could not read gravebag config: {0}")]
    ConfigIo(#[from] std::io::Error),
    #[error("could not parse gravebag config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, GravebagError>;
