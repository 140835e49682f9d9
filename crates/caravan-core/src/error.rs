use crate::item::ItemId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when manipulating a caravan document.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The requested item ID is not attached to the caravan.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// An item with the same ID is already attached.
    #[error("item already attached: {0}")]
    DuplicateItem(ItemId),

    /// A snapshot could not be parsed or written.
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}
