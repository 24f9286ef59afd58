//! Read model trait for query-side views.

/// A read model providing query access to denormalized data.
///
/// Rows are keyed by aggregate id and only ever change through messages
/// from the command side.
pub trait ReadModel: Send + Sync {
    /// Returns the name of this read model.
    fn name(&self) -> &'static str;

    /// Returns the number of rows in this read model.
    fn count(&self) -> usize;
}
