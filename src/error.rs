//! Filter construction errors.

/// Fatal errors raised while compiling a query tree into a filter.
///
/// Evaluation never fails; these only come out of construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("attempt to build a unit filter without a filter context")]
    MissingContext,
    #[error(
        "multiple [filter_location] children in one unit filter; combine them with [and] instead"
    )]
    DuplicateLocationFilter,
    #[error("multiple [filter_side] children in one unit filter; combine them with [and] instead")]
    DuplicateSideFilter,
    #[error("multiple [filter] children in one location filter; combine them with [and] instead")]
    DuplicateOccupantFilter,
}
