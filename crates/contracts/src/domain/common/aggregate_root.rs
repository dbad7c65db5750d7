use super::EntityMetadata;

/// Root of an aggregate: instance accessors plus static naming used for
/// table names and log messages.
pub trait AggregateRoot {
    type Id;

    fn id(&self) -> Self::Id;

    fn metadata(&self) -> &EntityMetadata;

    fn metadata_mut(&mut self) -> &mut EntityMetadata;

    /// Index of the aggregate in the system (e.g. "a001")
    fn aggregate_index() -> &'static str;

    /// Collection name used for storage (e.g. "bundle")
    fn collection_name() -> &'static str;

    /// Singular display name
    fn element_name() -> &'static str;

    /// Plural display name
    fn list_name() -> &'static str;

    /// Full system name (e.g. "a001_bundle"), also the table name
    fn full_name() -> String {
        format!("{}_{}", Self::aggregate_index(), Self::collection_name())
    }
}
