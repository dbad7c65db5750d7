pub mod aggregate;

pub use aggregate::{
    bundle_sort_number, previous_completion, sort_for_station, LineAssignment, LineAssignmentId, StationProgress,
    StationTransition, TransitionError, DEFAULT_STATIONS,
};
