pub mod dto;
pub mod production_target;
pub mod station_board;

pub use dto::{
    StationDatesResponse, StationProgressResponse, StationRow, StationViewQuery,
    StationViewResponse,
};
pub use production_target::{ProductionProgress, ProductionWindow};
pub use station_board::{BoardError, PendingWrite, StationBoard};
