pub mod d400_job_drilldown;
pub mod d401_station_view;
