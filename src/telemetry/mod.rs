pub mod constants;
pub mod snapshot;
pub mod extrema;
pub mod possession;
pub mod goals;
pub mod status;
pub mod state;
pub mod match_result;
