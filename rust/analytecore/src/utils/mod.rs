pub mod extrema;
pub mod streaming_calculators;

pub use streaming_calculators::{
    round_to,
    running_average_update,
};
