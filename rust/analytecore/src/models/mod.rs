pub mod peak;
pub mod record;
pub mod tolerance;

pub use peak::{
    Peak,
    PeakId,
};
pub use record::Record;
pub use tolerance::Tolerance;
