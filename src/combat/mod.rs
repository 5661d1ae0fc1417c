pub mod death;
pub mod hit;
pub mod initiate;
pub mod round;
pub mod switching;
pub mod threat;

pub use hit::HitOptions;
