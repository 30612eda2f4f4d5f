// Value types the containers compare by. Calendar math is delegated to chrono.

pub mod object;
pub mod ts;
pub mod tsdiff;
