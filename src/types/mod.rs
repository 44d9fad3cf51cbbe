pub mod keys;
pub mod observation;
pub mod observation_set;
pub mod tables;
pub mod traits;
pub mod window;
