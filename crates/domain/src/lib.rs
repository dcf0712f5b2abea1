pub mod entities;
pub mod job_spec;
pub mod value_objects;

pub use collector_errors::{CollectorError, CollectorResult};
pub use entities::*;
pub use job_spec::*;
pub use value_objects::*;
