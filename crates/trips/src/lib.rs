pub mod memory;
pub mod repository;
pub mod service;

pub use repository::{MappingError, RepositoryError, Result, TripRepository};
pub use service::TripService;
