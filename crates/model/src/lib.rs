pub use serde_with;

pub mod location;
pub mod statistics;
pub mod trip;

pub trait ExampleData {
    fn example_data() -> Self;
}
