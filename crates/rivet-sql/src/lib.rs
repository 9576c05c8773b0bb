pub mod serializer;
pub use serializer::{Flavor, Params, Placeholder, Select, Serializer, Statement};
