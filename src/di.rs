//! Dependency-injection generators plugged into the pipeline.
pub mod descriptor;
pub mod enum_id;
pub mod names;
pub mod recipe;

pub use descriptor::BeanDescriptor;
pub use enum_id::EnumIdGenerator;
pub use recipe::RecipeGenerator;
