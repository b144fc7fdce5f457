pub mod json_schema;
pub mod json_tree;
pub mod model_mapping;
pub mod utils;
