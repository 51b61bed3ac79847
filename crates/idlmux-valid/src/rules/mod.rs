pub mod duplicate_names;
pub mod field_numbers;
pub mod map_keys;
pub mod ref_integrity;
pub mod union_options;
pub mod version_check;
