pub mod preset_id;
pub mod preset_record;
pub mod preset_store;
