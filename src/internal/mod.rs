pub(crate) mod frame_storage;
pub(crate) mod kind_index;
pub(crate) mod multi_storage;
pub(crate) mod pool;
pub(crate) mod pool_table;
pub(crate) mod single_frame;
pub(crate) mod single_storage;
pub(crate) mod singleton_storage;
pub(crate) mod sparse;
