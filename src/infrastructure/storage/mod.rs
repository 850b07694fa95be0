mod object_staging_store;

pub use object_staging_store::ObjectStagingStore;
