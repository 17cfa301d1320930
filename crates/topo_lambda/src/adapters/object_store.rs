/// Metadata returned by a head-object call against a companion bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub content_length: Option<i64>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}

/// Read seam against the message body bucket. `Ok(None)` means the object
/// does not exist; transport and permission failures are `Err`.
pub trait MessageBodyStore {
    fn head_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectMetadata>, String>;
}
