use sha2::{Digest, Sha256};

/// Number of fingerprint hex characters appended to derived names.
const NAME_SUFFIX_LEN: usize = 8;

/// Derives the unique logical name for a function from its handler
/// reference. The same handler reference always yields the same name, so
/// registering one handler twice collides by construction.
pub fn function_logical_name(handler_ref: &str) -> String {
    derived_name("Function", handler_ref)
}

/// Derives a stable logical name for an auxiliary resource, namespaced by
/// the caller-supplied base (e.g. "S3DynamicBucket").
pub fn resource_logical_name(base: &str) -> String {
    derived_name(base, base)
}

fn derived_name(base: &str, identity: &str) -> String {
    let mut sanitized: String = base
        .chars()
        .filter(|character| character.is_ascii_alphanumeric())
        .collect();
    if sanitized.is_empty() {
        sanitized.push_str("Resource");
    }

    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    let fingerprint = format!("{:x}", hasher.finalize());
    format!("{sanitized}{}", &fingerprint[..NAME_SUFFIX_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_handler_ref_derives_same_name() {
        assert_eq!(
            function_logical_name("handlers::echo_s3_event"),
            function_logical_name("handlers::echo_s3_event"),
        );
    }

    #[test]
    fn different_handler_refs_derive_different_names() {
        assert_ne!(
            function_logical_name("handlers::echo_s3_event"),
            function_logical_name("handlers::echo_sns_event"),
        );
    }

    #[test]
    fn names_are_alphanumeric() {
        let name = function_logical_name("crate::module::handler");
        assert!(name.chars().all(|character| character.is_ascii_alphanumeric()));
        assert!(name.starts_with("Function"));
    }

    #[test]
    fn resource_names_keep_the_base_prefix() {
        let name = resource_logical_name("S3DynamicBucket");
        assert!(name.starts_with("S3DynamicBucket"));
        assert_eq!(name.len(), "S3DynamicBucket".len() + 8);
    }
}
