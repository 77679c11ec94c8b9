use crate::error::LayoutError;
use crate::event::LogEvent;
use crate::identity::{IdentityKey, IdentitySource};
use crate::key;
use crate::record::Record;
use std::sync::Arc;

/// Static settings the enricher needs before it can process any event.
#[derive(Debug, Clone, Default)]
pub struct EnricherConfig {
    pub file: Option<String>,
    pub product: Option<String>,
}

/// Adds the deployment-specific fields to a record.
///
/// Holds only immutable configuration after construction, so a single
/// instance can be shared across threads and called concurrently.
pub struct Enricher {
    file: String,
    product: String,
    identity: Arc<dyn IdentitySource>,
}

impl Enricher {
    /// Validate configuration and build an enricher.
    ///
    /// **Errors**
    /// - [`LayoutError::MissingConfiguration`] when `file` or `product` is
    ///   absent.
    pub fn new(config: EnricherConfig, identity: Arc<dyn IdentitySource>) -> Result<Self, LayoutError> {
        let file = config.file.ok_or(LayoutError::MissingConfiguration("file"))?;
        let product = config.product.ok_or(LayoutError::MissingConfiguration("product"))?;
        Ok(Enricher { file, product, identity })
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    /// Add `marker`, `accid`, `envname`, `file` and `id` to `base`.
    ///
    /// Host-supplied base fields are kept as they are, except where they
    /// collide with one of the keys written here.
    pub fn enrich(&self, event: &LogEvent, mut base: Record) -> Record {
        if let Some(marker) = &event.marker {
            base.insert(key::MARKER, marker.as_str());
        }
        if let Some(accid) = self.identity.lookup(IdentityKey::AccountId) {
            base.insert(key::ACCID, accid);
        }
        if let Some(envname) = self.identity.lookup(IdentityKey::EnvName) {
            base.insert(key::ENVNAME, envname);
        }
        base.insert(key::FILE, self.file.as_str());
        base.insert(key::ID, self.identity_record());
        base
    }

    fn identity_record(&self) -> Record {
        let mut id = Record::with_capacity(4);
        id.insert(key::PRODUCT, self.product.as_str());
        for (name, source) in [
            (key::NODE, IdentityKey::Node),
            (key::STRIPE, IdentityKey::Stripe),
            (key::CLUSTER, IdentityKey::Cluster),
        ] {
            if let Some(value) = self.identity.lookup(source) {
                id.insert(name, value);
            }
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{NoIdentity, StaticIdentity};
    use crate::record::Value;

    fn config() -> EnricherConfig {
        EnricherConfig { file: Some("server.log".into()), product: Some("Acme DB".into()) }
    }

    #[test]
    fn minimal_enrichment_adds_only_file_and_product() {
        let enricher = Enricher::new(config(), Arc::new(NoIdentity)).unwrap();
        let mut base = Record::new();
        base.insert(key::LEVEL, "INFO");

        let r = enricher.enrich(&LogEvent::new("INFO", "app", "hi"), base);

        assert_eq!(r.len(), 3);
        assert_eq!(r.get(key::LEVEL), Some(&Value::from("INFO")));
        assert_eq!(r.get(key::FILE), Some(&Value::from("server.log")));
        let id = r.get(key::ID).and_then(Value::as_object).unwrap();
        assert_eq!(id.len(), 1);
        assert_eq!(id.get(key::PRODUCT), Some(&Value::from("Acme DB")));
    }

    #[test]
    fn marker_name_is_copied() {
        let enricher = Enricher::new(config(), Arc::new(NoIdentity)).unwrap();
        let event = LogEvent::new("WARN", "audit", "login").with_marker("AUDIT");
        let r = enricher.enrich(&event, Record::new());
        assert_eq!(r.get(key::MARKER), Some(&Value::from("AUDIT")));
    }

    #[test]
    fn identity_values_are_placed() {
        let identity = StaticIdentity::new()
            .with(IdentityKey::AccountId, "acc-1")
            .with(IdentityKey::EnvName, "prod")
            .with(IdentityKey::Node, "node-1")
            .with(IdentityKey::Cluster, "c1");
        let enricher = Enricher::new(config(), Arc::new(identity)).unwrap();

        let r = enricher.enrich(&LogEvent::new("INFO", "app", "hi"), Record::new());

        assert_eq!(r.get(key::ACCID), Some(&Value::from("acc-1")));
        assert_eq!(r.get(key::ENVNAME), Some(&Value::from("prod")));
        let id = r.get(key::ID).and_then(Value::as_object).unwrap();
        assert_eq!(id.get(key::NODE), Some(&Value::from("node-1")));
        assert_eq!(id.get(key::CLUSTER), Some(&Value::from("c1")));
        assert!(!id.contains_key(key::STRIPE));
        assert!(!r.contains_key(key::NODE));
    }

    #[test]
    fn empty_identity_values_are_still_written() {
        let identity = StaticIdentity::new().with(IdentityKey::EnvName, "").with(IdentityKey::Node, "");
        let enricher = Enricher::new(config(), Arc::new(identity)).unwrap();

        let r = enricher.enrich(&LogEvent::new("INFO", "app", "hi"), Record::new());

        assert_eq!(r.get(key::ENVNAME), Some(&Value::from("")));
        let id = r.get(key::ID).and_then(Value::as_object).unwrap();
        assert_eq!(id.get(key::NODE), Some(&Value::from("")));
    }

    #[test]
    fn missing_product_fails_construction() {
        let cfg = EnricherConfig { product: None, ..config() };
        let err = Enricher::new(cfg, Arc::new(NoIdentity)).err();
        assert_eq!(err, Some(LayoutError::MissingConfiguration("product")));
    }

    #[test]
    fn missing_file_fails_construction() {
        let cfg = EnricherConfig { file: None, ..config() };
        let err = Enricher::new(cfg, Arc::new(NoIdentity)).err();
        assert_eq!(err, Some(LayoutError::MissingConfiguration("file")));
    }
}
