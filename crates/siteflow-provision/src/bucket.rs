//! Bucket provisioning
//!
//! Creates a bucket that does not exist yet, forces a private ACL, attaches a
//! bucket policy rendered from a template and enables static web hosting.
//! Every step gates the next one; nothing is rolled back on failure.

use crate::accepted;
use crate::error::{ProvisionError, Result};
use crate::report::{AclChange, BucketOutcome};
use serde::{Deserialize, Serialize};
use siteflow_cloud::{CannedAcl, CloudError, ResourceClient, WebsiteConfig};

/// Token replaced with the bucket name when rendering a policy template
pub const POLICY_PLACEHOLDER: &str = "{bucket_name}";

pub const DEFAULT_INDEX_DOCUMENT: &str = "index.html";
pub const DEFAULT_ERROR_DOCUMENT: &str = "error.html";

/// Desired bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketSpec {
    pub name: String,
    pub region: String,
    pub index_document: String,
    pub error_document: String,
    /// JSON policy containing [`POLICY_PLACEHOLDER`]
    pub policy_template: String,
}

impl BucketSpec {
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        policy_template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            index_document: DEFAULT_INDEX_DOCUMENT.to_string(),
            error_document: DEFAULT_ERROR_DOCUMENT.to_string(),
            policy_template: policy_template.into(),
        }
    }

    pub fn with_documents(
        mut self,
        index_document: impl Into<String>,
        error_document: impl Into<String>,
    ) -> Self {
        self.index_document = index_document.into();
        self.error_document = error_document.into();
        self
    }
}

/// Substitute every placeholder occurrence with the bucket name
pub fn render_policy(template: &str, bucket: &str) -> String {
    template.replace(POLICY_PLACEHOLDER, bucket)
}

pub struct BucketProvisioner<'a> {
    client: &'a dyn ResourceClient,
}

impl<'a> BucketProvisioner<'a> {
    pub fn new(client: &'a dyn ResourceClient) -> Self {
        Self { client }
    }

    /// Whether the bucket exists. Only a not-found answer means `false`;
    /// any other probe failure is surfaced.
    pub async fn exists(&self, name: &str) -> Result<bool> {
        let probe_error = |source| ProvisionError::BucketProbe {
            bucket: name.to_string(),
            source,
        };

        match self.client.head_bucket(name).await {
            Ok(response) if response.is_success() => Ok(true),
            Ok(response) if response.status == 404 => Ok(false),
            Ok(response) => Err(probe_error(CloudError::service(
                response.status,
                format!("HTTP{}", response.status),
                "bucket probe failed",
            ))),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(probe_error(e)),
        }
    }

    /// Create the bucket and bring it into the hosted state
    pub async fn create(&self, spec: &BucketSpec) -> Result<BucketOutcome> {
        if self.exists(&spec.name).await? {
            tracing::error!("Bucket {} already exists, refusing to reuse it", spec.name);
            return Err(ProvisionError::AlreadyExists(spec.name.clone()));
        }

        tracing::info!("Creating bucket {} in {}", spec.name, spec.region);
        accepted(self.client.create_bucket(&spec.name, &spec.region).await).map_err(
            |source| {
                if source.is_already_exists() {
                    ProvisionError::AlreadyExists(spec.name.clone())
                } else {
                    ProvisionError::BucketCreation {
                        bucket: spec.name.clone(),
                        source,
                    }
                }
            },
        )?;

        let acl = self.ensure_private_acl(&spec.name).await?;
        let policy = self.apply_policy(&spec.name, &spec.policy_template).await?;
        self.enable_website_hosting(&spec.name, &spec.index_document, &spec.error_document)
            .await?;

        Ok(BucketOutcome {
            bucket: spec.name.clone(),
            acl,
            policy,
        })
    }

    /// Reset the ACL to private unless it already is
    pub async fn ensure_private_acl(&self, name: &str) -> Result<AclChange> {
        let acl_error = |source| ProvisionError::Acl {
            bucket: name.to_string(),
            source,
        };

        let acl = accepted(self.client.get_bucket_acl(name).await).map_err(acl_error)?;
        if acl.owner.is_empty() || acl.grants.is_empty() {
            return Err(acl_error(CloudError::MalformedResponse(format!(
                "ACL of bucket {} is missing its owner or grants",
                name
            ))));
        }

        if acl.is_private() {
            tracing::info!("Bucket {} ACL is already private", name);
            return Ok(AclChange::Unchanged);
        }

        tracing::debug!("Bucket {} has {} grant(s), resetting", name, acl.grants.len());
        accepted(self.client.set_bucket_acl(name, CannedAcl::Private).await)
            .map_err(acl_error)?;
        tracing::info!("Bucket {} ACL set to private", name);

        match self.is_private(name).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!("Bucket {} ACL is still not private after reset", name),
            Err(e) => tracing::warn!("Could not verify ACL of bucket {}: {}", name, e),
        }

        Ok(AclChange::MadePrivate)
    }

    /// Read the ACL and check it against the private definition
    pub async fn is_private(&self, name: &str) -> Result<bool> {
        let acl = accepted(self.client.get_bucket_acl(name).await).map_err(|source| {
            ProvisionError::Acl {
                bucket: name.to_string(),
                source,
            }
        })?;
        Ok(acl.is_private())
    }

    /// Render the policy template for `name` and attach it.
    /// Returns the submitted policy document.
    pub async fn apply_policy(&self, name: &str, template: &str) -> Result<String> {
        let policy_error = |source| ProvisionError::Policy {
            bucket: name.to_string(),
            source,
        };

        let policy = render_policy(template, name);
        serde_json::from_str::<serde_json::Value>(&policy)
            .map_err(|e| policy_error(CloudError::Json(e)))?;

        tracing::debug!("Bucket policy for {}: {}", name, policy);
        accepted(self.client.set_bucket_policy(name, &policy).await).map_err(policy_error)?;
        tracing::info!("Bucket policy applied to {}", name);

        Ok(policy)
    }

    pub async fn enable_website_hosting(
        &self,
        name: &str,
        index_document: &str,
        error_document: &str,
    ) -> Result<()> {
        let website = WebsiteConfig {
            index_document: index_document.to_string(),
            error_document: error_document.to_string(),
        };

        accepted(self.client.set_bucket_website(name, &website).await).map_err(|source| {
            ProvisionError::Hosting {
                bucket: name.to_string(),
                source,
            }
        })?;
        tracing::info!("Bucket {} configured for static web hosting", name);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Step;
    use crate::testing::{MockClient, Reply, public_read_acl};

    const TEMPLATE: &str = r#"{
  "Statement": [
    {
      "Effect": "Allow",
      "Principal": {"ID": ["*"]},
      "Action": ["GetObject"],
      "Resource": ["{bucket_name}/*"]
    },
    {
      "Effect": "Deny",
      "Principal": {"ID": ["*"]},
      "Action": ["DeleteBucket"],
      "Resource": ["{bucket_name}"]
    }
  ]
}"#;

    fn spec(name: &str) -> BucketSpec {
        BucketSpec::new(name, "ap-southeast-1", TEMPLATE)
    }

    #[tokio::test]
    async fn test_create_site_bucket() {
        let client = MockClient::new();
        let provisioner = BucketProvisioner::new(&client);

        let outcome = provisioner.create(&spec("site-1")).await.unwrap();

        assert_eq!(outcome.bucket, "site-1");
        assert_eq!(outcome.acl, AclChange::Unchanged);
        assert_eq!(client.count("set_bucket_acl"), 0);

        let state = client.state();
        assert_eq!(state.policies.len(), 1);
        assert!(state.policies[0].contains("site-1"));
        assert!(!state.policies[0].contains(POLICY_PLACEHOLDER));
        assert_eq!(
            state.websites,
            vec![WebsiteConfig {
                index_document: "index.html".to_string(),
                error_document: "error.html".to_string(),
            }]
        );
        assert_eq!(
            state.calls,
            vec![
                "head_bucket",
                "create_bucket",
                "get_bucket_acl",
                "set_bucket_policy",
                "set_bucket_website"
            ]
        );
    }

    #[tokio::test]
    async fn test_existing_bucket_is_not_created() {
        let client = MockClient::with(|s| {
            s.buckets.insert("site-1".to_string());
        });
        let provisioner = BucketProvisioner::new(&client);

        let err = provisioner.create(&spec("site-1")).await.unwrap_err();

        assert!(matches!(err, ProvisionError::AlreadyExists(ref name) if name == "site-1"));
        assert_eq!(client.count("create_bucket"), 0);
        assert_eq!(client.calls(), vec!["head_bucket"]);
    }

    #[tokio::test]
    async fn test_exists_surfaces_probe_errors() {
        let client = MockClient::with(|s| s.head_error = true);
        let provisioner = BucketProvisioner::new(&client);

        let err = provisioner.exists("site-1").await.unwrap_err();
        assert!(matches!(err, ProvisionError::BucketProbe { .. }));
        assert_eq!(err.step(), Step::CheckBucket);

        let err = provisioner.create(&spec("site-1")).await.unwrap_err();
        assert!(matches!(err, ProvisionError::BucketProbe { .. }));
        assert_eq!(client.count("create_bucket"), 0);
    }

    #[tokio::test]
    async fn test_exists_false_for_missing_bucket() {
        let client = MockClient::new();
        let provisioner = BucketProvisioner::new(&client);

        assert!(!provisioner.exists("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_false_for_plain_404_status() {
        let client = MockClient::with(|s| s.head = Some(Reply::Status(404)));
        let provisioner = BucketProvisioner::new(&client);

        assert!(!provisioner.exists("site-1").await.unwrap());

        provisioner.create(&spec("site-1")).await.unwrap();
        assert_eq!(client.count("create_bucket"), 1);
    }

    #[tokio::test]
    async fn test_exists_fails_on_other_status() {
        let client = MockClient::with(|s| s.head = Some(Reply::Status(403)));
        let provisioner = BucketProvisioner::new(&client);

        let err = provisioner.exists("site-1").await.unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::BucketProbe {
                source: CloudError::Service { status: 403, .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_private_acl_is_noop() {
        let client = MockClient::new();
        let provisioner = BucketProvisioner::new(&client);

        let change = provisioner.ensure_private_acl("site-1").await.unwrap();

        assert_eq!(change, AclChange::Unchanged);
        assert_eq!(client.count("set_bucket_acl"), 0);
    }

    #[tokio::test]
    async fn test_non_private_acl_is_reset_once() {
        let client = MockClient::with(|s| s.acl = Some(public_read_acl()));
        let provisioner = BucketProvisioner::new(&client);

        let change = provisioner.ensure_private_acl("site-1").await.unwrap();

        assert_eq!(change, AclChange::MadePrivate);
        assert_eq!(client.count("set_bucket_acl"), 1);
        // Fetch plus verification read
        assert_eq!(client.count("get_bucket_acl"), 2);
    }

    #[tokio::test]
    async fn test_malformed_acl_fails() {
        let client = MockClient::with(|s| s.acl = None);
        let provisioner = BucketProvisioner::new(&client);

        let err = provisioner.ensure_private_acl("site-1").await.unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::Acl {
                source: CloudError::MalformedResponse(_),
                ..
            }
        ));
        assert_eq!(client.count("set_bucket_acl"), 0);
    }

    #[tokio::test]
    async fn test_acl_without_grants_is_malformed() {
        let client = MockClient::with(|s| {
            s.acl = Some(siteflow_cloud::BucketAcl {
                owner: "owner-id".to_string(),
                grants: Vec::new(),
            })
        });
        let provisioner = BucketProvisioner::new(&client);

        let err = provisioner.ensure_private_acl("site-1").await.unwrap_err();
        assert_eq!(err.step(), Step::PrivateAcl);
    }

    #[tokio::test]
    async fn test_acl_without_owner_is_malformed() {
        let client = MockClient::with(|s| {
            let mut acl = crate::testing::private_acl();
            acl.owner.clear();
            s.acl = Some(acl);
        });
        let provisioner = BucketProvisioner::new(&client);

        let err = provisioner.ensure_private_acl("site-1").await.unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::Acl {
                source: CloudError::MalformedResponse(_),
                ..
            }
        ));
        assert_eq!(client.count("set_bucket_acl"), 0);
    }

    #[tokio::test]
    async fn test_acl_fetch_status_failure() {
        let client = MockClient::with(|s| s.acl_fetch = Reply::Status(403));
        let provisioner = BucketProvisioner::new(&client);

        let err = provisioner.ensure_private_acl("site-1").await.unwrap_err();
        match err {
            ProvisionError::Acl { bucket, source } => {
                assert_eq!(bucket, "site-1");
                assert_eq!(source.status(), Some(403));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_step_short_circuits() {
        let client = MockClient::with(|s| s.policy = Reply::Status(400));
        let provisioner = BucketProvisioner::new(&client);

        let err = provisioner.create(&spec("site-1")).await.unwrap_err();

        assert_eq!(err.step(), Step::BucketPolicy);
        assert!(err.to_string().contains("site-1"));
        assert_eq!(client.count("set_bucket_website"), 0);
    }

    #[tokio::test]
    async fn test_create_failure_is_reported() {
        let client = MockClient::with(|s| s.create = Reply::Status(409));
        let provisioner = BucketProvisioner::new(&client);

        let err = provisioner.create(&spec("site-1")).await.unwrap_err();

        assert_eq!(err.step(), Step::CreateBucket);
        assert_eq!(client.count("get_bucket_acl"), 0);
    }

    #[tokio::test]
    async fn test_name_taken_at_create_is_already_exists() {
        let client = MockClient::with(|s| s.create = Reply::Taken);
        let provisioner = BucketProvisioner::new(&client);

        let err = provisioner.create(&spec("site-1")).await.unwrap_err();

        assert!(matches!(err, ProvisionError::AlreadyExists(ref name) if name == "site-1"));
        assert_eq!(client.count("get_bucket_acl"), 0);
    }

    #[tokio::test]
    async fn test_hosting_failure_is_reported() {
        let client = MockClient::with(|s| s.website = Reply::Error);
        let provisioner = BucketProvisioner::new(&client);

        let err = provisioner.create(&spec("site-1")).await.unwrap_err();

        assert!(matches!(err, ProvisionError::Hosting { .. }));
    }

    #[tokio::test]
    async fn test_malformed_policy_is_not_submitted() {
        let client = MockClient::new();
        let provisioner = BucketProvisioner::new(&client);

        let err = provisioner
            .apply_policy("site-1", "{\"Resource\": \"{bucket_name}\"")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProvisionError::Policy {
                source: CloudError::Json(_),
                ..
            }
        ));
        assert_eq!(client.count("set_bucket_policy"), 0);
    }

    #[test]
    fn test_render_policy_replaces_every_placeholder() {
        for name in ["site-1", "a", "my.bucket-name-0123"] {
            let rendered = render_policy(TEMPLATE, name);
            assert!(!rendered.contains(POLICY_PLACEHOLDER));
            assert!(rendered.matches(name).count() >= 2);
        }
    }

    #[test]
    fn test_custom_documents() {
        let spec = spec("site-1").with_documents("home.html", "404.html");
        assert_eq!(spec.index_document, "home.html");
        assert_eq!(spec.error_document, "404.html");
    }
}
