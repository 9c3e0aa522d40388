use std::collections::BTreeMap;
use testsync_core::config::Config;
use testsync_core::error::VcsError;
use testsync_core::types::IntegrationTarget;

/// Maps integration ids to the repositories they govern.
#[derive(Debug, Clone, Default)]
pub struct IntegrationRegistry {
    targets: BTreeMap<String, IntegrationTarget>,
}

impl IntegrationRegistry {
    pub fn new(targets: BTreeMap<String, IntegrationTarget>) -> Self {
        Self { targets }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.integration_targets())
    }

    pub fn insert(&mut self, integration_id: impl Into<String>, target: IntegrationTarget) {
        self.targets.insert(integration_id.into(), target);
    }

    pub fn resolve(&self, integration_id: &str) -> Result<&IntegrationTarget, VcsError> {
        self.targets
            .get(integration_id)
            .ok_or_else(|| VcsError::UnknownIntegration {
                integration_id: integration_id.to_string(),
            })
    }

    /// Find the repository reported as `owner/repo` by a tree read.
    pub fn resolve_repo(&self, owner: &str, repo: &str) -> Result<&IntegrationTarget, VcsError> {
        self.targets
            .values()
            .find(|target| target.owner == owner && target.repo == repo)
            .ok_or_else(|| VcsError::UnknownRepository {
                owner: owner.to_string(),
                repo: repo.to_string(),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn registry() -> IntegrationRegistry {
        let mut registry = IntegrationRegistry::default();
        registry.insert(
            "int-1",
            IntegrationTarget {
                owner: "qawolf".into(),
                repo: "tests".into(),
                repo_path: PathBuf::from("/srv/git/tests"),
            },
        );
        registry
    }

    #[test]
    fn resolves_by_integration_and_by_repo() {
        let registry = registry();
        assert_eq!(registry.resolve("int-1").unwrap().repo, "tests");
        assert_eq!(
            registry.resolve_repo("qawolf", "tests").unwrap().repo_path,
            PathBuf::from("/srv/git/tests")
        );
    }

    #[test]
    fn unknown_lookups_fail() {
        let registry = registry();
        assert!(matches!(
            registry.resolve("int-2"),
            Err(VcsError::UnknownIntegration { .. })
        ));
        assert!(matches!(
            registry.resolve_repo("qawolf", "other"),
            Err(VcsError::UnknownRepository { .. })
        ));
    }
}
