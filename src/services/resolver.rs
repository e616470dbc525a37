//! Version resolution: which test case version runs for each member of a
//! test suite.

use std::collections::HashMap;

use crate::error::{AppError, AppResult};

use super::store::SuiteStore;

/// One resolved `(test case, version)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub test_case_id: i32,
    pub test_case_version_id: i32,
}

/// Resolves exactly one version per suite member.
///
/// Selection per test case: an override entry that names an existing version
/// of that case wins; anything else (no override, or an override id that does
/// not belong to the case) selects the newest version by id. Id order stands
/// in for recency here, not the `version` number column; the two are assigned
/// together and are expected to co-vary.
pub struct VersionResolver<'a, S: SuiteStore> {
    store: &'a S,
}

impl<'a, S: SuiteStore> VersionResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Resolve the suite. Pure read; no side effects.
    ///
    /// Fails with `NotFound` for a missing suite and `EmptySuite` for a
    /// suite with zero members. A member with zero versions is silently
    /// skipped and contributes no pair.
    pub async fn resolve(
        &self,
        test_suite_id: i32,
        version_override: Option<&HashMap<i32, i32>>,
    ) -> AppResult<Vec<ResolvedVersion>> {
        if !self.store.suite_exists(test_suite_id).await? {
            return Err(AppError::NotFound(format!("Test suite {}", test_suite_id)));
        }

        let members = self.store.suite_member_case_ids(test_suite_id).await?;
        if members.is_empty() {
            return Err(AppError::EmptySuite(test_suite_id));
        }

        let mut resolved = Vec::with_capacity(members.len());

        for test_case_id in members {
            let versions = self.store.version_ids_newest_first(test_case_id).await?;
            if versions.is_empty() {
                continue;
            }

            let overridden = version_override
                .and_then(|overrides| overrides.get(&test_case_id))
                .and_then(|wanted| versions.iter().copied().find(|id| id == wanted));

            // An override that matched no version of this case falls through
            // to the newest one.
            let test_case_version_id = overridden.unwrap_or(versions[0]);

            resolved.push(ResolvedVersion {
                test_case_id,
                test_case_version_id,
            });
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::super::store::memory::MemoryStore;
    use super::*;

    fn pairs(resolved: &[ResolvedVersion]) -> Vec<(i32, i32)> {
        resolved
            .iter()
            .map(|r| (r.test_case_id, r.test_case_version_id))
            .collect()
    }

    #[tokio::test]
    async fn test_missing_suite_is_not_found() {
        let store = MemoryStore::new();
        let err = VersionResolver::new(&store).resolve(9, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_suite_is_rejected() {
        let mut store = MemoryStore::new();
        store.add_suite(1, &[]);

        let err = VersionResolver::new(&store).resolve(1, None).await.unwrap_err();
        assert!(matches!(err, AppError::EmptySuite(1)));
    }

    #[tokio::test]
    async fn test_selects_newest_version_and_skips_versionless_members() {
        // Suite S = {T1, T2}; T1 has versions 10 and 11, T2 has none.
        let mut store = MemoryStore::new();
        store.add_suite(1, &[1, 2]);
        store.add_versions(1, &[10, 11]);

        let resolved = VersionResolver::new(&store).resolve(1, None).await.unwrap();
        assert_eq!(pairs(&resolved), vec![(1, 11)]);
    }

    #[tokio::test]
    async fn test_override_selects_named_version() {
        let mut store = MemoryStore::new();
        store.add_suite(1, &[7]);
        store.add_versions(7, &[20, 21, 22]);

        let overrides = HashMap::from([(7, 21)]);
        let resolved = VersionResolver::new(&store)
            .resolve(1, Some(&overrides))
            .await
            .unwrap();
        assert_eq!(pairs(&resolved), vec![(7, 21)]);
    }

    #[tokio::test]
    async fn test_unknown_override_falls_back_to_newest() {
        let mut store = MemoryStore::new();
        store.add_suite(1, &[7]);
        store.add_versions(7, &[20, 21, 22]);

        let overrides = HashMap::from([(7, 999)]);
        let resolved = VersionResolver::new(&store)
            .resolve(1, Some(&overrides))
            .await
            .unwrap();
        assert_eq!(pairs(&resolved), vec![(7, 22)]);
    }

    #[tokio::test]
    async fn test_output_preserves_membership_order() {
        let mut store = MemoryStore::new();
        store.add_suite(1, &[3, 1, 2]);
        store.add_versions(1, &[101]);
        store.add_versions(2, &[102]);
        store.add_versions(3, &[103]);

        let resolved = VersionResolver::new(&store).resolve(1, None).await.unwrap();
        assert_eq!(pairs(&resolved), vec![(3, 103), (1, 101), (2, 102)]);
    }
}
