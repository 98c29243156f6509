// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orchestrates one inheritance computation: closure, root-first traversal,
//! merge, result collection.

use std::collections::BTreeMap;

use fonds_core::{UnitId, UnitProjection};
use fonds_store::UnitStore;
use tokio::time::timeout;
use tracing::debug;

use crate::config::ComputeConfig;
use crate::error::ComputeError;
use crate::graph::build_closure;
use crate::merge::{resolve, seed};
use crate::ruleset::InheritedRuleSet;

/// Compute the effective rule set for each of the given target units.
///
/// The targets arrive pre-fetched from the store, carrying their
/// denormalized ancestor id lists. The whole closure is resolved, every
/// node is computed exactly once in topological root-first order, and the
/// returned map is restricted to the requested ids. Identical inputs yield
/// an identical map whose serialization is byte-identical.
///
/// With a configured deadline the computation fails outright on expiry; a
/// partially merged rule set is never returned.
pub async fn compute_inherited_rules<S>(
    targets: &[UnitProjection],
    store: &S,
    config: &ComputeConfig,
) -> Result<BTreeMap<UnitId, InheritedRuleSet>, ComputeError>
where
    S: UnitStore,
{
    match config.deadline {
        Some(limit) => timeout(limit, compute(targets, store, config))
            .await
            .map_err(|_| ComputeError::DeadlineExceeded)?,
        None => compute(targets, store, config).await,
    }
}

async fn compute<S>(
    targets: &[UnitProjection],
    store: &S,
    config: &ComputeConfig,
) -> Result<BTreeMap<UnitId, InheritedRuleSet>, ComputeError>
where
    S: UnitStore,
{
    let graph = build_closure(targets, store, config).await?;
    let order = graph.topological_order()?;

    // Memoized per node index; the topological order guarantees every
    // parent is computed before its children.
    let mut computed: Vec<Option<InheritedRuleSet>> = vec![None; graph.len()];
    for idx in order {
        let node = graph.node(idx);
        let set = if node.parents.is_empty() {
            seed(&node.unit)?
        } else {
            let parent_sets = node
                .parents
                .iter()
                .map(|&parent| {
                    computed[parent].as_ref().ok_or_else(|| {
                        ComputeError::CyclicHierarchy(graph.node(parent).unit.id.clone())
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            resolve(&node.unit, parent_sets)?
        };
        computed[idx] = Some(set);
    }

    let mut results = BTreeMap::new();
    for target in targets {
        if let Some(set) = graph.get(&target.id).and_then(|idx| computed[idx].clone()) {
            results.insert(target.id.clone(), set);
        }
    }

    debug!(
        targets = targets.len(),
        nodes = graph.len(),
        "computed inherited rule sets"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::Duration;

    use fonds_core::{RuleCategory, RuleId};
    use fonds_store::{StoreError, UnitStore};
    use rand::SeedableRng;
    use rand::seq::SliceRandom;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::test_utils::{block_category, rule, rule_with_exclusion, setup_logging, store_with};

    fn unit_id(id: &str) -> UnitId {
        UnitId::from(id)
    }

    fn path(ids: &[&str]) -> Vec<UnitId> {
        ids.iter().map(|id| UnitId::from(*id)).collect()
    }

    #[tokio::test]
    async fn diamond_convergence_yields_one_origin_with_both_paths() {
        setup_logging();

        // R declares X; A and B both descend from R; C descends from both.
        let root = UnitProjection::new("R").with_rule(RuleCategory::Storage, rule("STO-X"));
        let a = UnitProjection::new("A").with_parent(&root);
        let b = UnitProjection::new("B").with_parent(&root);
        let c = UnitProjection::new("C").with_parent(&a).with_parent(&b);

        let store = store_with(&[root, a, b, c.clone()]);
        let results = compute_inherited_rules(&[c], &store, &ComputeConfig::default())
            .await
            .unwrap();

        let set = &results[&unit_id("C")];
        let origins = set
            .origins(RuleCategory::Storage, &RuleId::from("STO-X"))
            .unwrap();
        assert_eq!(origins.len(), 1);

        let entry = &origins[&unit_id("R")];
        assert_eq!(
            entry.paths,
            BTreeSet::from([path(&["R", "A", "C"]), path(&["R", "B", "C"])])
        );
    }

    #[tokio::test]
    async fn storage_rule_scenario() {
        setup_logging();

        // R declares STO-01. A inherits it untouched; B redeclares it with a
        // self-exclusion, which is ignored, leaving B's own declaration.
        let root = UnitProjection::new("R").with_rule(RuleCategory::Storage, rule("STO-01"));
        let a = UnitProjection::new("A").with_parent(&root);
        let b = UnitProjection::new("B").with_parent(&root).with_rule(
            RuleCategory::Storage,
            rule_with_exclusion("STO-01", "STO-01"),
        );

        let store = store_with(&[root, a.clone(), b.clone()]);
        let results = compute_inherited_rules(&[a, b], &store, &ComputeConfig::default())
            .await
            .unwrap();

        let a_origins = results[&unit_id("A")]
            .origins(RuleCategory::Storage, &RuleId::from("STO-01"))
            .unwrap();
        assert_eq!(a_origins.len(), 1);
        assert!(a_origins.contains_key(&unit_id("R")));

        let b_origins = results[&unit_id("B")]
            .origins(RuleCategory::Storage, &RuleId::from("STO-01"))
            .unwrap();
        assert_eq!(b_origins.len(), 1);
        assert!(b_origins.contains_key(&unit_id("B")));
    }

    #[tokio::test]
    async fn appraisal_kill_switch_scenario() {
        setup_logging();

        // R declares STO-01 and APP-01. X declares STO-02 and blocks the
        // whole Appraisal category: X keeps both storage rules and no
        // appraisal entry at all.
        let root = UnitProjection::new("R")
            .with_rule(RuleCategory::Storage, rule("STO-01"))
            .with_rule(RuleCategory::Appraisal, rule("APP-01"));
        let x = UnitProjection::new("X")
            .with_parent(&root)
            .with_rule(RuleCategory::Storage, rule("STO-02"))
            .with_rule(RuleCategory::Appraisal, block_category());

        let store = store_with(&[root, x.clone()]);
        let results = compute_inherited_rules(&[x], &store, &ComputeConfig::default())
            .await
            .unwrap();

        let set = &results[&unit_id("X")];
        let sto_01 = set
            .origins(RuleCategory::Storage, &RuleId::from("STO-01"))
            .unwrap();
        assert!(sto_01.contains_key(&unit_id("R")));
        let sto_02 = set
            .origins(RuleCategory::Storage, &RuleId::from("STO-02"))
            .unwrap();
        assert!(sto_02.contains_key(&unit_id("X")));
        assert!(set.rules(RuleCategory::Appraisal).is_none());
    }

    #[tokio::test]
    async fn override_on_one_branch_leaves_the_other_branch_intact() {
        setup_logging();

        // A overrides R's rule on its branch; B does not. At the
        // convergence point C both effective lines are visible, each with
        // its own origin and path.
        let root = UnitProjection::new("R").with_rule(RuleCategory::Access, rule("ACC-01"));
        let a = UnitProjection::new("A")
            .with_parent(&root)
            .with_rule(RuleCategory::Access, rule("ACC-01"));
        let b = UnitProjection::new("B").with_parent(&root);
        let c = UnitProjection::new("C").with_parent(&a).with_parent(&b);

        let store = store_with(&[root, a, b, c.clone()]);
        let results = compute_inherited_rules(&[c], &store, &ComputeConfig::default())
            .await
            .unwrap();

        let origins = results[&unit_id("C")]
            .origins(RuleCategory::Access, &RuleId::from("ACC-01"))
            .unwrap();
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[&unit_id("A")].paths, BTreeSet::from([path(&["A", "C"])]));
        assert_eq!(
            origins[&unit_id("R")].paths,
            BTreeSet::from([path(&["R", "B", "C"])])
        );
    }

    #[tokio::test]
    async fn parent_order_does_not_change_the_result() {
        setup_logging();

        // A unit with four parents carrying overlapping declarations; any
        // permutation of the parent list must produce the same set.
        let root = UnitProjection::new("R")
            .with_rule(RuleCategory::Storage, rule("STO-01"))
            .with_rule(RuleCategory::Access, rule("ACC-01"));
        let p1 = UnitProjection::new("P1").with_parent(&root);
        let p2 = UnitProjection::new("P2")
            .with_parent(&root)
            .with_rule(RuleCategory::Storage, rule("STO-01"));
        let p3 = UnitProjection::new("P3")
            .with_parent(&root)
            .with_rule(RuleCategory::Access, block_category());
        let p4 = UnitProjection::new("P4")
            .with_parent(&root)
            .with_rule(RuleCategory::Storage, rule("STO-02"));

        let child = UnitProjection::new("C")
            .with_parent(&p1)
            .with_parent(&p2)
            .with_parent(&p3)
            .with_parent(&p4)
            .with_rule(RuleCategory::Storage, rule("STO-03"));

        let units = [root, p1, p2, p3, p4];
        let store = store_with(&units);

        let mut baseline_store = store.clone();
        baseline_store.insert_unit(child.clone());
        let baseline =
            compute_inherited_rules(&[child.clone()], &baseline_store, &ComputeConfig::default())
                .await
                .unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..16 {
            let mut shuffled = child.clone();
            shuffled.direct_parent_ids.shuffle(&mut rng);

            let mut store = store.clone();
            store.insert_unit(shuffled.clone());
            let results =
                compute_inherited_rules(&[shuffled], &store, &ComputeConfig::default())
                    .await
                    .unwrap();

            assert_eq!(results[&unit_id("C")], baseline[&unit_id("C")]);
        }
    }

    #[tokio::test]
    async fn recomputation_is_byte_identical() {
        setup_logging();

        let root = UnitProjection::new("R")
            .with_rule(RuleCategory::Storage, rule("STO-01"))
            .with_rule(RuleCategory::Appraisal, rule("APP-01"));
        let a = UnitProjection::new("A").with_parent(&root);
        let b = UnitProjection::new("B").with_parent(&root);
        let c = UnitProjection::new("C")
            .with_parent(&a)
            .with_parent(&b)
            .with_rule(RuleCategory::Appraisal, rule("APP-02"));

        let store = store_with(&[root, a, b, c.clone()]);
        let config = ComputeConfig::default();

        let first = compute_inherited_rules(&[c.clone()], &store, &config)
            .await
            .unwrap();
        let second = compute_inherited_rules(&[c], &store, &config).await.unwrap();

        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn results_are_restricted_to_the_targets() {
        setup_logging();

        let root = UnitProjection::new("R").with_rule(RuleCategory::Storage, rule("STO-01"));
        let a = UnitProjection::new("A").with_parent(&root);

        let store = store_with(&[root, a.clone()]);
        let results = compute_inherited_rules(&[a], &store, &ComputeConfig::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results.contains_key(&unit_id("A")));
        assert!(!results.contains_key(&unit_id("R")));
    }

    struct FailingStore;

    impl UnitStore for FailingStore {
        async fn units_by_ids(
            &self,
            _ids: &[UnitId],
        ) -> Result<Vec<UnitProjection>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_retryable_fault() {
        setup_logging();

        let mut target = UnitProjection::new("C");
        target.direct_parent_ids = vec![unit_id("R")];
        target.denormalized_ancestor_ids = vec![unit_id("R")];

        let result =
            compute_inherited_rules(&[target], &FailingStore, &ComputeConfig::default()).await;

        match result {
            Err(fault @ ComputeError::Store(_)) => assert!(fault.is_retryable()),
            other => panic!("expected Store fault, got {other:?}"),
        }
    }

    struct SlowStore;

    impl UnitStore for SlowStore {
        async fn units_by_ids(
            &self,
            ids: &[UnitId],
        ) -> Result<Vec<UnitProjection>, StoreError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ids.iter().map(|id| UnitProjection::new(id.clone())).collect())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expiry_fails_the_whole_request() {
        setup_logging();

        let mut target = UnitProjection::new("C");
        target.direct_parent_ids = vec![unit_id("R")];
        target.denormalized_ancestor_ids = vec![unit_id("R")];

        let config = ComputeConfig {
            deadline: Some(Duration::from_secs(1)),
            ..Default::default()
        };
        let result = compute_inherited_rules(&[target], &SlowStore, &config).await;

        match result {
            Err(fault @ ComputeError::DeadlineExceeded) => assert!(fault.is_retryable()),
            other => panic!("expected DeadlineExceeded, got {other:?}"),
        }
    }
}
