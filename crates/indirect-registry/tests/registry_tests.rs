use indirect_registry::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn id(n: u64) -> TargetIdentity {
    TargetIdentity::new("tests, Version=1.0.0.0, Culture=neutral, PublicKeyToken=null", n)
}

#[derive(Debug, PartialEq)]
struct Tag(&'static str);

fn tag_of(registry: &OverrideRegistry, identity: &TargetIdentity) -> Option<&'static str> {
    registry
        .lookup_typed::<Tag>(identity)
        .unwrap()
        .map(|tag| tag.0)
}

#[test]
fn install_then_lookup_returns_delegate() {
    let registry = OverrideRegistry::new();
    let delegate = Delegate::new(Tag("a"));

    let _handle = registry.install(id(1), delegate.clone()).unwrap();

    let found = registry.lookup(&id(1)).unwrap();
    assert!(found.ptr_eq(&delegate));
}

#[test]
fn lookup_without_install_is_none() {
    let registry = OverrideRegistry::new();
    assert!(registry.lookup(&id(1)).is_none());
    assert!(registry.lookup_typed::<Tag>(&id(1)).unwrap().is_none());
}

#[test]
fn lifo_restores_previous_then_none() {
    let registry = OverrideRegistry::new();
    let h1 = registry.install(id(1), Delegate::new(Tag("d1"))).unwrap();
    let h2 = registry.install(id(1), Delegate::new(Tag("d2"))).unwrap();
    assert_eq!(tag_of(&registry, &id(1)), Some("d2"));

    registry.uninstall(&h2).unwrap();
    assert_eq!(tag_of(&registry, &id(1)), Some("d1"));

    registry.uninstall(&h1).unwrap();
    assert_eq!(tag_of(&registry, &id(1)), None);
    assert!(!registry.contains(&id(1)));
    assert!(registry.is_empty());
}

#[test]
fn install_on_one_identity_does_not_affect_another() {
    let registry = OverrideRegistry::new();
    let _h = registry.install(id(1), Delegate::new(Tag("x"))).unwrap();

    assert!(registry.lookup(&id(2)).is_none());
    assert!(registry
        .lookup(&TargetIdentity::new("other-module", 1))
        .is_none());
}

#[test]
fn reset_all_clears_everything() {
    let registry = OverrideRegistry::new();
    for n in 0..5 {
        let _h = registry.install(id(n), Delegate::new(Tag("x"))).unwrap();
    }
    let _nested = registry.install(id(0), Delegate::new(Tag("y"))).unwrap();

    assert_eq!(registry.reset_all(), 5);
    for n in 0..5 {
        assert!(registry.lookup(&id(n)).is_none());
    }
    assert_eq!(registry.len(), 0);
}

#[test]
fn reset_all_on_empty_registry_is_noop() {
    let registry = OverrideRegistry::new();
    assert_eq!(registry.reset_all(), 0);
    assert_eq!(registry.reset_all(), 0);
}

#[test]
fn uninstall_buried_entry_is_scope_violation_and_keeps_stack() {
    let registry = OverrideRegistry::new();
    let h1 = registry.install(id(1), Delegate::new(Tag("d1"))).unwrap();
    let h2 = registry.install(id(1), Delegate::new(Tag("d2"))).unwrap();

    let err = registry.uninstall(&h1).unwrap_err();
    assert!(err.is_scope_violation());
    assert_eq!(
        err,
        RegistryError::ScopeViolation {
            identity: id(1),
            attempted: h1.seq(),
            top: h2.seq(),
        }
    );

    assert_eq!(registry.depth(&id(1)), 2);
    assert_eq!(tag_of(&registry, &id(1)), Some("d2"));

    // Proper order still works afterwards
    registry.uninstall(&h2).unwrap();
    registry.uninstall(&h1).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn uninstall_twice_is_stale() {
    let registry = OverrideRegistry::new();
    let h = registry.install(id(1), Delegate::new(Tag("d"))).unwrap();
    registry.uninstall(&h).unwrap();

    assert!(matches!(
        registry.uninstall(&h),
        Err(RegistryError::StaleHandle { .. })
    ));
}

#[test]
fn handles_become_stale_after_reset() {
    let registry = OverrideRegistry::new();
    let old = registry.install(id(1), Delegate::new(Tag("old"))).unwrap();
    registry.reset_all();
    let _new = registry.install(id(1), Delegate::new(Tag("new"))).unwrap();

    assert!(matches!(
        registry.uninstall(&old),
        Err(RegistryError::StaleHandle { .. })
    ));
    assert_eq!(tag_of(&registry, &id(1)), Some("new"));
}

#[test]
fn handle_from_other_registry_is_stale() {
    let a = OverrideRegistry::new();
    let b = OverrideRegistry::new();
    let h = a.install(id(1), Delegate::new(Tag("a"))).unwrap();
    let _hb = b.install(id(1), Delegate::new(Tag("b"))).unwrap();
    let _hb2 = b.install(id(1), Delegate::new(Tag("b2"))).unwrap();

    // Sequence numbers are per registry; `h.seq()` (1) names b's buried entry
    // so this surfaces as a scope violation rather than silently succeeding.
    assert!(b.uninstall(&h).is_err());
    assert_eq!(b.depth(&id(1)), 2);
}

#[test]
fn strict_signatures_reject_mixed_delegate_types() {
    let registry = OverrideRegistry::new();
    let _h = registry.install(id(1), Delegate::new(Tag("a"))).unwrap();

    let err = registry.install(id(1), Delegate::new(42_u32)).unwrap_err();
    assert!(matches!(err, RegistryError::IdentityConflict { .. }));
    assert_eq!(registry.depth(&id(1)), 1);
}

#[test]
fn lenient_signatures_allow_mixed_types_but_typed_lookup_reports_conflict() {
    let registry =
        OverrideRegistry::with_config(RegistryConfig::new().with_strict_signatures(false));
    let _h1 = registry.install(id(1), Delegate::new(Tag("a"))).unwrap();
    let _h2 = registry.install(id(1), Delegate::new(42_u32)).unwrap();

    assert_eq!(*registry.lookup_typed::<u32>(&id(1)).unwrap().unwrap(), 42);
    assert!(matches!(
        registry.lookup_typed::<Tag>(&id(1)),
        Err(RegistryError::IdentityConflict { .. })
    ));
}

#[test]
fn sequence_numbers_increase() {
    let registry = OverrideRegistry::new();
    let a = registry.install(id(1), Delegate::new(Tag("a"))).unwrap();
    let b = registry.install(id(2), Delegate::new(Tag("b"))).unwrap();
    let c = registry.install(id(1), Delegate::new(Tag("c"))).unwrap();
    assert!(a.seq() < b.seq());
    assert!(b.seq() < c.seq());
    assert_eq!(c.identity(), &id(1));
}

#[test]
fn snapshot_lists_active_identities_in_order() {
    let registry = OverrideRegistry::new();
    let _a = registry.install(id(7), Delegate::new(Tag("a"))).unwrap();
    let _b = registry.install(id(3), Delegate::new(Tag("b"))).unwrap();
    let _c = registry.install(id(3), Delegate::new(Tag("c"))).unwrap();

    let snapshot = registry.snapshot();
    let summary: Vec<(u64, usize)> = snapshot.entries.iter().map(|e| (e.token, e.depth)).collect();
    assert_eq!(summary, vec![(3, 2), (7, 1)]);
    assert!(snapshot.entries[0].delegate.ends_with("Tag"));

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["entries"][1]["token"], 7);
}

#[test]
fn sharded_registry_behaves_the_same() {
    let registry = OverrideRegistry::with_config(
        RegistryConfig::new()
            .with_shard_amount(3)
            .with_initial_capacity(4),
    );
    let h = registry.install(id(1), Delegate::new(Tag("a"))).unwrap();
    assert_eq!(tag_of(&registry, &id(1)), Some("a"));
    registry.uninstall(&h).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn deserialized_oversized_shard_amount_still_builds() {
    let config: RegistryConfig =
        serde_json::from_str(r#"{"shard_amount": 18446744073709551615}"#).unwrap();
    assert_eq!(config.effective_shard_amount(), Some(MAX_SHARD_AMOUNT));

    let registry = OverrideRegistry::with_config(config);
    let h = registry.install(id(1), Delegate::new(Tag("a"))).unwrap();
    assert_eq!(tag_of(&registry, &id(1)), Some("a"));
    registry.uninstall(&h).unwrap();
}

#[test]
fn drain_reports_exactly_what_it_removed() {
    let registry = OverrideRegistry::new();
    let _a = registry.install(id(9), Delegate::new(Tag("a"))).unwrap();
    let _b = registry.install(id(2), Delegate::new(Tag("b"))).unwrap();
    let _c = registry.install(id(2), Delegate::new(Tag("c"))).unwrap();

    let drained = registry.drain();
    let summary: Vec<(u64, usize)> = drained.entries.iter().map(|e| (e.token, e.depth)).collect();
    assert_eq!(summary, vec![(2, 2), (9, 1)]);
    assert!(registry.is_empty());
    assert!(registry.drain().is_empty());
}

#[derive(Debug, Clone)]
enum Op {
    Install(u64),
    UninstallTop(u64),
    Reset,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u64..4).prop_map(Op::Install),
        3 => (0u64..4).prop_map(Op::UninstallTop),
        1 => Just(Op::Reset),
    ]
}

proptest! {
    /// The registry matches a per-identity stack model under any op sequence.
    #[test]
    fn prop_registry_matches_stack_model(ops in proptest::collection::vec(op_strategy(), 0..80)) {
        let registry = OverrideRegistry::new();
        let mut model: std::collections::HashMap<u64, Vec<(OverrideHandle, u64)>> =
            std::collections::HashMap::new();
        let mut counter = 0u64;

        for op in ops {
            match op {
                Op::Install(n) => {
                    counter += 1;
                    let handle = registry.install(id(n), Delegate::new(counter)).unwrap();
                    model.entry(n).or_default().push((handle, counter));
                }
                Op::UninstallTop(n) => {
                    if let Some((handle, _)) = model.get_mut(&n).and_then(Vec::pop) {
                        prop_assert!(registry.uninstall(&handle).is_ok());
                    }
                }
                Op::Reset => {
                    registry.reset_all();
                    model.clear();
                }
            }

            for n in 0..4 {
                let expected = model.get(&n).and_then(|s| s.last()).map(|(_, v)| *v);
                let actual = registry.lookup_typed::<u64>(&id(n)).unwrap().map(|v| *v);
                prop_assert_eq!(actual, expected);
                prop_assert_eq!(registry.depth(&id(n)), model.get(&n).map_or(0, Vec::len));
            }
        }
    }

    /// Uninstalling any non-top entry is rejected and changes nothing.
    #[test]
    fn prop_non_top_uninstall_rejected(depth in 2usize..8, pick in 0usize..7) {
        let registry = OverrideRegistry::new();
        let handles: Vec<OverrideHandle> = (0..depth)
            .map(|i| registry.install(id(0), Delegate::new(i)).unwrap())
            .collect();
        let victim = &handles[pick % (depth - 1)];

        let err = registry.uninstall(victim).unwrap_err();
        prop_assert!(err.is_scope_violation());
        prop_assert_eq!(registry.depth(&id(0)), depth);
        prop_assert_eq!(*registry.lookup_typed::<usize>(&id(0)).unwrap().unwrap(), depth - 1);
    }
}
