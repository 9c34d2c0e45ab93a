//! Cross-module routing properties

use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Barrier};
use std::thread;

use crate::*;

fn router_with(replicas: &[&str], policy: SelectionPolicy) -> Router {
    let config = replicas.iter().fold(
        RoutingConfig::new(DataSourceConfig::new("primary", "postgres://main/app")).with_policy(policy),
        |config, name| config.with_replica(DataSourceConfig::new(*name, format!("postgres://{}/app", name))),
    );
    Router::from_config(&config).unwrap()
}

#[test]
fn test_default_safety() {
    for policy in [SelectionPolicy::Random, SelectionPolicy::RoundRobin] {
        let router = router_with(&["r1", "r2"], policy);
        for _ in 0..20 {
            assert_eq!(router.resolve(&RouteContext::new()).unwrap(), TargetKey::Primary);
        }
    }
}

#[test]
fn test_read_intent_never_primary() {
    for policy in [SelectionPolicy::Random, SelectionPolicy::RoundRobin] {
        for replicas in [&["r1"][..], &["r1", "r2"][..], &["r1", "r2", "r3", "r4", "r5"][..]] {
            let router = router_with(replicas, policy);
            let ctx = RouteContext::with_intent(RouteIntent::Read);
            for _ in 0..100 {
                assert!(router.resolve(&ctx).unwrap().is_replica());
            }
        }
    }
}

#[test]
fn test_round_robin_fairness() {
    for replica_count in 1..=5usize {
        let names: Vec<String> = (1..=replica_count).map(|i| format!("r{}", i)).collect();
        let replicas: Vec<TargetKey> = names.iter().map(TargetKey::replica).collect();

        for picks in [replica_count * 7, replica_count * 7 + 2] {
            let selector = ReplicaSelector::new(SelectionPolicy::RoundRobin);
            let mut counts: HashMap<TargetKey, usize> = HashMap::new();
            for _ in 0..picks {
                *counts.entry(selector.pick(&replicas).unwrap()).or_insert(0) += 1;
            }

            let expected = picks / replica_count;
            for replica in &replicas {
                let count = counts.get(replica).copied().unwrap_or(0);
                if picks % replica_count == 0 {
                    assert_eq!(count, expected, "replica {} in {} picks", replica, picks);
                } else {
                    assert!(
                        count == expected || count == expected + 1,
                        "replica {} got {} of {} picks",
                        replica,
                        count,
                        picks
                    );
                }
            }
        }
    }
}

#[test]
fn test_concurrent_units_are_isolated() {
    const UNITS: usize = 16;
    let router = Arc::new(router_with(&["r1", "r2", "r3"], SelectionPolicy::RoundRobin));
    let barrier = Arc::new(Barrier::new(UNITS));

    let handles: Vec<_> = (0..UNITS)
        .map(|_| {
            let router = Arc::clone(&router);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                let mut ctx = RouteContext::new();
                for _ in 0..200 {
                    let intent = RouteIntent::from_read_only(rng.gen_bool(0.5));
                    ctx.set(intent);
                    barrier.wait();

                    assert_eq!(ctx.get(), Some(intent));
                    let target = router.resolve(&ctx).unwrap();
                    assert_eq!(target.is_replica(), intent.is_read());
                    barrier.wait();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_override_restore_preserves_resolution() {
    let router = router_with(&["r1"], SelectionPolicy::RoundRobin);

    for prior in [None, Some(RouteIntent::Read), Some(RouteIntent::Write)] {
        for forced in [RouteIntent::Read, RouteIntent::Write] {
            let mut ctx = RouteContext::new();
            if let Some(intent) = prior {
                ctx.set(intent);
            }
            let before = router.resolve(&ctx).unwrap();

            let previous = ctx.override_route(forced);
            assert_eq!(router.resolve(&ctx).unwrap().is_replica(), forced.is_read());
            ctx.restore_route(previous);

            // Single replica, so resolution is deterministic for both intents
            assert_eq!(router.resolve(&ctx).unwrap(), before);
            assert_eq!(ctx.get(), prior);
        }
    }
}

#[test]
fn test_write_override_read_restore_write() {
    let router = router_with(&["r1", "r2"], SelectionPolicy::RoundRobin);
    let mut ctx = RouteContext::with_intent(RouteIntent::Write);

    let previous = ctx.override_route(RouteIntent::Read);
    assert!(router.resolve(&ctx).unwrap().is_replica());
    ctx.restore_route(previous);

    assert_eq!(previous, Some(RouteIntent::Write));
    assert_eq!(router.resolve(&ctx).unwrap(), TargetKey::Primary);
}

#[test]
fn test_counter_overflow_safety() {
    const THREADS: usize = 8;
    const PICKS_PER_THREAD: usize = 125;

    let selector = Arc::new(ReplicaSelector::round_robin_starting_at(u64::MAX - 1));
    let replicas: Arc<Vec<TargetKey>> = Arc::new(vec![
        TargetKey::replica("r1"),
        TargetKey::replica("r2"),
        TargetKey::replica("r3"),
    ]);

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let selector = Arc::clone(&selector);
            let replicas = Arc::clone(&replicas);
            thread::spawn(move || {
                (0..PICKS_PER_THREAD)
                    .map(|_| selector.pick(&replicas).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut total = 0;
    for handle in handles {
        let picked = handle.join().expect("selector thread panicked");
        assert!(picked.iter().all(|target| replicas.contains(target)));
        total += picked.len();
    }
    assert_eq!(total, THREADS * PICKS_PER_THREAD);
}

#[test]
fn test_read_without_replicas_is_configuration_error() {
    let router = router_with(&[], SelectionPolicy::Random);
    let mut ctx = RouteContext::new();

    let result = ctx.in_unit_of_work(true, |ctx| router.resolve(ctx));
    assert!(matches!(result, Err(RouteError::Configuration(_))));
    // Writes still work against a primary-only registry
    let result = ctx.in_unit_of_work(false, |ctx| router.resolve(ctx));
    assert_eq!(result, Ok(TargetKey::Primary));
}
