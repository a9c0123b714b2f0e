//! End-to-end tests exercising the Monitor against a private registry.

use infermon::{ExtraLabels, Metric, Monitor, MonitorError, ServiceIdentity};
use prometheus::Registry;
use prometheus::proto::MetricFamily;
use std::collections::HashMap;
use std::sync::Arc;

fn identity() -> ServiceIdentity {
    ServiceIdentity::new("fraud_model", "3", "dep-7", "ml")
}

fn family(registry: &Registry, name: &str) -> MetricFamily {
    registry
        .gather()
        .into_iter()
        .find(|f| f.get_name() == name)
        .unwrap_or_else(|| panic!("no metric family named {name}"))
}

// Gathered output orders label pairs by name, not declaration order, so
// tuples are compared as maps.
fn labels(family: &MetricFamily) -> HashMap<String, String> {
    family.get_metric()[0]
        .get_label()
        .iter()
        .map(|pair| (pair.get_name().to_string(), pair.get_value().to_string()))
        .collect()
}

fn base_labels(endpoint: &str) -> HashMap<String, String> {
    [
        ("deployment_id", "dep-7"),
        ("service_version", "3"),
        ("endpoint", endpoint),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[test]
fn reward_observation_lands_on_the_contracted_series() {
    let registry = Registry::new();
    let monitor = Monitor::new(&registry, identity(), ExtraLabels::new()).expect("monitor");

    monitor.observe_reward(0.82, None, &[]).expect("observe");

    let family = family(&registry, "ml_fraud_model_reward");
    let metric = &family.get_metric()[0];
    assert_eq!(metric.get_histogram().get_sample_count(), 1);
    assert_eq!(metric.get_histogram().get_sample_sum(), 0.82);
    assert_eq!(labels(&family), base_labels("send-feedback"));
}

#[test]
fn timer_records_raw_and_per_request_durations() {
    let registry = Registry::new();
    let monitor = Monitor::new(&registry, identity(), ExtraLabels::new()).expect("monitor");

    let timer = monitor
        .time_model_execution(4, None, &[])
        .expect("start timer");
    std::thread::sleep(std::time::Duration::from_millis(30));
    let duration = timer.stop();
    assert!(duration >= 0.03);

    let raw = family(&registry, "ml_fraud_model_model_execution_duration_seconds");
    let per_request = family(
        &registry,
        "ml_fraud_model_model_execution_per_request_duration_seconds",
    );

    assert_eq!(raw.get_metric()[0].get_histogram().get_sample_sum(), duration);
    assert_eq!(
        per_request.get_metric()[0].get_histogram().get_sample_sum(),
        duration / 4.0
    );
    // Identical label tuples, differing only by instrument.
    assert_eq!(labels(&raw), labels(&per_request));
    assert_eq!(labels(&raw), base_labels("predict"));
}

#[test]
fn dropped_timer_still_records_once() {
    let registry = Registry::new();
    let monitor = Monitor::new(&registry, identity(), ExtraLabels::new()).expect("monitor");

    {
        let _timer = monitor
            .time_model_execution(2, None, &[])
            .expect("start timer");
    }

    let raw = family(&registry, "ml_fraud_model_model_execution_duration_seconds");
    assert_eq!(raw.get_metric()[0].get_histogram().get_sample_count(), 1);
}

#[test]
fn exception_guard_counts_failures_only() {
    let registry = Registry::new();
    let monitor = Monitor::new(&registry, identity(), ExtraLabels::new()).expect("monitor");

    let counter_value = |registry: &Registry| {
        family(registry, "ml_fraud_model_exception_total").get_metric()[0]
            .get_counter()
            .get_value()
    };

    // Successful body leaves the counter untouched.
    let guard = monitor.count_exceptions(None, &[]).expect("guard");
    let ok: Result<u32, String> = guard.scope(|| Ok(7));
    assert_eq!(ok.expect("body result"), 7);
    assert_eq!(counter_value(&registry), 0.0);

    // Failing body increments by exactly one and the error propagates.
    let guard = monitor.count_exceptions(None, &[]).expect("guard");
    let err: Result<u32, String> = guard.scope(|| Err("model blew up".to_string()));
    assert_eq!(err.unwrap_err(), "model blew up");
    assert_eq!(counter_value(&registry), 1.0);
}

#[test]
fn exception_guard_counts_panics_and_lets_them_unwind() {
    let registry = Registry::new();
    let monitor = Monitor::new(&registry, identity(), ExtraLabels::new()).expect("monitor");

    let guard = monitor.count_exceptions(None, &[]).expect("guard");
    let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        guard.scope(|| -> Result<(), ()> { panic!("inference crashed") })
    }));
    assert!(unwound.is_err());

    let value = family(&registry, "ml_fraud_model_exception_total").get_metric()[0]
        .get_counter()
        .get_value();
    assert_eq!(value, 1.0);
}

#[test]
fn declared_extra_labels_extend_the_tuple_in_order() {
    let registry = Registry::new();
    let extra = ExtraLabels::new()
        .declare(Metric::Reward, ["model_variant", "segment"])
        .declare(Metric::ExceptionTotal, ["model_variant"]);
    let monitor = Monitor::new(&registry, identity(), extra).expect("monitor");

    monitor
        .observe_reward(0.5, Some("predict"), &["champion", "eu"])
        .expect("observe");

    let family = family(&registry, "ml_fraud_model_reward");
    let mut expected = base_labels("predict");
    expected.insert("model_variant".to_string(), "champion".to_string());
    expected.insert("segment".to_string(), "eu".to_string());
    assert_eq!(labels(&family), expected);

    // Schema is fixed per metric: the counter declared one extra label.
    assert!(matches!(
        monitor.count_exceptions(None, &[]).unwrap_err(),
        MonitorError::LabelCardinality { .. }
    ));
    monitor
        .count_exceptions(None, &["champion"])
        .expect("matching arity");
}

#[test]
fn concurrent_observations_share_one_series() {
    let registry = Registry::new();
    let monitor =
        Arc::new(Monitor::new(&registry, identity(), ExtraLabels::new()).expect("monitor"));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let monitor = Arc::clone(&monitor);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    monitor.observe_reward(1.0, None, &[]).expect("observe");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker thread");
    }

    let family = family(&registry, "ml_fraud_model_reward");
    assert_eq!(family.get_metric().len(), 1);
    assert_eq!(family.get_metric()[0].get_histogram().get_sample_count(), 800);
}
