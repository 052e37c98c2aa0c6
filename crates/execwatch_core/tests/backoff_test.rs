use execwatch_core::BackoffPolicy;
use std::time::Duration;

#[test]
fn default_schedule_doubles_then_caps() {
    let millis: Vec<u128> = BackoffPolicy::default()
        .schedule(8)
        .iter()
        .map(Duration::as_millis)
        .collect();
    assert_eq!(
        millis,
        vec![1000, 2000, 4000, 8000, 16000, 30000, 30000, 30000]
    );
}

#[test]
fn delay_never_exceeds_ceiling() {
    let policy = BackoffPolicy::default();
    for retry in [5, 10, 31, 32, 64, u32::MAX] {
        assert_eq!(policy.delay(retry), Duration::from_millis(30_000));
    }
}

#[test]
fn custom_policy_respects_its_bounds() {
    let policy = BackoffPolicy::new(Duration::from_millis(50), Duration::from_millis(300));
    assert_eq!(
        policy.schedule(5),
        vec![
            Duration::from_millis(50),
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(300),
            Duration::from_millis(300),
        ]
    );
}
