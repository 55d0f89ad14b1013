mod common;

use std::time::Duration;

use common::RecordingSleeper;
use harvester_engine::{run_with_retry, EndpointError, ExtractError, RetryPolicy};

fn policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        backoff: Duration::from_secs(10),
    }
}

async fn fail_then_succeed(failures: u32) -> (Result<u32, u32>, u32, Vec<Duration>) {
    let sleeper = RecordingSleeper::default();
    let mut calls = 0;
    let result = run_with_retry(&policy(), &sleeper, "test", |attempt| {
        calls += 1;
        let fail = attempt <= failures;
        async move {
            if fail {
                Err(ExtractError::Empty)
            } else {
                Ok(attempt)
            }
        }
    })
    .await
    .map_err(|err| err.attempts);
    (result, calls, sleeper.sleeps())
}

#[tokio::test]
async fn succeeds_iff_failures_below_max_attempts_with_one_sleep_per_failure() {
    for failures in 0..3 {
        let (result, calls, sleeps) = fail_then_succeed(failures).await;
        assert_eq!(result, Ok(failures + 1));
        assert_eq!(calls, failures + 1);
        assert_eq!(sleeps, vec![Duration::from_secs(10); failures as usize]);
    }
}

#[tokio::test]
async fn gives_up_after_max_attempts_without_a_trailing_sleep() {
    for failures in 3..5 {
        let (result, calls, sleeps) = fail_then_succeed(failures).await;
        assert_eq!(result, Err(3));
        assert_eq!(calls, 3);
        assert_eq!(sleeps.len(), 2);
    }
}

#[tokio::test]
async fn configuration_errors_are_not_retried() {
    let sleeper = RecordingSleeper::default();
    let err = run_with_retry(&policy(), &sleeper, "test", |_| async {
        Err::<(), _>(ExtractError::Endpoint(EndpointError::MissingTestament {
            work: "gn".into(),
        }))
    })
    .await
    .unwrap_err();
    assert_eq!(err.attempts, 1);
    assert!(matches!(err.last, ExtractError::Endpoint(_)));
    assert!(sleeper.sleeps().is_empty());
}
