// Ordered "first success wins" runner for alternative fetch strategies
use futures::future::BoxFuture;

/// One named strategy. The future is not polled until its turn comes.
pub struct Attempt<'a, T, E> {
    pub stage: &'static str,
    pub run: BoxFuture<'a, Result<T, E>>,
}

impl<'a, T, E> Attempt<'a, T, E> {
    pub fn new(stage: &'static str, run: BoxFuture<'a, Result<T, E>>) -> Self {
        Self { stage, run }
    }
}

/// Run `attempts` strictly in order and return the first success.
///
/// Later strategies are never started once one succeeds. When all of them
/// fail, every stage's failure is returned in order.
pub async fn first_success<T, E>(
    attempts: Vec<Attempt<'_, T, E>>,
) -> Result<T, Vec<(&'static str, E)>> {
    let mut failures = Vec::with_capacity(attempts.len());

    for attempt in attempts {
        match attempt.run.await {
            Ok(value) => return Ok(value),
            Err(e) => failures.push((attempt.stage, e)),
        }
    }

    Err(failures)
}
