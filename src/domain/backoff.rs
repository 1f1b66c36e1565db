//! 限流退避
//!
//! 合成重试的状态机：
//!
//! ```text
//! Attempting --限流--> Backoff --睡眠结束--> Attempting
//! Attempting --成功--> Succeeded
//! Attempting --其他错误 / 重试耗尽--> Failed
//! ```

use std::time::Duration;

/// 默认最大重试次数（不含首次尝试）
pub const DEFAULT_MAX_RETRIES: u32 = 5;
/// 默认初始退避时长
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(60);
/// 默认退避上限
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(600);

/// 指数退避策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// 限流后的最大重试次数，总尝试次数为 `max_retries + 1`
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

/// 单次尝试的结果分类
#[derive(Debug)]
pub enum AttemptResult<T, E> {
    Success(T),
    /// 限流，可退避重试
    RateLimited(E),
    /// 其他错误，立即失败
    Failed(E),
}

/// 重试失败原因
#[derive(Debug)]
pub enum RetryFailure<E> {
    /// 非限流错误，未重试
    Rejected(E),
    /// 连续限流直到重试次数耗尽
    Exhausted { attempts: u32, last: E },
}

/// 重试状态
#[derive(Debug)]
pub enum RetryState<T, E> {
    /// 第 `attempt` 次尝试（从 1 开始），`delay` 为若被限流将要等待的时长
    Attempting { attempt: u32, delay: Duration },
    Backoff { attempt: u32, delay: Duration },
    Succeeded(T),
    Failed(RetryFailure<E>),
}

impl BackoffPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
        }
    }

    /// 初始状态
    pub fn start<T, E>(&self) -> RetryState<T, E> {
        RetryState::Attempting {
            attempt: 1,
            delay: self.initial_delay.min(self.max_delay),
        }
    }

    /// 一次尝试完成后的状态转移
    pub fn after_attempt<T, E>(
        &self,
        attempt: u32,
        delay: Duration,
        result: AttemptResult<T, E>,
    ) -> RetryState<T, E> {
        match result {
            AttemptResult::Success(value) => RetryState::Succeeded(value),
            AttemptResult::Failed(err) => RetryState::Failed(RetryFailure::Rejected(err)),
            AttemptResult::RateLimited(err) if attempt > self.max_retries => {
                RetryState::Failed(RetryFailure::Exhausted {
                    attempts: attempt,
                    last: err,
                })
            }
            AttemptResult::RateLimited(_) => RetryState::Backoff { attempt, delay },
        }
    }

    /// 退避结束后的状态转移：延迟翻倍并封顶
    pub fn after_backoff<T, E>(&self, attempt: u32, delay: Duration) -> RetryState<T, E> {
        RetryState::Attempting {
            attempt: attempt + 1,
            delay: delay.saturating_mul(2).min(self.max_delay),
        }
    }

    /// 连续限流时的完整等待序列
    pub fn schedule(&self) -> Vec<Duration> {
        let mut delays = Vec::with_capacity(self.max_retries as usize);
        let mut delay = self.initial_delay.min(self.max_delay);
        for _ in 0..self.max_retries {
            delays.push(delay);
            delay = delay.saturating_mul(2).min(self.max_delay);
        }
        delays
    }

    /// 一个 Section 被判定失败前的最长累计等待
    pub fn max_total_wait(&self) -> Duration {
        self.schedule().into_iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(values: &[u64]) -> Vec<Duration> {
        values.iter().map(|&s| Duration::from_secs(s)).collect()
    }

    #[test]
    fn test_default_schedule_is_capped() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.schedule(), secs(&[60, 120, 240, 480, 600]));
        assert_eq!(policy.max_total_wait(), Duration::from_secs(1500));
    }

    /// 用脚本化的结果驱动状态机，返回 (最终状态, 总等待)
    fn drive(
        policy: &BackoffPolicy,
        script: Vec<AttemptResult<&'static str, &'static str>>,
    ) -> (RetryState<&'static str, &'static str>, Duration) {
        let mut script = script.into_iter();
        let mut waited = Duration::ZERO;
        let mut state = policy.start();
        loop {
            state = match state {
                RetryState::Attempting { attempt, delay } => {
                    let result = script.next().expect("script exhausted");
                    policy.after_attempt(attempt, delay, result)
                }
                RetryState::Backoff { attempt, delay } => {
                    waited += delay;
                    policy.after_backoff(attempt, delay)
                }
                done => return (done, waited),
            };
        }
    }

    #[test]
    fn test_five_rate_limits_then_success() {
        let policy = BackoffPolicy::default();
        let mut script: Vec<_> = (0..5).map(|_| AttemptResult::RateLimited("429")).collect();
        script.push(AttemptResult::Success("audio"));

        let (state, waited) = drive(&policy, script);
        assert!(matches!(state, RetryState::Succeeded("audio")));
        assert_eq!(waited, Duration::from_secs(1500));
    }

    #[test]
    fn test_rate_limits_exhaust_retries() {
        let policy = BackoffPolicy::default();
        let script: Vec<_> = (0..6).map(|_| AttemptResult::RateLimited("429")).collect();

        let (state, waited) = drive(&policy, script);
        assert!(matches!(
            state,
            RetryState::Failed(RetryFailure::Exhausted { attempts: 6, .. })
        ));
        assert_eq!(waited, Duration::from_secs(1500));
    }

    #[test]
    fn test_other_error_fails_immediately() {
        let policy = BackoffPolicy::default();
        let script = vec![
            AttemptResult::RateLimited("429"),
            AttemptResult::Failed("401"),
        ];

        let (state, waited) = drive(&policy, script);
        assert!(matches!(state, RetryState::Failed(RetryFailure::Rejected("401"))));
        assert_eq!(waited, Duration::from_secs(60));
    }

    #[test]
    fn test_zero_retries() {
        let policy = BackoffPolicy::new(0, Duration::from_secs(1), Duration::from_secs(2));
        assert!(policy.schedule().is_empty());
        let (state, waited) = drive(&policy, vec![AttemptResult::RateLimited("429")]);
        assert!(matches!(
            state,
            RetryState::Failed(RetryFailure::Exhausted { attempts: 1, .. })
        ));
        assert_eq!(waited, Duration::ZERO);
    }
}
