use std::future::Future;
use std::time::Duration;

use gwl_content::ContentResult;

use crate::error::{LedgerError, LedgerResult};

/// Run a content backend call under an optional deadline.
///
/// On expiry the call's future is dropped, which abandons the request.
pub(crate) async fn with_deadline<T, F>(
    operation: &'static str,
    timeout: Option<Duration>,
    call: F,
) -> LedgerResult<T>
where
    F: Future<Output = ContentResult<T>>,
{
    match timeout {
        None => Ok(call.await?),
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(LedgerError::Timeout {
                operation,
                timeout_ms: limit.as_millis() as u64,
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwl_content::ContentError;

    #[tokio::test]
    async fn passes_through_results() {
        let ok = with_deadline("op", Some(Duration::from_secs(1)), async { Ok(5) })
            .await
            .unwrap();
        assert_eq!(ok, 5);

        let err = with_deadline::<(), _>("op", None, async {
            Err(ContentError::Transport("reset".into()))
        })
        .await
        .unwrap_err();
        assert_eq!(err, LedgerError::Content(ContentError::Transport("reset".into())));
    }

    #[tokio::test]
    async fn expiry_reports_timeout() {
        let err = with_deadline::<(), _>("resolve_node", Some(Duration::from_millis(10)), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .unwrap_err();
        assert_eq!(
            err,
            LedgerError::Timeout {
                operation: "resolve_node",
                timeout_ms: 10
            }
        );
    }
}
