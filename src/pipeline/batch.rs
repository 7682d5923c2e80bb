// Batch session analysis
// Analyzes independent sessions concurrently on the blocking thread pool

use std::sync::Arc;

use crate::config::AnalysisConfig;
use crate::report::{ReportError, SessionReport};
use crate::signal::SessionInput;

/// Analyze every session, one blocking task each
///
/// Results come back in input order; one failing session does not affect the others.
pub async fn analyze_batch(
    sessions: Vec<SessionInput>,
    lane_hint: Option<usize>,
    config: Arc<AnalysisConfig>,
) -> Vec<Result<SessionReport, ReportError>> {
    let handles: Vec<_> = sessions
        .into_iter()
        .map(|session| {
            let config = Arc::clone(&config);
            tokio::task::spawn_blocking(move || {
                SessionReport::build(&session, lane_hint, &config)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (index, handle) in handles.into_iter().enumerate() {
        let result = match handle.await {
            Ok(report) => report,
            Err(e) => {
                log::error!("Analysis task for session {} failed: {}", index, e);
                Err(ReportError::Worker(e.to_string()))
            }
        };
        results.push(result);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{ExpectedNote, Sample};

    fn session(peak_ms: f64) -> SessionInput {
        let force_trace = (0..300)
            .map(|i| {
                let t = i as f64 * 10.0;
                let d = (t - peak_ms).abs();
                let p = if d < 250.0 { 0.7 * (1.0 - d / 250.0) } else { 0.0 };
                Sample {
                    time: t,
                    pressure: vec![p],
                }
            })
            .collect();

        SessionInput {
            force_trace,
            expected_notes: vec![ExpectedNote { time: 1000.0, lane: 0 }],
            lane_count: Some(1),
        }
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let sessions = vec![session(1000.0), session(1200.0), session(900.0)];
        let config = Arc::new(AnalysisConfig::default());

        let results = analyze_batch(sessions, None, config).await;

        assert_eq!(results.len(), 3);
        let peak_times: Vec<f64> = results
            .iter()
            .map(|r| r.as_ref().unwrap().gestures[0].peak_time)
            .collect();
        assert_eq!(peak_times, vec![1000.0, 1200.0, 900.0]);
    }

    #[tokio::test]
    async fn test_failing_session_is_isolated() {
        let mut broken = session(1000.0);
        broken.force_trace[5].pressure.push(0.0);

        let results = analyze_batch(
            vec![session(1000.0), broken],
            None,
            Arc::new(AnalysisConfig::default()),
        )
        .await;

        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ReportError::Analysis(_))));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let results = analyze_batch(Vec::new(), None, Arc::new(AnalysisConfig::default())).await;
        assert!(results.is_empty());
    }
}
