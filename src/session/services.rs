use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn, Instrument};

use super::dto::SessionSnapshot;
use super::error::SessionError;
use super::machine::Session;
use super::slot;
use crate::analysis::{AnalysisError, AnalysisResult, MealAnalyzer};
use crate::images::CapturedImage;
use crate::storage::KeyValueStore;

/// Drives the session machine: owns the lock, the store and the analyzer.
///
/// The lock is never held across the model call, so snapshot and reset
/// stay responsive while an analysis is in flight.
pub struct SessionService {
    session: Arc<Mutex<Session>>,
    store: Arc<dyn KeyValueStore>,
    analyzer: Arc<dyn MealAnalyzer>,
    timeout: Duration,
}

impl SessionService {
    /// Build the service, restoring the last saved analysis if there is one.
    pub async fn start(
        store: Arc<dyn KeyValueStore>,
        analyzer: Arc<dyn MealAnalyzer>,
        timeout: Duration,
    ) -> Self {
        let session = match slot::load(store.as_ref()).await {
            Some(saved) => {
                info!(dish = %saved.result.dish_name, "restored saved analysis");
                Session::restored(saved.result, saved.image, saved.saved_at)
            }
            None => Session::new(),
        };
        Self {
            session: Arc::new(Mutex::new(session)),
            store,
            analyzer,
            timeout,
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(&*self.session.lock().await)
    }

    /// Run `f` against the current result, if there is one.
    pub async fn with_result<T>(
        &self,
        f: impl FnOnce(&AnalysisResult) -> T,
    ) -> Result<T, SessionError> {
        let session = self.session.lock().await;
        session.result().map(f).ok_or(SessionError::NoResult)
    }

    /// Start an analysis and wait for it.
    ///
    /// The model call and the completion run in their own task, so a
    /// dropped request still resolves `analyzing` to result or error.
    #[instrument(skip_all, fields(mime = %image.mime_type, bytes = image.bytes.len()))]
    pub async fn capture(&self, image: CapturedImage) -> Result<SessionSnapshot, SessionError> {
        let ticket = {
            let mut session = self.session.lock().await;
            match session.begin_capture(image.clone()) {
                Ok(ticket) => ticket,
                Err(e) => {
                    warn!("capture ignored: analysis already in progress");
                    return Err(e);
                }
            }
        };

        let session = self.session.clone();
        let analyzer = self.analyzer.clone();
        let timeout = self.timeout;
        let task = tokio::spawn(
            async move {
                let outcome = analyze_with_timeout(analyzer.as_ref(), &image, timeout).await;
                let mut session = session.lock().await;
                if !session.complete(ticket, outcome) {
                    info!("analysis outcome dropped; session moved on");
                }
                SessionSnapshot::from(&*session)
            }
            .in_current_span(),
        );

        match task.await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                error!(error = %e, "analysis task aborted");
                let mut session = self.session.lock().await;
                session.complete(ticket, Err(AnalysisError::generic_provider()));
                Ok(SessionSnapshot::from(&*session))
            }
        }
    }

    /// Persist the current result. A failed write keeps the result in
    /// memory and only sets a notice.
    #[instrument(skip_all)]
    pub async fn save(&self) -> Result<SessionSnapshot, SessionError> {
        let mut session = self.session.lock().await;
        session.clear_notice();
        let saved_at = OffsetDateTime::now_utc();

        let written = match session.pending_save()? {
            None => {
                info!("analysis already saved");
                return Ok(SessionSnapshot::from(&*session));
            }
            Some((result, image)) => {
                slot::write(self.store.as_ref(), result, image, saved_at).await
            }
        };

        match written {
            Ok(()) => {
                session.mark_saved(saved_at);
                info!("analysis saved");
            }
            Err(e) => session.set_notice(e.to_string()),
        }
        Ok(SessionSnapshot::from(&*session))
    }

    /// Back to idle and forget the saved analysis. Also the retry action.
    #[instrument(skip_all)]
    pub async fn reset(&self) -> SessionSnapshot {
        let mut session = self.session.lock().await;
        session.reset();
        if let Err(e) = slot::clear(self.store.as_ref()).await {
            session.set_notice(e.to_string());
        }
        info!("session reset");
        SessionSnapshot::from(&*session)
    }
}

async fn analyze_with_timeout(
    analyzer: &dyn MealAnalyzer,
    image: &CapturedImage,
    timeout: Duration,
) -> Result<AnalysisResult, AnalysisError> {
    let outcome = match tokio::time::timeout(timeout, analyzer.analyze(image)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs(), "analysis timed out");
            Err(AnalysisError::Timeout)
        }
    };
    if let Err(e) = &outcome {
        warn!(kind = e.kind(), "analysis failed");
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::machine::Status;
    use crate::storage::MemoryStore;
    use crate::test_utils::{sample_image, sample_result, FailingStore, ScriptedAnalyzer};

    async fn service_with(
        store: Arc<dyn KeyValueStore>,
        analyzer: Arc<ScriptedAnalyzer>,
    ) -> SessionService {
        SessionService::start(store, analyzer, Duration::from_secs(5)).await
    }

    #[tokio::test]
    async fn fresh_start_is_idle() {
        let svc = service_with(Arc::new(MemoryStore::new()), Arc::new(ScriptedAnalyzer::new())).await;
        let snap = svc.snapshot().await;
        assert_eq!(snap.status, Status::Idle);
        assert!(snap.result.is_none());
    }

    #[tokio::test]
    async fn capture_success_yields_unsaved_result() {
        let analyzer = Arc::new(ScriptedAnalyzer::new());
        analyzer.push(Ok(sample_result()));
        let store = Arc::new(MemoryStore::new());
        let svc = service_with(store.clone(), analyzer.clone()).await;

        let snap = svc.capture(sample_image()).await.unwrap();
        assert_eq!(snap.status, Status::Result);
        assert!(!snap.is_saved);
        assert_eq!(snap.result.unwrap().dish_name, "Grilled Chicken Salad");
        assert_eq!(analyzer.calls(), 1);
        assert_eq!(store.get(slot::SLOT_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn malformed_response_goes_to_error_and_leaves_slot_alone() {
        let analyzer = Arc::new(ScriptedAnalyzer::new());
        analyzer.push(Err(AnalysisError::malformed("totals: missing field")));
        let store = Arc::new(MemoryStore::new());
        let svc = service_with(store.clone(), analyzer).await;
        store.set(slot::SLOT_KEY, "sentinel").await.unwrap();

        let snap = svc.capture(sample_image()).await.unwrap();
        assert_eq!(snap.status, Status::Error);
        assert_eq!(
            snap.error_message.as_deref(),
            Some(AnalysisError::GENERIC_PROVIDER_MESSAGE)
        );
        assert!(snap.image.is_some());
        assert_eq!(
            store.get(slot::SLOT_KEY).await.unwrap().as_deref(),
            Some("sentinel")
        );
    }

    #[tokio::test]
    async fn slow_analysis_times_out() {
        let analyzer = Arc::new(ScriptedAnalyzer::new().with_delay(Duration::from_millis(200)));
        analyzer.push(Ok(sample_result()));
        let svc = SessionService::start(
            Arc::new(MemoryStore::new()),
            analyzer,
            Duration::from_millis(20),
        )
        .await;

        let snap = svc.capture(sample_image()).await.unwrap();
        assert_eq!(snap.status, Status::Error);
        assert_eq!(
            snap.error_message,
            Some(AnalysisError::Timeout.to_string())
        );
    }

    #[tokio::test]
    async fn concurrent_capture_is_ignored() {
        let analyzer = Arc::new(ScriptedAnalyzer::new().with_delay(Duration::from_millis(100)));
        analyzer.push(Ok(sample_result()));
        analyzer.push(Ok(sample_result()));
        let svc = Arc::new(service_with(Arc::new(MemoryStore::new()), analyzer.clone()).await);

        let first = {
            let svc = svc.clone();
            tokio::spawn(async move { svc.capture(sample_image()).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(svc.snapshot().await.status, Status::Analyzing);

        let second = svc.capture(sample_image()).await;
        assert_eq!(second.unwrap_err(), SessionError::AnalysisInProgress);

        let snap = first.await.unwrap().unwrap();
        assert_eq!(snap.status, Status::Result);
        assert_eq!(analyzer.calls(), 1);
    }

    #[tokio::test]
    async fn dropped_capture_still_resolves() {
        let analyzer = Arc::new(ScriptedAnalyzer::new().with_delay(Duration::from_millis(50)));
        analyzer.push(Ok(sample_result()));
        analyzer.push(Ok(sample_result()));
        let svc = SessionService::start(
            Arc::new(MemoryStore::new()),
            analyzer.clone(),
            Duration::from_secs(1),
        )
        .await;

        // the caller goes away before the analysis finishes
        let abandoned = tokio::time::timeout(Duration::from_millis(10), svc.capture(sample_image())).await;
        assert!(abandoned.is_err());
        assert_eq!(svc.snapshot().await.status, Status::Analyzing);

        tokio::time::sleep(Duration::from_millis(300)).await;
        let snap = svc.snapshot().await;
        assert_eq!(snap.status, Status::Result);
        assert!(snap.result.is_some());

        let again = svc.capture(sample_image()).await.unwrap();
        assert_eq!(again.status, Status::Result);
        assert_eq!(analyzer.calls(), 2);
    }

    #[tokio::test]
    async fn reset_while_analyzing_wins() {
        let analyzer = Arc::new(ScriptedAnalyzer::new().with_delay(Duration::from_millis(100)));
        analyzer.push(Ok(sample_result()));
        let svc = Arc::new(service_with(Arc::new(MemoryStore::new()), analyzer).await);

        let pending = {
            let svc = svc.clone();
            tokio::spawn(async move { svc.capture(sample_image()).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(svc.reset().await.status, Status::Idle);

        let snap = pending.await.unwrap().unwrap();
        assert_eq!(snap.status, Status::Idle);
        assert!(snap.result.is_none());
    }

    #[tokio::test]
    async fn save_then_restart_restores_everything() {
        let analyzer = Arc::new(ScriptedAnalyzer::new());
        analyzer.push(Ok(sample_result()));
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let svc = service_with(store.clone(), analyzer).await;

        svc.capture(sample_image()).await.unwrap();
        let saved = svc.save().await.unwrap();
        assert!(saved.is_saved);
        assert!(saved.saved_at.is_some());

        // idempotent
        let again = svc.save().await.unwrap();
        assert!(again.is_saved);
        assert_eq!(again.saved_at, saved.saved_at);

        let restarted = service_with(store, Arc::new(ScriptedAnalyzer::new())).await;
        let snap = restarted.snapshot().await;
        assert_eq!(snap.status, Status::Result);
        assert!(snap.is_saved);
        let result = snap.result.unwrap();
        assert_eq!(result.dish_name, sample_result().dish_name);
        assert_eq!(result.ingredients, sample_result().ingredients);
        assert_eq!(result.totals, sample_result().totals);
        assert_eq!(snap.image, Some(sample_image().to_data_uri()));
    }

    #[tokio::test]
    async fn save_without_result_conflicts() {
        let svc = service_with(Arc::new(MemoryStore::new()), Arc::new(ScriptedAnalyzer::new())).await;
        assert_eq!(svc.save().await.unwrap_err(), SessionError::NothingToSave);
    }

    #[tokio::test]
    async fn failed_save_keeps_result_and_sets_notice() {
        let analyzer = Arc::new(ScriptedAnalyzer::new());
        analyzer.push(Ok(sample_result()));
        let svc = service_with(Arc::new(FailingStore), analyzer).await;

        svc.capture(sample_image()).await.unwrap();
        let snap = svc.save().await.unwrap();
        assert_eq!(snap.status, Status::Result);
        assert!(!snap.is_saved);
        assert!(snap.result.is_some());
        assert!(snap.notice.unwrap().contains("Could not save"));
    }

    #[tokio::test]
    async fn reset_twice_leaves_idle_and_no_slot() {
        let analyzer = Arc::new(ScriptedAnalyzer::new());
        analyzer.push(Ok(sample_result()));
        let store = Arc::new(MemoryStore::new());
        let svc = service_with(store.clone(), analyzer).await;
        svc.capture(sample_image()).await.unwrap();
        svc.save().await.unwrap();

        for _ in 0..2 {
            let snap = svc.reset().await;
            assert_eq!(snap.status, Status::Idle);
            assert!(snap.image.is_none());
            assert_eq!(store.get(slot::SLOT_KEY).await.unwrap(), None);
        }
    }
}
