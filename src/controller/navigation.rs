//! Search submission

use crate::model::{AudioDevice, KeyValueStore, SearchBackend};
use super::AppController;

impl<B, S, D> AppController<B, S, D>
where
    B: SearchBackend + 'static,
    S: KeyValueStore + Send + 'static,
    D: AudioDevice + 'static,
{
    /// Run one search to completion.
    ///
    /// The model lock is released while the request is in flight, so a
    /// second search may overlap; whichever resolves last wins.
    pub async fn perform_search(&self, query: &str) {
        let (term, backend) = {
            let mut model = self.model.lock().await;
            let Some(term) = model.begin_search(query) else {
                return;
            };
            (term, model.search_backend())
        };

        tracing::debug!(term = %term, "Performing search");
        let outcome = backend.search(&term).await;

        let mut model = self.model.lock().await;
        model.finish_search(&term, outcome);
    }

    /// Start a search in the background and return immediately.
    pub fn spawn_search(&self, query: String) {
        let controller = self.clone();
        tokio::spawn(async move {
            controller.perform_search(&query).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::controller::testing::controller;
    use crate::model::model_testing::{track, Reply};
    use crate::model::Status;

    #[tokio::test]
    async fn perform_search_updates_model() {
        let (controller, _) = controller(vec![Reply::Tracks(vec![track(1), track(2)])]);
        controller.perform_search("Drake").await;

        let model = controller.model.lock().await;
        assert_eq!(model.status(), &Status::ResultsFound("Drake".into()));
        assert_eq!(model.results().len(), 2);
        assert!(!model.is_loading());
    }

    #[tokio::test]
    async fn failing_search_does_not_propagate() {
        let (controller, _) = controller(vec![Reply::Fail]);
        controller.perform_search("Drake").await;

        let model = controller.model.lock().await;
        assert_eq!(model.status(), &Status::Error);
    }

    #[tokio::test]
    async fn blank_query_is_ignored() {
        let (controller, _) = controller(vec![Reply::Tracks(vec![track(1)])]);
        controller.perform_search("   ").await;

        let model = controller.model.lock().await;
        assert_eq!(model.status(), &Status::Idle);
        assert!(model.search_backend().terms.lock().unwrap().is_empty());
    }
}
