//! Prediction pipeline: intake, preprocessing, classification, aggregation, persistence

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::intake::{validate_uploads, UploadedImage, MAX_IMAGES};
use crate::domain::prediction::{NewPrediction, PredictionRecord, PredictionRepository};
use crate::domain::user::{UserId, UserRepository};
use crate::domain::{Aggregate, Aggregator, Classifier, DiseaseClass, DomainError};
use crate::infrastructure::imaging::Preprocessor;

/// Number of records returned by the history endpoint
pub const HISTORY_LIMIT: usize = 10;

/// Images and owner of a single `/predict` call
#[derive(Debug, Clone, Default)]
pub struct PredictionRequest {
    pub images: Vec<UploadedImage>,
    /// `None` stores the result as anonymous
    pub user_id: Option<UserId>,
}

/// One answer for the whole batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedResult {
    pub disease: DiseaseClass,
    pub confidence: f64,
    /// First uploaded image as a data URL
    pub image: String,
    pub images_processed: usize,
}

/// Runs uploads through the classifier and stores the aggregated answer
#[derive(Debug, Clone)]
pub struct PredictionService {
    classifier: Arc<dyn Classifier>,
    preprocessor: Preprocessor,
    predictions: Arc<dyn PredictionRepository>,
    users: Arc<dyn UserRepository>,
    max_images: usize,
}

impl PredictionService {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        preprocessor: Preprocessor,
        predictions: Arc<dyn PredictionRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            classifier,
            preprocessor,
            predictions,
            users,
            max_images: MAX_IMAGES,
        }
    }

    pub fn with_max_images(mut self, max_images: usize) -> Self {
        self.max_images = max_images;
        self
    }

    /// Name of the active classifier strategy
    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    /// Validate, classify and aggregate the uploads, then persist one record
    pub async fn predict(&self, request: PredictionRequest) -> Result<AggregatedResult, DomainError> {
        validate_uploads(&request.images, self.max_images)?;

        if let Some(user_id) = request.user_id {
            if !self.users.exists(user_id).await? {
                return Err(DomainError::validation(format!("Unknown user '{}'", user_id)));
            }
        }

        let classifier = Arc::clone(&self.classifier);
        let preprocessor = self.preprocessor;
        let images = request.images;

        let (aggregate, image) = tokio::task::spawn_blocking(move || {
            classify_batch(classifier.as_ref(), &preprocessor, &images)
        })
        .await
        .map_err(|e| DomainError::processing(format!("Classification task failed: {}", e)))??;

        info!(
            disease = %aggregate.disease,
            confidence = format_args!("{:.2}", aggregate.confidence),
            images = aggregate.images_processed,
            "Aggregated prediction"
        );

        self.predictions
            .create(NewPrediction {
                user_id: request.user_id,
                image: image.clone(),
                disease: aggregate.disease,
                confidence: aggregate.confidence,
            })
            .await?;

        Ok(AggregatedResult {
            disease: aggregate.disease,
            confidence: aggregate.confidence,
            image,
            images_processed: aggregate.images_processed,
        })
    }

    /// Most recent predictions for a user, newest first
    pub async fn history(&self, user_id: UserId) -> Result<Vec<PredictionRecord>, DomainError> {
        self.predictions.list_recent(user_id, HISTORY_LIMIT).await
    }
}

/// Classify every usable upload and average the results.
///
/// Uploads with an empty filename or undecodable bytes are skipped. Returns
/// the aggregate together with the reference image (the first upload with a
/// filename, as a data URL).
pub fn classify_batch(
    classifier: &dyn Classifier,
    preprocessor: &Preprocessor,
    images: &[UploadedImage],
) -> Result<(Aggregate, String), DomainError> {
    let mut aggregator = Aggregator::new();
    let mut reference = None;

    for (i, upload) in images.iter().enumerate() {
        if upload.is_empty() {
            continue;
        }

        if reference.is_none() {
            reference = Some(to_data_url(upload));
        }

        let tensor = match preprocessor.preprocess(&upload.bytes) {
            Ok(tensor) => tensor,
            Err(e) => {
                warn!(filename = %upload.filename, error = %e, "Skipping image");
                continue;
            }
        };

        debug!(
            classifier = classifier.name(),
            "Processing image {}/{}: {}",
            i + 1,
            images.len(),
            upload.filename
        );

        aggregator.add(&classifier.predict(&tensor)?);
    }

    let aggregate = aggregator.finish()?;
    let reference = reference.ok_or(DomainError::NoValidImages)?;

    Ok((aggregate, reference))
}

/// Encode an upload as `data:<mime>;base64,<payload>`
pub fn to_data_url(upload: &UploadedImage) -> String {
    format!(
        "data:{};base64,{}",
        upload.mime_type(),
        STANDARD.encode(&upload.bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classifier::MockClassifier;
    use crate::domain::prediction::MockPredictionRepository;
    use crate::domain::user::NewUser;
    use crate::domain::ProbabilityVector;
    use crate::infrastructure::classifier::FallbackClassifier;
    use crate::infrastructure::imaging::fixtures;
    use crate::infrastructure::storage::InMemoryStore;

    fn jpeg(name: &str) -> UploadedImage {
        UploadedImage::new(name, Some("image/jpeg".to_string()), fixtures::jpeg_bytes(64, 48))
    }

    fn fixed_classifier(outputs: Vec<[f64; DiseaseClass::COUNT]>) -> MockClassifier {
        let mut outputs = outputs.into_iter();
        let mut mock = MockClassifier::new();
        mock.expect_name().return_const("mock");
        mock.expect_predict()
            .returning(move |_| ProbabilityVector::new(outputs.next().unwrap()));
        mock
    }

    fn service_with(classifier: Arc<dyn Classifier>, store: Arc<InMemoryStore>) -> PredictionService {
        PredictionService::new(classifier, Preprocessor::default(), store.clone(), store)
    }

    async fn register(store: &InMemoryStore, username: &str) -> UserId {
        UserRepository::create(
            store,
            NewUser {
                username: username.to_string(),
                password_hash: "hash".to_string(),
            },
        )
        .await
        .unwrap()
        .id()
    }

    #[tokio::test]
    async fn test_fallback_prediction_for_two_images() {
        let store = Arc::new(InMemoryStore::new());
        let user_id = register(&store, "alice").await;
        let service = service_with(Arc::new(FallbackClassifier::new()), store.clone());

        let result = service
            .predict(PredictionRequest {
                images: vec![jpeg("a.jpg"), jpeg("b.jpg")],
                user_id: Some(user_id),
            })
            .await
            .unwrap();

        assert_eq!(result.images_processed, 2);
        assert!((0.0..=100.0).contains(&result.confidence));
        assert!(DiseaseClass::ALL.contains(&result.disease));
        assert!(result.image.starts_with("data:image/jpeg;base64,"));

        let history = service.history(user_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].disease, result.disease);
        assert_eq!(history[0].image, result.image);
    }

    #[tokio::test]
    async fn test_vectors_are_averaged() {
        let classifier = fixed_classifier(vec![
            [0.6, 0.4, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.1, 0.9, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.2, 0.7, 0.1, 0.0, 0.0, 0.0, 0.0],
        ]);
        let service = service_with(Arc::new(classifier), Arc::new(InMemoryStore::new()));

        let result = service
            .predict(PredictionRequest {
                images: vec![jpeg("1.jpg"), jpeg("2.jpg"), jpeg("3.jpg")],
                user_id: None,
            })
            .await
            .unwrap();

        assert_eq!(result.disease, DiseaseClass::BasalCellCarcinoma);
        assert!((result.confidence - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(result.images_processed, 3);
    }

    #[tokio::test]
    async fn test_undecodable_image_is_skipped() {
        let classifier = fixed_classifier(vec![[0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]]);
        let service = service_with(Arc::new(classifier), Arc::new(InMemoryStore::new()));

        let broken = UploadedImage::new("broken.png", None, b"not a png".to_vec());
        let result = service
            .predict(PredictionRequest {
                images: vec![broken, jpeg("ok.jpg")],
                user_id: None,
            })
            .await
            .unwrap();

        assert_eq!(result.images_processed, 1);
        assert_eq!(result.disease, DiseaseClass::MelanocyticNevus);
        assert!((result.confidence - 100.0).abs() < 1e-9);
        // Reference image is the first upload even though it failed to decode
        assert!(result.image.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_no_valid_images() {
        let mut classifier = MockClassifier::new();
        classifier.expect_name().return_const("mock");
        classifier.expect_predict().never();

        let store = Arc::new(InMemoryStore::new());
        let user_id = register(&store, "alice").await;
        let service = service_with(Arc::new(classifier), store);

        let result = service
            .predict(PredictionRequest {
                images: vec![UploadedImage::new("bad.jpg", None, vec![0, 1, 2])],
                user_id: Some(user_id),
            })
            .await;

        assert!(matches!(result, Err(DomainError::NoValidImages)));
        assert!(service.history(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_too_many_images_rejected_before_processing() {
        let mut classifier = MockClassifier::new();
        classifier.expect_name().return_const("mock");
        classifier.expect_predict().never();

        let service = service_with(Arc::new(classifier), Arc::new(InMemoryStore::new()));

        let result = service
            .predict(PredictionRequest {
                images: vec![jpeg("1.jpg"), jpeg("2.jpg"), jpeg("3.jpg"), jpeg("4.jpg")],
                user_id: None,
            })
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_unknown_user_rejected() {
        let service = service_with(
            Arc::new(FallbackClassifier::new()),
            Arc::new(InMemoryStore::new()),
        );

        let result = service
            .predict(PredictionRequest {
                images: vec![jpeg("a.jpg")],
                user_id: Some(UserId::new(77)),
            })
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_classifier_failure_aborts_request() {
        let mut classifier = MockClassifier::new();
        classifier.expect_name().return_const("mock");
        classifier
            .expect_predict()
            .returning(|_| Err(DomainError::processing("inference failed")));

        let store = Arc::new(InMemoryStore::new());
        let user_id = register(&store, "alice").await;
        let service = service_with(Arc::new(classifier), store);

        let result = service
            .predict(PredictionRequest {
                images: vec![jpeg("a.jpg")],
                user_id: Some(user_id),
            })
            .await;

        assert!(matches!(result, Err(DomainError::Processing { .. })));
        assert!(service.history(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        let mut predictions = MockPredictionRepository::new();
        predictions
            .expect_create()
            .times(1)
            .returning(|_| Err(DomainError::storage("disk full")));

        let service = PredictionService::new(
            Arc::new(FallbackClassifier::new()),
            Preprocessor::default(),
            Arc::new(predictions),
            Arc::new(InMemoryStore::new()),
        );

        let result = service
            .predict(PredictionRequest {
                images: vec![jpeg("a.jpg")],
                user_id: None,
            })
            .await;

        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }

    #[test]
    fn test_data_url_guesses_mime_from_filename() {
        let upload = UploadedImage::new("lesion.png", None, vec![1, 2, 3]);
        assert_eq!(to_data_url(&upload), "data:image/png;base64,AQID");
    }
}
