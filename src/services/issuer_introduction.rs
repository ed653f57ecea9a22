// src/services/issuer_introduction.rs
//! Issuer introduction flow.
//!
//! Orchestrates the handshake that binds one of the wallet's receiving
//! addresses to an issuer's records:
//!
//! 1. **Join**: concurrently draw a fresh receiving address, pass the
//!    user-supplied nonce through, and resolve issuer metadata from the
//!    introduction URL. The join is fail-fast — it succeeds only if all
//!    three succeed, and the first failure wins.
//! 2. **Branch**: standard issuers are registered directly; issuers that
//!    require web-delegated authorization hand off to an external agent and
//!    resume once it reports success.
//!
//! The controller holds no UI state. Presentation intent (progress
//! indication, enabling/disabling the action) is emitted as
//! `IntroductionEvent`s for an observer to render; terminal errors are the
//! returned `Err` value.

use std::sync::Arc;

use log::{error, info};

use crate::errors::{IntroductionError, RegistrationErrorKind};
use crate::models::introduction::IntroductionRequest;
use crate::services::issuer_directory::IssuerDirectory;
use crate::services::web_auth::WebAuthAgent;
use crate::storage::issuer_store::IssuerStore;
use crate::wallet::address_source::AddressSource;

/// Presentation intent emitted while an introduction attempt runs.
///
/// The observer renders these; it must treat the action-enabled flag as
/// controller-owned between `ProgressStarted` and the terminal outcome and
/// never flip it independently while an attempt is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntroductionEvent {
    /// A long-running step began; show progress
    ProgressStarted,
    /// The current step finished; hide progress
    ProgressFinished,
    /// Enable or disable the user action that starts an introduction
    ActionEnabled(bool),
    /// An issuer record was persisted under the given identifier
    IssuerAdded(String),
}

/// Receives presentation intent from the controller.
pub trait IntroductionObserver: Send + Sync {
    /// Called once per event, in emission order.
    fn notify(&self, event: IntroductionEvent);
}

/// Drives issuer introduction attempts.
///
/// Collaborators are injected so the flow is independent of any concrete
/// wallet, transport, or rendering technology. One attempt may be in flight
/// at a time per instance; `start_introduction` takes `&mut self`, so a
/// concurrent second call on the same instance is rejected at compile time
/// rather than queued.
pub struct IssuerIntroductionController {
    /// Supplies a fresh receiving address per attempt
    address_source: Arc<dyn AddressSource>,

    /// Resolves issuer metadata and performs registration calls
    directory: Arc<dyn IssuerDirectory>,

    /// External agent for web-delegated authorization
    web_auth: Arc<dyn WebAuthAgent>,

    /// Receives presentation intent
    observer: Arc<dyn IntroductionObserver>,

    /// Introduced issuers, one record per successful attempt
    store: IssuerStore,
}

impl IssuerIntroductionController {
    /// Creates a controller over the given collaborators with an empty
    /// issuer store.
    pub fn new(
        address_source: Arc<dyn AddressSource>,
        directory: Arc<dyn IssuerDirectory>,
        web_auth: Arc<dyn WebAuthAgent>,
        observer: Arc<dyn IntroductionObserver>,
    ) -> Self {
        IssuerIntroductionController {
            address_source,
            directory,
            web_auth,
            observer,
            store: IssuerStore::new(),
        }
    }

    /// The issuers this controller has persisted.
    pub fn issuer_store(&self) -> &IssuerStore {
        &self.store
    }

    fn notify(&self, event: IntroductionEvent) {
        self.observer.notify(event);
    }

    /// Runs one introduction attempt end to end.
    ///
    /// # Arguments
    /// * `intro_url` - The issuer's introduction URL, as supplied by the user
    /// * `nonce` - One-time token supplied by the user, forwarded unchanged
    ///
    /// # Returns
    /// The issuer-assigned identifier of the persisted record.
    ///
    /// # Errors
    /// - `InvalidArgument` if either argument is empty (the caller enforces
    ///   this before invoking; the check here fails fast on misuse)
    /// - `AddressGeneration` / `IssuerResolution` if the join fails
    /// - `IssuerRegistration` if the continuation or resume step fails
    /// - `DelegatedAuthorization` if the external agent does not return a
    ///   usable success result
    ///
    /// Every failure path re-enables the user action before the error is
    /// returned, so the observer is never left with a disabled action and no
    /// feedback.
    pub async fn start_introduction(
        &mut self,
        intro_url: &str,
        nonce: &str,
    ) -> Result<String, IntroductionError> {
        if intro_url.is_empty() {
            return Err(IntroductionError::InvalidArgument("intro_url is empty"));
        }
        if nonce.is_empty() {
            return Err(IntroductionError::InvalidArgument("nonce is empty"));
        }

        info!(
            "Starting process to identify and introduce issuer at {}",
            intro_url
        );
        self.notify(IntroductionEvent::ProgressStarted);
        self.notify(IntroductionEvent::ActionEnabled(false));

        // Join: all three must succeed; the first failure wins and the
        // remaining futures are dropped, so partial results can neither
        // surface nor cause duplicate side effects.
        let joined = tokio::try_join!(
            self.address_source.fresh_address(),
            async { Ok::<String, IntroductionError>(nonce.to_string()) },
            self.directory.resolve(intro_url),
        );

        let (address, nonce, issuer) = match joined {
            Ok(parts) => parts,
            Err(e) => {
                error!("Error during issuer identification: {}", e);
                // Progress is left for the observer to dismiss through its
                // error path.
                self.notify(IntroductionEvent::ActionEnabled(true));
                return Err(e);
            }
        };

        info!(
            "Issuer identification at {} succeeded. Beginning introduction step.",
            intro_url
        );
        let request = IntroductionRequest::new(address, nonce, issuer);

        if request.issuer.uses_web_auth() {
            self.perform_web_auth(intro_url, request).await
        } else {
            self.perform_standard_introduction(request).await
        }
    }

    /// Registers the joined request directly with the issuer and persists
    /// the resulting record.
    async fn perform_standard_introduction(
        &mut self,
        request: IntroductionRequest,
    ) -> Result<String, IntroductionError> {
        match self.directory.register(&request).await {
            Ok(id) => {
                let id = self.store.save(id, request.issuer, request.address);
                self.did_add_issuer(id)
            }
            Err(e) => {
                error!("Error during issuer introduction: {}", e);
                self.notify(IntroductionEvent::ActionEnabled(true));
                Err(e)
            }
        }
    }

    /// Hands the request to the delegated authorization agent and, on
    /// success, resumes with the address the agent chose.
    async fn perform_web_auth(
        &mut self,
        intro_url: &str,
        request: IntroductionRequest,
    ) -> Result<String, IntroductionError> {
        info!(
            "Handing off to delegated authorization for issuer at {}",
            intro_url
        );
        // Progress is hidden before the handoff; the agent owns the screen
        // for as long as the user interacts with it. No lock is held across
        // this suspension.
        self.notify(IntroductionEvent::ProgressFinished);

        let result = match self.web_auth.authorize(&request).await {
            Ok(result) => result,
            Err(e) => {
                error!("Error during delegated authorization: {}", e);
                self.notify(IntroductionEvent::ActionEnabled(true));
                return Err(e);
            }
        };

        if !result.success {
            self.notify(IntroductionEvent::ActionEnabled(true));
            return Err(IntroductionError::DelegatedAuthorization(
                "authorization was refused or dismissed".into(),
            ));
        }

        // A success result without a usable address violates the agent's
        // contract and is treated as failure.
        let address = match result.address {
            Some(address) if !address.is_empty() => address,
            _ => {
                self.notify(IntroductionEvent::ActionEnabled(true));
                return Err(IntroductionError::DelegatedAuthorization(
                    "success result carried no receiving address".into(),
                ));
            }
        };

        // The address drawn during the join only proved the wallet could
        // generate one; the agent's address is the one that gets registered.
        drop(request);

        self.resume_after_web_auth(intro_url, address).await
    }

    /// Resume step after delegated authorization succeeds: issuer metadata
    /// is resolved again (it may have changed during the external flow) and
    /// the record is persisted with the agent's address.
    async fn resume_after_web_auth(
        &mut self,
        intro_url: &str,
        address: String,
    ) -> Result<String, IntroductionError> {
        self.notify(IntroductionEvent::ProgressStarted);

        match self.directory.resolve(intro_url).await {
            Ok(issuer) => {
                let id = self.store.save(issuer.id.clone(), issuer, address);
                self.did_add_issuer(id)
            }
            Err(e) => {
                error!("Error during issuer introduction: {}", e);
                self.notify(IntroductionEvent::ActionEnabled(true));
                // The join already resolved this issuer once; a failure here
                // belongs to the registration phase of the attempt.
                Err(IntroductionError::IssuerRegistration {
                    category: RegistrationErrorKind::Network,
                    detail: format!("could not re-resolve issuer after authorization: {}", e),
                })
            }
        }
    }

    /// Terminal success: re-enable the action, finish progress, and report
    /// the persisted issuer.
    fn did_add_issuer(&self, id: String) -> Result<String, IntroductionError> {
        info!("Issuer {} added", id);
        self.notify(IntroductionEvent::ActionEnabled(true));
        self.notify(IntroductionEvent::ProgressFinished);
        self.notify(IntroductionEvent::IssuerAdded(id.clone()));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::errors::ResolutionErrorKind;
    use crate::models::issuer::{IntroductionMethod, IssuerResponse};
    use crate::services::web_auth::WebAuthResult;

    const INTRO_URL: &str = "https://issuer.example/intro";

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn test_issuer(method: IntroductionMethod) -> IssuerResponse {
        IssuerResponse {
            id: "https://issuer.example/issuer.json".into(),
            name: "Example Institute".into(),
            email: "certs@issuer.example".into(),
            url: "https://issuer.example".into(),
            introduction_url: INTRO_URL.into(),
            introduction_method: method,
        }
    }

    struct MockAddressSource {
        address: Option<&'static str>,
    }

    #[async_trait]
    impl AddressSource for MockAddressSource {
        async fn fresh_address(&self) -> Result<String, IntroductionError> {
            match self.address {
                Some(address) => Ok(address.into()),
                None => Err(IntroductionError::AddressGeneration(
                    "no key material available".into(),
                )),
            }
        }
    }

    struct MockDirectory {
        issuer: IssuerResponse,
        /// 1-based resolve call number that fails, if any
        fail_resolve_on: Option<usize>,
        /// Issuer-assigned id returned by registration, or None to fail it
        register_reply: Option<&'static str>,
        resolve_calls: AtomicUsize,
        register_calls: AtomicUsize,
        last_registered: Mutex<Option<IntroductionRequest>>,
    }

    impl MockDirectory {
        fn new(issuer: IssuerResponse, register_reply: Option<&'static str>) -> Self {
            MockDirectory {
                issuer,
                fail_resolve_on: None,
                register_reply,
                resolve_calls: AtomicUsize::new(0),
                register_calls: AtomicUsize::new(0),
                last_registered: Mutex::new(None),
            }
        }

        fn failing_resolve_on(mut self, call: usize) -> Self {
            self.fail_resolve_on = Some(call);
            self
        }
    }

    #[async_trait]
    impl IssuerDirectory for MockDirectory {
        async fn resolve(&self, _url: &str) -> Result<IssuerResponse, IntroductionError> {
            let call = self.resolve_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_resolve_on == Some(call) {
                return Err(IntroductionError::IssuerResolution {
                    category: ResolutionErrorKind::Network,
                    detail: "connection refused".into(),
                });
            }
            Ok(self.issuer.clone())
        }

        async fn register(
            &self,
            request: &IntroductionRequest,
        ) -> Result<String, IntroductionError> {
            self.register_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_registered.lock().unwrap() = Some(request.clone());
            match self.register_reply {
                Some(id) => Ok(id.into()),
                None => Err(IntroductionError::IssuerRegistration {
                    category: RegistrationErrorKind::BadRequest,
                    detail: "bad nonce".into(),
                }),
            }
        }
    }

    struct MockAgent {
        result: Option<WebAuthResult>,
        calls: AtomicUsize,
    }

    impl MockAgent {
        fn returning(result: WebAuthResult) -> Self {
            MockAgent {
                result: Some(result),
                calls: AtomicUsize::new(0),
            }
        }

        fn unused() -> Self {
            MockAgent {
                result: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WebAuthAgent for MockAgent {
        async fn authorize(
            &self,
            _request: &IntroductionRequest,
        ) -> Result<WebAuthResult, IntroductionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Some(result) => Ok(result.clone()),
                None => panic!("web auth agent should not be invoked"),
            }
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<IntroductionEvent>>,
    }

    impl RecordingObserver {
        fn events(&self) -> Vec<IntroductionEvent> {
            self.events.lock().unwrap().clone()
        }

        fn last_action_enabled(&self) -> Option<bool> {
            self.events()
                .iter()
                .rev()
                .find_map(|event| match event {
                    IntroductionEvent::ActionEnabled(enabled) => Some(*enabled),
                    _ => None,
                })
        }

        fn issuer_added_count(&self) -> usize {
            self.events()
                .iter()
                .filter(|event| matches!(event, IntroductionEvent::IssuerAdded(_)))
                .count()
        }
    }

    impl IntroductionObserver for RecordingObserver {
        fn notify(&self, event: IntroductionEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn controller(
        address: Option<&'static str>,
        directory: Arc<MockDirectory>,
        agent: Arc<MockAgent>,
        observer: Arc<RecordingObserver>,
    ) -> IssuerIntroductionController {
        IssuerIntroductionController::new(
            Arc::new(MockAddressSource { address }),
            directory,
            agent,
            observer,
        )
    }

    #[tokio::test]
    async fn standard_introduction_persists_one_record() {
        init_logging();
        let directory = Arc::new(MockDirectory::new(
            test_issuer(IntroductionMethod::Basic),
            Some("iss-42"),
        ));
        let agent = Arc::new(MockAgent::unused());
        let observer = Arc::new(RecordingObserver::default());
        let mut controller = controller(
            Some("1FreshAddr"),
            directory.clone(),
            agent.clone(),
            observer.clone(),
        );

        let id = controller
            .start_introduction(INTRO_URL, "abc123")
            .await
            .unwrap();

        assert_eq!(id, "iss-42");
        let registered = directory.last_registered.lock().unwrap().clone().unwrap();
        assert_eq!(registered.nonce, "abc123");
        assert_eq!(registered.address, "1FreshAddr");

        let record = controller.issuer_store().get("iss-42").unwrap();
        assert_eq!(record.address, "1FreshAddr");
        assert_eq!(controller.issuer_store().count(), 1);
        assert_eq!(observer.issuer_added_count(), 1);
        assert_eq!(agent.calls.load(Ordering::SeqCst), 0);

        assert_eq!(
            observer.events(),
            vec![
                IntroductionEvent::ProgressStarted,
                IntroductionEvent::ActionEnabled(false),
                IntroductionEvent::ActionEnabled(true),
                IntroductionEvent::ProgressFinished,
                IntroductionEvent::IssuerAdded("iss-42".into()),
            ]
        );
    }

    #[tokio::test]
    async fn join_resolution_failure_registers_nothing() {
        init_logging();
        let directory = Arc::new(
            MockDirectory::new(test_issuer(IntroductionMethod::Basic), Some("iss-42"))
                .failing_resolve_on(1),
        );
        let observer = Arc::new(RecordingObserver::default());
        let mut controller = controller(
            Some("1FreshAddr"),
            directory.clone(),
            Arc::new(MockAgent::unused()),
            observer.clone(),
        );

        let err = controller
            .start_introduction(INTRO_URL, "abc123")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IntroductionError::IssuerResolution {
                category: ResolutionErrorKind::Network,
                ..
            }
        ));
        assert_eq!(directory.register_calls.load(Ordering::SeqCst), 0);
        assert_eq!(controller.issuer_store().count(), 0);
        assert_eq!(observer.last_action_enabled(), Some(true));
        assert_eq!(observer.issuer_added_count(), 0);
        // Progress is dismissed by the observer's error path, so no
        // ProgressFinished is emitted here.
        assert!(!observer
            .events()
            .contains(&IntroductionEvent::ProgressFinished));
    }

    #[tokio::test]
    async fn join_address_failure_registers_nothing() {
        init_logging();
        let directory = Arc::new(MockDirectory::new(
            test_issuer(IntroductionMethod::Basic),
            Some("iss-42"),
        ));
        let observer = Arc::new(RecordingObserver::default());
        let mut controller = controller(
            None,
            directory.clone(),
            Arc::new(MockAgent::unused()),
            observer.clone(),
        );

        let err = controller
            .start_introduction(INTRO_URL, "abc123")
            .await
            .unwrap_err();

        assert!(matches!(err, IntroductionError::AddressGeneration(_)));
        assert_eq!(directory.register_calls.load(Ordering::SeqCst), 0);
        assert_eq!(controller.issuer_store().count(), 0);
        assert_eq!(observer.last_action_enabled(), Some(true));
    }

    #[tokio::test]
    async fn registration_failure_leaves_action_enabled() {
        init_logging();
        let directory = Arc::new(MockDirectory::new(
            test_issuer(IntroductionMethod::Basic),
            None,
        ));
        let observer = Arc::new(RecordingObserver::default());
        let mut controller = controller(
            Some("1FreshAddr"),
            directory.clone(),
            Arc::new(MockAgent::unused()),
            observer.clone(),
        );

        let err = controller
            .start_introduction(INTRO_URL, "abc123")
            .await
            .unwrap_err();

        assert!(matches!(err, IntroductionError::IssuerRegistration { .. }));
        assert_eq!(directory.register_calls.load(Ordering::SeqCst), 1);
        assert_eq!(controller.issuer_store().count(), 0);
        assert_eq!(observer.last_action_enabled(), Some(true));
    }

    #[tokio::test]
    async fn web_auth_success_persists_delegated_address() {
        init_logging();
        let directory = Arc::new(MockDirectory::new(
            test_issuer(IntroductionMethod::WebAuth),
            Some("iss-42"),
        ));
        let agent = Arc::new(MockAgent::returning(WebAuthResult::succeeded(
            "1DelegatedAddr",
        )));
        let observer = Arc::new(RecordingObserver::default());
        let mut controller = controller(
            Some("1FreshAddr"),
            directory.clone(),
            agent.clone(),
            observer.clone(),
        );

        let id = controller
            .start_introduction(INTRO_URL, "abc123")
            .await
            .unwrap();

        // Standard registration is never invoked on the web-auth branch;
        // the issuer is re-resolved for the resume leg.
        assert_eq!(directory.register_calls.load(Ordering::SeqCst), 0);
        assert_eq!(directory.resolve_calls.load(Ordering::SeqCst), 2);
        assert_eq!(agent.calls.load(Ordering::SeqCst), 1);

        // The persisted address is the agent's, not the joined one.
        let record = controller.issuer_store().get(&id).unwrap();
        assert_eq!(record.address, "1DelegatedAddr");
        assert_eq!(controller.issuer_store().count(), 1);
        assert_eq!(observer.issuer_added_count(), 1);
        assert_eq!(observer.last_action_enabled(), Some(true));
    }

    #[tokio::test]
    async fn web_auth_dismissal_persists_nothing() {
        init_logging();
        let directory = Arc::new(MockDirectory::new(
            test_issuer(IntroductionMethod::WebAuth),
            Some("iss-42"),
        ));
        let observer = Arc::new(RecordingObserver::default());
        let mut controller = controller(
            Some("1FreshAddr"),
            directory.clone(),
            Arc::new(MockAgent::returning(WebAuthResult::dismissed())),
            observer.clone(),
        );

        let err = controller
            .start_introduction(INTRO_URL, "abc123")
            .await
            .unwrap_err();

        assert!(matches!(err, IntroductionError::DelegatedAuthorization(_)));
        assert_eq!(controller.issuer_store().count(), 0);
        assert_eq!(directory.register_calls.load(Ordering::SeqCst), 0);
        assert_eq!(observer.last_action_enabled(), Some(true));
    }

    #[tokio::test]
    async fn web_auth_success_without_address_is_a_contract_violation() {
        init_logging();
        let directory = Arc::new(MockDirectory::new(
            test_issuer(IntroductionMethod::WebAuth),
            Some("iss-42"),
        ));
        let observer = Arc::new(RecordingObserver::default());
        let mut controller = controller(
            Some("1FreshAddr"),
            directory.clone(),
            Arc::new(MockAgent::returning(WebAuthResult {
                success: true,
                address: None,
            })),
            observer.clone(),
        );

        let err = controller
            .start_introduction(INTRO_URL, "abc123")
            .await
            .unwrap_err();

        assert!(matches!(err, IntroductionError::DelegatedAuthorization(_)));
        assert_eq!(controller.issuer_store().count(), 0);
        assert_eq!(observer.last_action_enabled(), Some(true));
    }

    #[tokio::test]
    async fn web_auth_success_with_empty_address_is_a_contract_violation() {
        init_logging();
        let directory = Arc::new(MockDirectory::new(
            test_issuer(IntroductionMethod::WebAuth),
            Some("iss-42"),
        ));
        let observer = Arc::new(RecordingObserver::default());
        let mut controller = controller(
            Some("1FreshAddr"),
            directory.clone(),
            Arc::new(MockAgent::returning(WebAuthResult {
                success: true,
                address: Some(String::new()),
            })),
            observer.clone(),
        );

        let err = controller
            .start_introduction(INTRO_URL, "abc123")
            .await
            .unwrap_err();

        assert!(matches!(err, IntroductionError::DelegatedAuthorization(_)));
        assert_eq!(controller.issuer_store().count(), 0);
    }

    #[tokio::test]
    async fn resume_resolution_failure_reports_registration_error() {
        init_logging();
        let directory = Arc::new(
            MockDirectory::new(test_issuer(IntroductionMethod::WebAuth), Some("iss-42"))
                .failing_resolve_on(2),
        );
        let observer = Arc::new(RecordingObserver::default());
        let mut controller = controller(
            Some("1FreshAddr"),
            directory.clone(),
            Arc::new(MockAgent::returning(WebAuthResult::succeeded(
                "1DelegatedAddr",
            ))),
            observer.clone(),
        );

        let err = controller
            .start_introduction(INTRO_URL, "abc123")
            .await
            .unwrap_err();

        assert!(matches!(err, IntroductionError::IssuerRegistration { .. }));
        assert_eq!(controller.issuer_store().count(), 0);
        assert_eq!(observer.last_action_enabled(), Some(true));
    }

    #[tokio::test]
    async fn empty_arguments_fail_fast() {
        init_logging();
        let directory = Arc::new(MockDirectory::new(
            test_issuer(IntroductionMethod::Basic),
            Some("iss-42"),
        ));
        let observer = Arc::new(RecordingObserver::default());
        let mut controller = controller(
            Some("1FreshAddr"),
            directory.clone(),
            Arc::new(MockAgent::unused()),
            observer.clone(),
        );

        let err = controller.start_introduction("", "abc123").await.unwrap_err();
        assert!(matches!(err, IntroductionError::InvalidArgument(_)));

        let err = controller
            .start_introduction(INTRO_URL, "")
            .await
            .unwrap_err();
        assert!(matches!(err, IntroductionError::InvalidArgument(_)));

        // Misuse is rejected before any side effect.
        assert!(observer.events().is_empty());
        assert_eq!(directory.resolve_calls.load(Ordering::SeqCst), 0);
    }
}
