//! Shared collaborators for the client integration tests.
//!
//! `FakeProvider` behaves like a hosted identity provider: every successful
//! call also pushes the resulting session onto its event stream.
//! `MemoryDirectory` answers immediately unless the test put a hold on an
//! external id, in which case lookups for it wait until the hold is released.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use buzzer::prelude::*;
use tokio::sync::{mpsc, watch};

// =========================================================================
// Provider
// =========================================================================

pub struct FakeProvider {
    events: Mutex<Option<mpsc::UnboundedSender<Option<ExternalSession>>>>,
    stream: Mutex<Option<SessionEvents>>,
    popup: Mutex<Result<ExternalSession, IdentityError>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            events: Mutex::new(Some(tx)),
            stream: Mutex::new(Some(rx)),
            popup: Mutex::new(Err(IdentityError::new(
                IdentityErrorCode::PopupClosed,
                "closed",
            ))),
        }
    }

    /// What the next popup sign-in returns.
    pub fn set_popup(&self, result: Result<ExternalSession, IdentityError>) {
        *self.popup.lock().unwrap() = result;
    }

    /// Pushes a session change as if it came from the provider itself.
    pub fn emit(&self, session: Option<ExternalSession>) {
        if let Some(events) = self.events.lock().unwrap().as_ref() {
            let _ = events.send(session);
        }
    }

    /// Ends the session stream, which stops the client.
    pub fn hang_up(&self) {
        self.events.lock().unwrap().take();
    }

    fn account(email: &str) -> ExternalSession {
        ExternalSession::new(format!("uid-{email}")).with_token("token")
    }
}

impl IdentityClient for FakeProvider {
    fn subscribe(&self) -> SessionEvents {
        self.stream
            .lock()
            .unwrap()
            .take()
            .expect("subscribe must be called only once")
    }

    async fn sign_up(&self, c: &Credentials) -> Result<ExternalSession, IdentityError> {
        if c.email.starts_with("taken") {
            return Err(IdentityError::from_provider_message(
                "Firebase: Error (auth/email-already-in-use).",
            ));
        }
        let session = Self::account(&c.email);
        self.emit(Some(session.clone()));
        Ok(session)
    }

    async fn sign_in(&self, c: &Credentials) -> Result<ExternalSession, IdentityError> {
        if c.password == "wrong" {
            return Err(IdentityError::from_provider_message(
                "Firebase: Error (auth/invalid-credential).",
            ));
        }
        let session = Self::account(&c.email);
        self.emit(Some(session.clone()));
        Ok(session)
    }

    async fn sign_in_with_provider(&self) -> Result<ExternalSession, IdentityError> {
        let result = self.popup.lock().unwrap().clone();
        if let Ok(session) = &result {
            self.emit(Some(session.clone()));
        }
        result
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.emit(None);
        Ok(())
    }
}

// =========================================================================
// Directory
// =========================================================================

#[derive(Default)]
pub struct MemoryDirectory {
    users: Mutex<HashMap<String, InternalUser>>,
    holds: Mutex<HashMap<String, watch::Receiver<bool>>>,
    lookups: Mutex<Vec<String>>,
    next_id: Mutex<u64>,
}

impl MemoryDirectory {
    pub fn with_user(self, id: u64, external_id: &str, username: &str) -> Self {
        self.users.lock().unwrap().insert(
            external_id.to_string(),
            InternalUser {
                id: UserId(id),
                external_id: ExternalId::new(external_id),
                username: username.to_string(),
            },
        );
        self
    }

    /// Makes lookups for `external_id` wait until the returned sender sends
    /// `true` (or is dropped).
    pub fn hold(&self, external_id: &str) -> watch::Sender<bool> {
        let (tx, rx) = watch::channel(false);
        self.holds.lock().unwrap().insert(external_id.to_string(), rx);
        tx
    }

    /// External ids looked up so far, oldest first.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl UserDirectory for MemoryDirectory {
    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<InternalUser>, LookupError> {
        self.lookups.lock().unwrap().push(external_id.to_string());

        let hold = self.holds.lock().unwrap().get(external_id.as_str()).cloned();
        if let Some(mut hold) = hold {
            let _ = hold.wait_for(|released| *released).await;
        }

        if external_id.as_str().starts_with("uid-broken") {
            return Err(LookupError::Rejected {
                messages: vec!["User lookup failed".into()],
            });
        }
        Ok(self.users.lock().unwrap().get(external_id.as_str()).cloned())
    }

    async fn create_user(
        &self,
        username: &str,
        external_id: &ExternalId,
    ) -> Result<InternalUser, LookupError> {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        let user = InternalUser {
            id: UserId(100 + *next),
            external_id: external_id.clone(),
            username: username.to_string(),
        };
        self.users
            .lock()
            .unwrap()
            .insert(external_id.to_string(), user.clone());
        Ok(user)
    }
}

// =========================================================================
// Harness
// =========================================================================

pub struct Harness {
    pub provider: Arc<FakeProvider>,
    pub directory: Arc<MemoryDirectory>,
    pub router: Arc<MemoryRouter>,
    pub store: SessionStore<Arc<FakeProvider>, Arc<MemoryDirectory>>,
    pub flows: AuthFlows<Arc<FakeProvider>, Arc<MemoryDirectory>, Arc<MemoryRouter>>,
    pub outcome: watch::Receiver<GuardOutcome>,
    pub task: tokio::task::JoinHandle<Result<(), BuzzerError>>,
}

/// Builds a client on `start_path` and spawns its event loop.
pub fn start(directory: MemoryDirectory, start_path: &str) -> Harness {
    let provider = Arc::new(FakeProvider::new());
    let directory = Arc::new(directory);
    let router = Arc::new(MemoryRouter::new(start_path));

    let client = BuzzerClient::builder().build(
        Arc::clone(&provider),
        Arc::clone(&directory),
        Arc::clone(&router),
    );
    let store = client.store();
    let flows = client.flows();
    let outcome = client.outcome();
    let task = tokio::spawn(client.run());

    Harness {
        provider,
        directory,
        router,
        store,
        flows,
        outcome,
        task,
    }
}

impl Harness {
    /// Waits for the published outcome to satisfy `predicate`.
    pub async fn outcome_where(
        &mut self,
        predicate: impl FnMut(&GuardOutcome) -> bool,
    ) -> GuardOutcome {
        tokio::time::timeout(Duration::from_secs(5), self.outcome.wait_for(predicate))
            .await
            .expect("outcome did not settle in time")
            .expect("client stopped")
            .clone()
    }

    /// Waits for the session state to satisfy `predicate`.
    pub async fn state_where(
        &mut self,
        predicate: impl FnMut(&SessionState) -> bool,
    ) -> SessionState {
        tokio::time::timeout(Duration::from_secs(5), self.store.wait_for(predicate))
            .await
            .expect("state did not settle in time")
            .expect("reconciler stopped")
    }
}

/// Lets every ready task on the test runtime make progress.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
