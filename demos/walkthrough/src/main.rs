use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use buzzer::prelude::*;
use tokio::sync::{mpsc, watch};

// ---------------------------------------------------------------------------
// In-memory provider
// ---------------------------------------------------------------------------

/// Email/password accounts plus a scripted popup account.
struct LocalProvider {
    events: Mutex<Option<mpsc::UnboundedSender<Option<ExternalSession>>>>,
    stream: Mutex<Option<SessionEvents>>,
    accounts: Mutex<HashMap<String, String>>,
}

impl LocalProvider {
    fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            events: Mutex::new(Some(tx)),
            stream: Mutex::new(Some(rx)),
            accounts: Mutex::new(HashMap::new()),
        }
    }

    fn emit(&self, session: Option<ExternalSession>) {
        if let Some(tx) = lock(&self.events).as_ref() {
            let _ = tx.send(session);
        }
    }

    /// Closes the session stream, which stops the client.
    fn shut_down(&self) {
        lock(&self.events).take();
    }

    fn session_for(email: &str) -> ExternalSession {
        ExternalSession::new(format!("local:{email}")).with_token(format!("token-{email}"))
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn provider_error(code: &str) -> IdentityError {
    IdentityError::from_provider_message(format!("Firebase: Error ({code})."))
}

impl IdentityClient for LocalProvider {
    fn subscribe(&self) -> SessionEvents {
        lock(&self.stream).take().unwrap_or_else(|| mpsc::unbounded_channel().1)
    }

    async fn sign_up(&self, c: &Credentials) -> Result<ExternalSession, IdentityError> {
        {
            let mut accounts = lock(&self.accounts);
            if accounts.contains_key(&c.email) {
                return Err(provider_error("auth/email-already-in-use"));
            }
            accounts.insert(c.email.clone(), c.password.clone());
        }
        let session = Self::session_for(&c.email);
        self.emit(Some(session.clone()));
        Ok(session)
    }

    async fn sign_in(&self, c: &Credentials) -> Result<ExternalSession, IdentityError> {
        match lock(&self.accounts).get(&c.email) {
            Some(password) if *password == c.password => {}
            Some(_) => return Err(provider_error("auth/invalid-credential")),
            None => return Err(provider_error("auth/user-not-found")),
        }
        let session = Self::session_for(&c.email);
        self.emit(Some(session.clone()));
        Ok(session)
    }

    async fn sign_in_with_provider(&self) -> Result<ExternalSession, IdentityError> {
        let session = ExternalSession::new("popup:quizmaster").with_display_name("Quiz Master");
        self.emit(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.emit(None);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory player directory
// ---------------------------------------------------------------------------

#[derive(Default)]
struct LocalDirectory {
    players: Mutex<Vec<InternalUser>>,
}

impl UserDirectory for LocalDirectory {
    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<InternalUser>, LookupError> {
        Ok(lock(&self.players).iter().find(|u| &u.external_id == external_id).cloned())
    }

    async fn create_user(
        &self,
        username: &str,
        external_id: &ExternalId,
    ) -> Result<InternalUser, LookupError> {
        let mut players = lock(&self.players);
        if players.iter().any(|u| u.username == username) {
            return Err(LookupError::Rejected {
                messages: vec![format!("Username {username} is already taken")],
            });
        }
        let user = InternalUser {
            id: UserId(players.len() as u64 + 1),
            external_id: external_id.clone(),
            username: username.to_string(),
        };
        players.push(user.clone());
        Ok(user)
    }
}

// ---------------------------------------------------------------------------
// Walkthrough
// ---------------------------------------------------------------------------

const CONFIG: &str = r#"{
    "route": { "public_routes": ["/", "/sign-in", "/sign-up", "/leaderboard"] }
}"#;

fn show(outcome: &GuardOutcome) -> String {
    match outcome {
        GuardOutcome::Children => "page".to_string(),
        GuardOutcome::Loading(kind) => format!("placeholder \"{}\"", kind.message()),
        GuardOutcome::Redirecting { to } => format!("redirecting to {to}"),
    }
}

/// Lets the client loop catch up with whatever the last step did.
async fn idle(outcome: &mut watch::Receiver<GuardOutcome>) {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
    let now = outcome.borrow_and_update().clone();
    println!("    -> {}", show(&now));
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    buzzer::logging::init();

    let provider = Arc::new(LocalProvider::new());
    let router = Arc::new(MemoryRouter::new("/dashboard"));

    let client = BuzzerClient::builder()
        .config(ClientConfig::from_json_str(CONFIG)?)
        .build(Arc::clone(&provider), LocalDirectory::default(), Arc::clone(&router));
    let store = client.store();
    let flows = client.flows();
    let config = client.route_config().clone();
    let mut outcome = client.outcome();
    let running = tokio::spawn(client.run());

    println!("[1] open /dashboard before the provider has answered");
    idle(&mut outcome).await;

    println!("[2] provider reports no session");
    provider.emit(None);
    idle(&mut outcome).await;
    println!("    at {}", router.current_path());

    println!("[3] the leaderboard is public");
    router.visit("/leaderboard");
    idle(&mut outcome).await;

    println!("[4] sign up as alex");
    let form = SignUpForm {
        username: "alex".into(),
        email: "alex@example.com".into(),
        password: "hunter22".into(),
    };
    match flows.sign_up(&form).await {
        Ok(path) => println!("    landed on {path}"),
        Err(feedback) => println!("    {:?}: {}", feedback.severity, feedback.message),
    }
    idle(&mut outcome).await;
    println!("    nav bar links to {}", home_path(&store.state(), &config));

    println!("[5] peek at someone else's page");
    router.visit("/users/7/stats");
    idle(&mut outcome).await;
    println!("    at {}", router.current_path());

    println!("[6] sign out, then fumble the password");
    flows.sign_out().await.ok();
    idle(&mut outcome).await;
    let wrong = Credentials::new("alex@example.com", "hunter2");
    if let Err(feedback) = flows.sign_in(&wrong).await {
        println!("    {:?}: {}", feedback.severity, feedback.message);
    }

    println!("[7] sign up with the popup provider");
    match flows.sign_up_with_provider().await {
        Ok(path) => println!("    landed on {path}"),
        Err(feedback) => println!("    {:?}: {}", feedback.severity, feedback.message),
    }
    idle(&mut outcome).await;
    if let Some(user) = store.state().internal_user() {
        println!("    signed in as {} (#{})", user.username, user.id);
    }

    println!("navigations: {:?}", router.navigations());

    provider.shut_down();
    running.await??;
    tracing::info!("walkthrough finished");
    Ok(())
}
