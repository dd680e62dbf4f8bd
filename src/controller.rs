use crate::api::{DirectoryApi, Reply, UNAUTHORIZED};
use crate::events::{Dialogs, UiEvent};
use crate::models::{LoginRequest, Session};
use crate::storage::SessionStore;
use crate::view::{AuthView, MessageKind, PageView, SignupFormView};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// How long a success or error message stays visible.
pub const MESSAGE_TTL: Duration = Duration::from_secs(5);

const GENERIC_ERROR: &str = "An error occurred";
const LOGIN_FAILED: &str = "Login failed";
const LOGIN_UNREACHABLE: &str = "Login failed. Please try again.";

#[derive(Debug, Clone, Copy)]
enum ParticipantChange {
    Signup,
    Unregister,
}

impl ParticipantChange {
    fn login_required(self) -> &'static str {
        match self {
            ParticipantChange::Signup => "You must be logged in as a teacher to register students.",
            ParticipantChange::Unregister => {
                "You must be logged in as a teacher to unregister students."
            }
        }
    }

    fn unreachable(self) -> &'static str {
        match self {
            ParticipantChange::Signup => "Failed to sign up. Please try again.",
            ParticipantChange::Unregister => "Failed to unregister. Please try again.",
        }
    }
}

/// Drives the signup page: owns the session, talks to the directory and
/// keeps the [`PageView`] current.
///
/// Every operation takes `&mut self`, so operations issued through one client
/// never overlap. Failures end up in the view or the log, never in the caller.
pub struct ActivityClient<A, S, D> {
    api: A,
    store: S,
    dialogs: D,
    session: Option<Session>,
    view: Arc<Mutex<PageView>>,
}

impl<A, S, D> ActivityClient<A, S, D>
where
    A: DirectoryApi,
    S: SessionStore,
    D: Dialogs,
{
    pub fn new(api: A, store: S, dialogs: D) -> Self {
        Self {
            api,
            store,
            dialogs,
            session: None,
            view: Arc::new(Mutex::new(PageView::default())),
        }
    }

    pub async fn snapshot(&self) -> PageView {
        self.view.lock().await.clone()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Restores the stored session and loads the activity list.
    pub async fn start(&mut self) {
        self.session = self.store.load().await;
        if let Some(session) = &self.session {
            info!(user = %session.username, "restored session");
        }
        self.sync_auth().await;
        self.load_activities().await;
    }

    pub async fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::UserIconClicked => self.user_icon_clicked().await,
            UiEvent::LoginClosed => self.close_login().await,
            UiEvent::LoginSubmitted { username, password } => {
                self.login(&username, &password).await
            }
            UiEvent::SignupSubmitted { email, activity } => self.signup(&email, &activity).await,
            UiEvent::DeleteClicked { activity, email } => {
                self.unregister(&activity, &email).await
            }
            UiEvent::Refresh => self.load_activities().await,
        }
    }

    pub async fn load_activities(&mut self) {
        match self.api.list_activities().await {
            Ok(activities) => {
                let with_delete = self.session.is_some();
                self.view
                    .lock()
                    .await
                    .show_activities(&activities, with_delete);
            }
            Err(err) => {
                error!("Error fetching activities: {err}");
                self.view.lock().await.show_load_failure();
            }
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) {
        {
            let mut view = self.view.lock().await;
            view.login.username = username.to_string();
            view.login.password = password.to_string();
        }

        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        match self.api.login(&request).await {
            Ok(Reply::Accepted(resp)) => {
                let session = Session::from(resp);
                if let Err(err) = self.store.save(&session).await {
                    error!("failed to persist session: {err}");
                }
                info!(user = %session.username, "logged in");
                self.session = Some(session);
                {
                    let mut view = self.view.lock().await;
                    view.login.open = false;
                    view.login.reset_form();
                }
                self.sync_auth().await;
                self.load_activities().await;
            }
            Ok(Reply::Rejected { status, detail }) => {
                warn!(status, "login rejected");
                self.view.lock().await.login.message =
                    Some(detail.unwrap_or_else(|| LOGIN_FAILED.to_string()));
            }
            Err(err) => {
                error!("Login error: {err}");
                self.view.lock().await.login.message = Some(LOGIN_UNREACHABLE.to_string());
            }
        }
    }

    pub async fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(err) = self.api.logout(&session.token).await {
                error!("Logout error: {err}");
            }
            info!(user = %session.username, "logged out");
        }

        if let Err(err) = self.store.clear().await {
            error!("failed to clear stored session: {err}");
        }
        self.sync_auth().await;
        self.load_activities().await;
    }

    pub async fn signup(&mut self, email: &str, activity: &str) {
        {
            let mut view = self.view.lock().await;
            view.signup.email = email.to_string();
            view.signup.activity = activity.to_string();
        }
        self.change_participant(ParticipantChange::Signup, activity, email)
            .await;
    }

    pub async fn unregister(&mut self, activity: &str, email: &str) {
        self.change_participant(ParticipantChange::Unregister, activity, email)
            .await;
    }

    async fn change_participant(&mut self, change: ParticipantChange, activity: &str, email: &str) {
        let Some(token) = self.session.as_ref().map(|s| s.token.clone()) else {
            self.dialogs.alert(change.login_required());
            return;
        };

        let outcome = match change {
            ParticipantChange::Signup => self.api.signup(&token, activity, email).await,
            ParticipantChange::Unregister => self.api.unregister(&token, activity, email).await,
        };

        match outcome {
            Ok(Reply::Accepted(resp)) => {
                self.show_message(MessageKind::Success, resp.message).await;
                if matches!(change, ParticipantChange::Signup) {
                    self.view.lock().await.signup = SignupFormView::default();
                }
                self.load_activities().await;
            }
            Ok(Reply::Rejected { status, detail }) => {
                self.show_message(
                    MessageKind::Error,
                    detail.unwrap_or_else(|| GENERIC_ERROR.to_string()),
                )
                .await;
                if status == UNAUTHORIZED {
                    info!("session rejected by directory, logging out");
                    self.logout().await;
                }
            }
            Err(err) => {
                error!(?change, "participant change failed: {err}");
                self.show_message(MessageKind::Error, change.unreachable())
                    .await;
            }
        }
    }

    async fn user_icon_clicked(&mut self) {
        let Some(username) = self.session.as_ref().map(|s| s.username.clone()) else {
            self.view.lock().await.login.open = true;
            return;
        };

        let prompt = format!("Logged in as {username}. Do you want to logout?");
        if self.dialogs.confirm(&prompt).await {
            self.logout().await;
        }
    }

    async fn close_login(&mut self) {
        let mut view = self.view.lock().await;
        view.login.open = false;
        view.login.reset_form();
        view.login.message = None;
    }

    async fn sync_auth(&self) {
        self.view.lock().await.auth = AuthView::for_session(self.session.as_ref());
    }

    async fn show_message(&self, kind: MessageKind, text: impl Into<String>) {
        let generation = self.view.lock().await.message.show(kind, text);

        let view = Arc::clone(&self.view);
        tokio::spawn(async move {
            tokio::time::sleep(MESSAGE_TTL).await;
            view.lock().await.message.hide_if_current(generation);
        });
    }
}
