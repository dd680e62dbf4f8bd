/// User interactions the page reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    UserIconClicked,
    LoginClosed,
    LoginSubmitted { username: String, password: String },
    SignupSubmitted { email: String, activity: String },
    DeleteClicked { activity: String, email: String },
    Refresh,
}

/// Blocking prompts shown to the user.
pub trait Dialogs {
    fn alert(&self, text: &str);
    fn confirm(&self, text: &str) -> impl Future<Output = bool> + Send;
}
