//! In-memory model of the signup page.
//!
//! The controller only ever mutates a [`PageView`]; the renderers in
//! [`crate::ui`] turn it into HTML or terminal text.

use crate::models::{Activity, Session};

pub const SELECT_PLACEHOLDER: &str = "-- Select an activity --";
pub const LOAD_FAILED_NOTICE: &str = "Failed to load activities. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    pub fn css_class(self) -> &'static str {
        match self {
            MessageKind::Success => "success",
            MessageKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteControl {
    pub activity: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRow {
    pub email: String,
    pub delete: Option<DeleteControl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCard {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub spots_left: i64,
    pub participants: Vec<ParticipantRow>,
}

impl ActivityCard {
    /// Delete controls are only attached while a teacher is logged in.
    pub fn build(name: &str, activity: &Activity, with_delete: bool) -> Self {
        let participants = activity
            .participants
            .iter()
            .map(|email| ParticipantRow {
                email: email.clone(),
                delete: with_delete.then(|| DeleteControl {
                    activity: name.to_string(),
                    email: email.clone(),
                }),
            })
            .collect();

        Self {
            name: name.to_string(),
            description: activity.description.clone(),
            schedule: activity.schedule.clone(),
            spots_left: activity.spots_left(),
            participants,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActivityListView {
    #[default]
    Loading,
    Loaded(Vec<ActivityCard>),
    Failed,
}

impl ActivityListView {
    pub fn cards(&self) -> &[ActivityCard] {
        match self {
            ActivityListView::Loaded(cards) => cards,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthView {
    pub status_text: String,
    pub logged_in: bool,
    pub teacher_notice_hidden: bool,
    pub signup_enabled: bool,
}

impl AuthView {
    pub fn for_session(session: Option<&Session>) -> Self {
        match session {
            Some(session) => Self {
                status_text: format!("Logged in as {}", session.username),
                logged_in: true,
                teacher_notice_hidden: true,
                signup_enabled: true,
            },
            None => Self::default(),
        }
    }
}

impl Default for AuthView {
    fn default() -> Self {
        Self {
            status_text: String::new(),
            logged_in: false,
            teacher_notice_hidden: false,
            signup_enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub text: String,
    pub kind: MessageKind,
    pub hidden: bool,
    /// Bumped on every show so a stale hide timer can tell it lost the slot.
    pub generation: u64,
}

impl Default for MessageView {
    fn default() -> Self {
        Self {
            text: String::new(),
            kind: MessageKind::Success,
            hidden: true,
            generation: 0,
        }
    }
}

impl MessageView {
    pub fn show(&mut self, kind: MessageKind, text: impl Into<String>) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.text = text.into();
        self.kind = kind;
        self.hidden = false;
        self.generation
    }

    /// Returns false when a newer message has replaced the one `generation` refers to.
    pub fn hide_if_current(&mut self, generation: u64) -> bool {
        if self.generation != generation {
            return false;
        }
        self.hidden = true;
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginModalView {
    pub open: bool,
    pub username: String,
    pub password: String,
    pub message: Option<String>,
}

impl LoginModalView {
    pub fn reset_form(&mut self) {
        self.username.clear();
        self.password.clear();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupFormView {
    pub email: String,
    pub activity: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub activities: ActivityListView,
    pub activity_options: Vec<String>,
    pub auth: AuthView,
    pub message: MessageView,
    pub login: LoginModalView,
    pub signup: SignupFormView,
}

impl Default for PageView {
    fn default() -> Self {
        Self {
            activities: ActivityListView::Loading,
            activity_options: vec![SELECT_PLACEHOLDER.to_string()],
            auth: AuthView::default(),
            message: MessageView::default(),
            login: LoginModalView::default(),
            signup: SignupFormView::default(),
        }
    }
}

impl PageView {
    pub fn show_activities(&mut self, activities: &[(String, Activity)], with_delete: bool) {
        let cards = activities
            .iter()
            .map(|(name, activity)| ActivityCard::build(name, activity, with_delete))
            .collect();
        self.activities = ActivityListView::Loaded(cards);

        self.activity_options.clear();
        self.activity_options.push(SELECT_PLACEHOLDER.to_string());
        self.activity_options
            .extend(activities.iter().map(|(name, _)| name.clone()));
    }

    /// The option list is left as it was; only the card area shows the notice.
    pub fn show_load_failure(&mut self) {
        self.activities = ActivityListView::Failed;
    }
}
