//! Shared test fixtures: an in-memory backend that records every call.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;

use clicktag::backend::{
    Conversation, ConversationPage, CreatedEventLabel, Customer, EventLabel, Profile, ProfileKey,
    Session, SessionPage, SessionQuery, TaggingBackend,
};
use clicktag::errors::{ClickTagError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    GetProfile(ProfileKey),
    SearchSessions(SessionQuery),
    CreateEventLabel(EventLabel),
}

/// Mock backend for pipeline and handler tests
#[derive(Default)]
pub struct MockBackend {
    pub profile: Option<Profile>,
    pub profile_error: Option<ClickTagError>,
    pub sessions: Vec<Session>,
    pub session_error: Option<ClickTagError>,
    pub label_error: Option<ClickTagError>,
    calls: Mutex<Vec<BackendCall>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn with_sessions(mut self, sessions: Vec<Session>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn failing_profile(mut self, error: ClickTagError) -> Self {
        self.profile_error = Some(error);
        self
    }

    pub fn failing_sessions(mut self, error: ClickTagError) -> Self {
        self.session_error = Some(error);
        self
    }

    pub fn failing_label(mut self, error: ClickTagError) -> Self {
        self.label_error = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<EventLabel> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::CreateEventLabel(label) => Some(label),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TaggingBackend for MockBackend {
    async fn get_profile(&self, key: &ProfileKey) -> Result<Option<Profile>> {
        self.record(BackendCall::GetProfile(key.clone()));
        match &self.profile_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.profile.clone()),
        }
    }

    async fn search_sessions(&self, query: &SessionQuery) -> Result<SessionPage> {
        self.record(BackendCall::SearchSessions(query.clone()));
        match &self.session_error {
            Some(e) => Err(e.clone()),
            None => Ok(SessionPage {
                total: Some(self.sessions.len() as u64),
                items: self.sessions.clone(),
                next_token: None,
            }),
        }
    }

    async fn create_event_label(&self, label: &EventLabel) -> Result<CreatedEventLabel> {
        self.record(BackendCall::CreateEventLabel(label.clone()));
        match &self.label_error {
            Some(e) => Err(e.clone()),
            None => Ok(CreatedEventLabel {
                label_id: label.label_id.clone(),
                enterprise_id: label.enterprise_id.clone(),
                session_id: Some(label.session_id.clone()),
                interaction_id: Some(label.interaction_id.clone()),
                created_at: Some("2024-05-01T12:00:00.000Z".to_string()),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn profile(enterprise_id: &str, profile_id: &str, customer_id: &str) -> Profile {
    Profile {
        enterprise_id: enterprise_id.to_string(),
        mode: "TEST".to_string(),
        profile_id: profile_id.to_string(),
        channel: "WHATSAPP".to_string(),
        customer_id: Some(profile_id.to_string()),
        customer: Some(Customer {
            enterprise_id: Some(enterprise_id.to_string()),
            mode: Some("TEST".to_string()),
            customer_id: Some(customer_id.to_string()),
            name: Some("Ada".to_string()),
        }),
        created_at: None,
        updated_at: None,
    }
}

pub fn conversation(id: &str, created_at: &str, content: &str) -> Conversation {
    Conversation {
        conversation_id: id.to_string(),
        created_by: Some("BOT".to_string()),
        created_at: Some(created_at.to_string()),
        content: Some(content.to_string()),
    }
}

pub fn content(interaction_id: &str, node_id: &str) -> String {
    format!(
        r#"{{"interactionId":"{}","nodeId":"{}","text":"hello"}}"#,
        interaction_id, node_id
    )
}

pub fn session(session_id: &str, customer_id: &str, conversations: Vec<Conversation>) -> Session {
    Session {
        enterprise_id: "e1".to_string(),
        mode: "TEST".to_string(),
        session_id: session_id.to_string(),
        customer_id: Some(customer_id.to_string()),
        workspace_id: Some("w1".to_string()),
        flow_id: Some("f1".to_string()),
        next_node_id: Some("N2".to_string()),
        updated_at: Some("2024-05-01T12:00:00.000Z".to_string()),
        conversation_by_date: Some(ConversationPage {
            items: conversations,
        }),
        ..Default::default()
    }
}
