use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Steps of the flight-load inquiry form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightStep {
    Start,
    Name,
    Dates,
    Route,
    Flights,
}

impl FlightStep {
    /// Field the answer for this step is stored under
    pub fn field(&self) -> Option<&'static str> {
        match self {
            FlightStep::Start => None,
            FlightStep::Name => Some("name"),
            FlightStep::Dates => Some("dates"),
            FlightStep::Route => Some("route"),
            FlightStep::Flights => Some("flights"),
        }
    }

    pub fn next(&self) -> Option<FlightStep> {
        match self {
            FlightStep::Start => Some(FlightStep::Name),
            FlightStep::Name => Some(FlightStep::Dates),
            FlightStep::Dates => Some(FlightStep::Route),
            FlightStep::Route => Some(FlightStep::Flights),
            FlightStep::Flights => None,
        }
    }
}

/// Steps of the rider-support menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionStep {
    MenuSelection,
    RuleSelection,
}

/// The flow a session is in, with its current step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Flight(FlightStep),
    Question(QuestionStep),
}

impl Flow {
    pub fn kind(&self) -> &'static str {
        match self {
            Flow::Flight(_) => "flight",
            Flow::Question(_) => "question",
        }
    }
}

/// Conversational progress for one user
#[derive(Debug, Clone)]
pub struct UserSession {
    pub user_id: String,
    pub flow: Flow,
    pub fields: HashMap<String, String>,
    pub updated_at: DateTime<Utc>,
}

impl UserSession {
    pub fn new(user_id: impl Into<String>, flow: Flow) -> Self {
        Self {
            user_id: user_id.into(),
            flow,
            fields: HashMap::new(),
            updated_at: Utc::now(),
        }
    }

    /// Move to `flow` and refresh the activity timestamp
    pub fn advance(&mut self, flow: Flow) {
        self.flow = flow;
        self.updated_at = Utc::now();
    }

    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }
}
