use chrono::{DateTime, Utc};

/// Domain events record every externally visible transition of a navigation
/// session, stamped with the session they belong to.
pub trait DomainEvent: Send + Sync + Clone {
    fn event_type(&self) -> &'static str;
    fn session_id(&self) -> &str;
    fn occurred_at(&self) -> DateTime<Utc>;
}
