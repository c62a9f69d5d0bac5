use crate::domain::entities::UserSession;

/// Store trait - per-user conversational sessions
///
/// Owned by the router and handed to flow handlers by reference. Lifecycle
/// is explicit: `put` creates or overwrites, `remove` deletes.
pub trait SessionStore: Send {
    fn get(&mut self, user_id: &str) -> Option<&UserSession>;
    fn get_mut(&mut self, user_id: &str) -> Option<&mut UserSession>;
    fn put(&mut self, session: UserSession);
    fn remove(&mut self, user_id: &str) -> Option<UserSession>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&mut self, user_id: &str) -> bool {
        self.get(user_id).is_some()
    }
}
