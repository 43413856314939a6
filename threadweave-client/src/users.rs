use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::api::{self, ExternalUserId, User, UserId};

/// Memoized user profiles for one session.
///
/// Build one when a session or view starts, feed it the authors the service
/// embeds in its answers, and `clear` it on sign-out. Cloning is cheap.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserDirectory {
    users: Arc<HashMap<UserId, User>>,
    by_external: Arc<HashMap<ExternalUserId, UserId>>,
}

impl UserDirectory {
    pub fn new() -> UserDirectory {
        UserDirectory::default()
    }

    pub fn remember(&mut self, user: User) {
        if !user.external_id.0.is_empty() {
            Arc::make_mut(&mut self.by_external).insert(user.external_id.clone(), user.id);
        }
        Arc::make_mut(&mut self.users).insert(user.id, user);
    }

    /// Remembers every author embedded in `comments`
    pub fn remember_authors(&mut self, comments: &[api::Comment]) {
        for c in comments {
            if let Some(author) = &c.author {
                if author.id != c.author_id {
                    tracing::warn!(
                        comment = ?c.id,
                        author_id = ?c.author_id,
                        embedded = ?author.id,
                        "embedded author does not match comment author, ignoring it"
                    );
                    continue;
                }
                self.remember(author.clone());
            }
        }
    }

    pub fn get(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    pub fn get_by_external(&self, id: &ExternalUserId) -> Option<&User> {
        self.by_external.get(id).and_then(|id| self.users.get(id))
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.users.contains_key(id)
    }

    /// The known profile for `id`, or the placeholder until it is known
    pub fn resolve(&self, id: &UserId) -> User {
        self.get(id)
            .cloned()
            .unwrap_or_else(|| User::placeholder(*id))
    }

    /// The ids among `ids` that are not known yet, without duplicates
    pub fn missing(&self, ids: impl IntoIterator<Item = UserId>) -> Vec<UserId> {
        let mut seen = HashSet::new();
        ids.into_iter()
            .filter(|id| !self.contains(id) && seen.insert(*id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn clear(&mut self) {
        self.users = Arc::new(HashMap::new());
        self.by_external = Arc::new(HashMap::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{PostId, Role, Uuid};

    fn user(name: &str, external: &str) -> User {
        User {
            name: String::from(name),
            external_id: ExternalUserId(String::from(external)),
            ..User::placeholder(UserId(Uuid::new_v4()))
        }
    }

    #[test]
    fn resolves_known_and_unknown_users() {
        let mut dir = UserDirectory::new();
        let alice = user("alice", "ext_alice");
        dir.remember(alice.clone());

        assert_eq!(dir.resolve(&alice.id), alice);
        let stranger = UserId(Uuid::new_v4());
        assert_eq!(dir.resolve(&stranger), User::placeholder(stranger));
        assert_eq!(
            dir.get_by_external(&ExternalUserId(String::from("ext_alice"))),
            Some(&alice)
        );
    }

    #[test]
    fn remembers_embedded_authors() {
        let mut dir = UserDirectory::new();
        let bob = User {
            role: Role::Moderator,
            ..user("bob", "")
        };
        let mut with_author = api::Comment::now(PostId::stub(), None, bob.id, String::from("hi"));
        with_author.author = Some(bob.clone());
        let without = api::Comment::now(PostId::stub(), None, UserId::stub(), String::from("yo"));

        dir.remember_authors(&[with_author, without]);
        assert_eq!(dir.get(&bob.id), Some(&bob));
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.missing(vec![bob.id, UserId::stub(), UserId::stub()]), vec![UserId::stub()]);
    }

    #[test]
    fn mismatched_embedded_author_is_ignored() {
        let mut dir = UserDirectory::new();
        let mut c = api::Comment::now(PostId::stub(), None, UserId::stub(), String::from("hi"));
        c.author = Some(user("mallory", ""));
        dir.remember_authors(&[c]);
        assert!(dir.is_empty());
    }

    #[test]
    fn clear_forgets_everything() {
        let mut dir = UserDirectory::new();
        let carol = user("carol", "ext_carol");
        dir.remember(carol.clone());
        let snapshot = dir.clone();
        dir.clear();
        assert!(dir.is_empty());
        assert!(dir
            .get_by_external(&ExternalUserId(String::from("ext_carol")))
            .is_none());
        assert_eq!(snapshot.get(&carol.id), Some(&carol));
    }
}
