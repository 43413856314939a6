use std::collections::HashSet;

use rand::{seq::SliceRandom, Rng};
use threadweave_client::api::{self, CommentId, PostId, Role, User, UserId, Uuid};

use crate::MockServer;

const MODERATOR_ONE_IN: u32 = 10;
const ROOT_ONE_IN: u32 = 3;
const DELETED_ONE_IN: u32 = 20;
const MAX_WORDS: usize = 40;
const MAX_GAP_SECS: i64 = 3600;

impl MockServer {
    /// Fills `post` with `n_users` new users and `n_comments` comments
    /// arranged in random threads, returning the users
    pub fn test_seed(&self, post: PostId, n_users: usize, n_comments: usize) -> Vec<User> {
        let mut rng = rand::thread_rng();
        let users = (0..n_users)
            .map(|_| {
                let role = match rng.gen_ratio(1, MODERATOR_ONE_IN) {
                    true => Role::Moderator,
                    false => Role::User,
                };
                self.test_add_user(&lipsum::lipsum_words(2), role)
            })
            .collect::<Vec<_>>();
        if users.is_empty() {
            return users;
        }

        let mut state = self.0.lock();
        state.posts.insert(post);
        let mut time = chrono::Utc::now()
            - chrono::Duration::seconds(MAX_GAP_SECS * n_comments as i64);
        let mut ids: Vec<CommentId> = Vec::with_capacity(n_comments);
        for _ in 0..n_comments {
            time = time + chrono::Duration::seconds(rng.gen_range(1..=MAX_GAP_SECS));
            let parent = match ids.is_empty() || rng.gen_ratio(1, ROOT_ONE_IN) {
                true => None,
                false => ids.choose(&mut rng).copied(),
            };
            let n_voters = rng.gen_range(0..=users.len());
            let voters = users
                .choose_multiple(&mut rng, n_voters)
                .map(|u| u.id)
                .collect::<HashSet<UserId>>();
            let author = users.choose(&mut rng).map(|u| u.id).unwrap_or_else(UserId::stub);
            let id = CommentId(Uuid::new_v4());
            state.comments.push(api::Comment {
                id,
                post_id: post,
                parent_id: parent,
                author_id: author,
                text: lipsum::lipsum_words(rng.gen_range(1..=MAX_WORDS)),
                upvote_count: voters.len() as u32,
                is_deleted: rng.gen_ratio(1, DELETED_ONE_IN),
                created_at: time,
                author: None,
            });
            state.upvotes.insert(id, voters);
            ids.push(id);
        }
        tracing::debug!(%post, n_users, n_comments, "seeded mock thread");
        users
    }
}
