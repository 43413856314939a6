use std::collections::HashSet;

use crate::{
    api::{self, CommentId, NewComment, PostId, SortOrder, UserId},
    tree, Comment, CommentService, Error, UserDirectory,
};

/// Client-side state of the comment thread of one post.
///
/// Every operation that talks to the service only touches local state once
/// the service answered successfully, so a failure always leaves the tree as
/// it was. The store does not serialize concurrent calls: callers must not
/// overlap two `load_roots`, nor two mutations of the same comment (see
/// `ThreadView::try_begin`).
pub struct ThreadStore<S> {
    service: S,
    users: UserDirectory,
    post_id: Option<PostId>,
    sort: SortOrder,
    roots: im::Vector<Comment>,
    upvoted: HashSet<CommentId>,
}

fn mark_upvoted(comments: &mut im::Vector<Comment>, upvoted: &HashSet<CommentId>) {
    for c in comments.iter_mut() {
        c.has_upvoted_locally = upvoted.contains(&c.id);
    }
}

impl<S: CommentService> ThreadStore<S> {
    pub fn new(service: S, users: UserDirectory) -> ThreadStore<S> {
        ThreadStore {
            service,
            users,
            post_id: None,
            sort: SortOrder::default(),
            roots: im::Vector::new(),
            upvoted: HashSet::new(),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    pub fn users_mut(&mut self) -> &mut UserDirectory {
        &mut self.users
    }

    /// Post of the last successful `load_roots`
    pub fn post_id(&self) -> Option<PostId> {
        self.post_id
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort
    }

    pub fn roots(&self) -> &im::Vector<Comment> {
        &self.roots
    }

    pub fn find(&self, id: &CommentId) -> Option<&Comment> {
        Comment::find_ref_in(&self.roots, id)
    }

    pub fn has_upvoted(&self, id: &CommentId) -> bool {
        self.upvoted.contains(id)
    }

    /// Replaces the whole thread with the roots of `post`, sorted by `sort`
    pub async fn load_roots(&mut self, post: PostId, sort: SortOrder) -> Result<(), Error> {
        tracing::debug!(?post, ?sort, "loading root comments");
        let flat = self.service.fetch_comments(post, Some(sort)).await?;
        self.users.remember_authors(&flat);
        let mut roots = tree::build_roots(&flat);
        mark_upvoted(&mut roots, &self.upvoted);
        tracing::debug!(?post, roots = roots.len(), total = flat.len(), "loaded root comments");
        self.roots = roots;
        self.post_id = Some(post);
        self.sort = sort;
        Ok(())
    }

    /// Reloads the current post under `sort`. Without a loaded post, only
    /// records the order for the next `load_roots`.
    pub async fn set_sort_order(&mut self, sort: SortOrder) -> Result<(), Error> {
        match self.post_id {
            Some(post) => self.load_roots(post, sort).await,
            None => {
                self.sort = sort;
                Ok(())
            }
        }
    }

    /// Puts a freshly created root comment at the front, whatever the sort
    /// order, so that its author sees it right away
    pub fn add_root(&mut self, comment: api::Comment) {
        if let Some(parent) = comment.parent_id {
            tracing::warn!(comment = ?comment.id, ?parent, "comment added as root has a parent");
            self.add_reply(parent, comment);
            return;
        }
        let node = self.new_node(comment);
        self.roots.push_front(node);
    }

    /// Client node for a comment that was just created, so has no replies yet
    fn new_node(&mut self, comment: api::Comment) -> Comment {
        self.users.remember_authors(std::slice::from_ref(&comment));
        let mut node = Comment::from(comment);
        node.children_loaded = true;
        node.has_upvoted_locally = self.upvoted.contains(&node.id);
        node
    }

    /// Puts `reply` in front of the children of `parent` and counts it there.
    ///
    /// Only `parent` gets its count bumped: the totals of its own ancestors
    /// stay as they were loaded until the next reload. If the replies of
    /// `parent` were not loaded yet, they still need to be. Returns false if
    /// `parent` is not in the tree.
    pub fn add_reply(&mut self, parent: CommentId, reply: api::Comment) -> bool {
        let node = self.new_node(reply);
        match Comment::find_in(&mut self.roots, &parent) {
            Some(p) => {
                p.children.push_front(node);
                p.descendant_count += 1;
                true
            }
            None => {
                tracing::warn!(?parent, reply = ?node.id, "parent of new reply is not in the thread");
                false
            }
        }
    }

    /// Creates a root comment on the service, then adds it
    pub async fn submit_root(
        &mut self,
        post: PostId,
        author: UserId,
        text: &str,
    ) -> Result<CommentId, Error> {
        let req = NewComment::new(post, None, author, text);
        req.validate()?;
        let created = self.service.create_comment(req).await?;
        let id = created.id;
        self.add_root(created);
        Ok(id)
    }

    /// Creates a reply to `parent` on the service, then adds it. The flag
    /// tells whether `parent` was still in the thread to receive it.
    pub async fn submit_reply(
        &mut self,
        post: PostId,
        parent: CommentId,
        author: UserId,
        text: &str,
    ) -> Result<(CommentId, bool), Error> {
        let req = NewComment::new(post, Some(parent), author, text);
        req.validate()?;
        let created = self.service.create_comment(req).await?;
        let id = created.id;
        let placed = self.add_reply(parent, created);
        Ok((id, placed))
    }

    /// Toggles the upvote of `user` on `comment` and returns the new count
    pub async fn toggle_upvote(&mut self, comment: CommentId, user: UserId) -> Result<u32, Error> {
        let res = self.service.toggle_upvote(comment, user).await?;
        let now_upvoted = !self.upvoted.remove(&comment);
        if now_upvoted {
            self.upvoted.insert(comment);
        }
        match Comment::find_in(&mut self.roots, &comment) {
            Some(c) => {
                c.upvote_count = res.upvotes;
                c.has_upvoted_locally = now_upvoted;
            }
            None => tracing::debug!(?comment, "upvoted comment is not in the thread"),
        }
        Ok(res.upvotes)
    }

    /// Marks `comment` as deleted in place, keeping its replies
    pub async fn soft_delete(&mut self, comment: CommentId, user: UserId) -> Result<(), Error> {
        if let Err(err) = self.service.delete_comment(comment, user).await {
            tracing::info!(?comment, ?user, "comment deletion failed: {err}");
            return Err(err);
        }
        match Comment::find_in(&mut self.roots, &comment) {
            Some(c) => c.is_deleted = true,
            None => tracing::debug!(?comment, "deleted comment is not in the thread"),
        }
        Ok(())
    }

    /// Loads the direct replies of `parent`, counted against a fresh fetch of
    /// the whole post. Returns false if `parent` left the thread meanwhile,
    /// in which case nothing was attached.
    pub async fn load_replies(
        &mut self,
        post: PostId,
        parent: CommentId,
        sort: SortOrder,
    ) -> Result<bool, Error> {
        tracing::debug!(?post, ?parent, ?sort, "loading replies");
        let replies = self.service.fetch_replies(post, parent, Some(sort)).await?;
        let flat = self.service.fetch_comments(post, None).await?;
        self.users.remember_authors(&replies);
        self.users.remember_authors(&flat);
        match Comment::find_in(&mut self.roots, &parent) {
            Some(node) => {
                let mut updated = tree::attach_replies(node, replies, &flat);
                mark_upvoted(&mut updated.children, &self.upvoted);
                *node = updated;
                Ok(true)
            }
            None => {
                tracing::warn!(?parent, "loaded replies of a comment no longer in the thread");
                Ok(false)
            }
        }
    }

    /// Every visible root plus all the replies counted below it
    pub fn total_visible_count(&self) -> usize {
        self.roots.iter().map(|c| 1 + c.descendant_count).sum()
    }

    /// Fetches the profile of every author in the thread the directory does
    /// not know yet. Returns how many were resolved; failures are skipped.
    pub async fn resolve_authors(&mut self) -> usize {
        let mut authors = Vec::new();
        Comment::walk(&self.roots, |c| authors.push(c.author_id));
        let mut resolved = 0;
        for id in self.users.missing(authors) {
            match self.service.fetch_user(id).await {
                Ok(user) => {
                    self.users.remember(user);
                    resolved += 1;
                }
                Err(err) => tracing::warn!(user = ?id, "failed resolving comment author: {err}"),
            }
        }
        resolved
    }
}
