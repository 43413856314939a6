use crate::api::{self, CommentId, PostId, Time, UserId};

pub const DELETED_MESSAGE: &str = "[Comment deleted]";

/// A comment as held in the client tree.
// TODO: share the record fields with api::Comment once the embedded author is split off the wire type
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub author_id: UserId,
    pub text: String,
    pub upvote_count: u32,
    pub is_deleted: bool,
    pub created_at: Time,

    /// Direct replies known to this session. Only complete once
    /// `children_loaded` is set; before that it holds at most the replies
    /// posted from here
    pub children: im::Vector<Comment>,

    /// Whether `children` was filled from the service, or the node is known
    /// to have no replies at all
    pub children_loaded: bool,

    /// Replies at any depth, as counted from the flat collection when this
    /// node was materialized
    pub descendant_count: usize,

    /// Whether this session upvoted the comment
    pub has_upvoted_locally: bool,
}

impl From<api::Comment> for Comment {
    fn from(c: api::Comment) -> Comment {
        Comment {
            id: c.id,
            post_id: c.post_id,
            parent_id: c.parent_id,
            author_id: c.author_id,
            text: c.text,
            upvote_count: c.upvote_count,
            is_deleted: c.is_deleted,
            created_at: c.created_at,
            children: im::Vector::new(),
            children_loaded: false,
            descendant_count: 0,
            has_upvoted_locally: false,
        }
    }
}

impl Comment {
    pub fn has_replies(&self) -> bool {
        self.descendant_count > 0 || !self.children.is_empty()
    }

    /// Text to display, with soft-deleted comments tomb-stoned
    pub fn display_text(&self) -> &str {
        match self.is_deleted {
            true => DELETED_MESSAGE,
            false => &self.text,
        }
    }

    /// Mutable access to the node `id` anywhere in the forest. Only the nodes
    /// on the path from the root to `id` get copied, siblings stay shared.
    pub fn find_in<'a>(
        comments: &'a mut im::Vector<Comment>,
        id: &CommentId,
    ) -> Option<&'a mut Comment> {
        let mut path = Vec::new();
        if !Comment::path_to(comments, id, &mut path) {
            return None;
        }
        let (first, rest) = path.split_first()?;
        let mut node = comments.get_mut(*first)?;
        for i in rest {
            node = node.children.get_mut(*i)?;
        }
        Some(node)
    }

    fn path_to(comments: &im::Vector<Comment>, id: &CommentId, path: &mut Vec<usize>) -> bool {
        for (i, c) in comments.iter().enumerate() {
            path.push(i);
            if c.id == *id || Comment::path_to(&c.children, id, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    pub fn find_ref_in<'a>(comments: &'a im::Vector<Comment>, id: &CommentId) -> Option<&'a Comment> {
        let mut stack = comments.iter().collect::<Vec<_>>();
        while let Some(c) = stack.pop() {
            if c.id == *id {
                return Some(c);
            }
            stack.extend(c.children.iter());
        }
        None
    }

    /// Calls `f` on every node of the given forest, parents before children
    pub fn walk<'a>(comments: &'a im::Vector<Comment>, mut f: impl FnMut(&'a Comment)) {
        let mut stack = comments.iter().rev().collect::<Vec<_>>();
        while let Some(c) = stack.pop() {
            f(c);
            stack.extend(c.children.iter().rev());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(text: &str, children: Vec<Comment>) -> Comment {
        let mut c = Comment::from(api::Comment::now(
            PostId::stub(),
            None,
            UserId::stub(),
            String::from(text),
        ));
        c.children = children.into_iter().collect();
        c.children_loaded = true;
        c
    }

    #[test]
    fn finds_nested_nodes() {
        let deep = node("deep", vec![]);
        let deep_id = deep.id;
        let mut roots: im::Vector<Comment> =
            vec![node("a", vec![]), node("b", vec![node("c", vec![deep])])]
                .into_iter()
                .collect();

        assert_eq!(
            Comment::find_ref_in(&roots, &deep_id).map(|c| &c.text as &str),
            Some("deep")
        );
        Comment::find_in(&mut roots, &deep_id)
            .expect("finding deep node")
            .upvote_count = 7;
        assert_eq!(roots[1].children[0].children[0].upvote_count, 7);
        assert!(Comment::find_ref_in(&roots, &CommentId(api::Uuid::new_v4())).is_none());
    }

    #[test]
    fn updates_leave_previous_versions_intact() {
        let untouched = node("untouched", vec![node("x", vec![])]);
        let target = node("target", vec![]);
        let target_id = target.id;
        let before: im::Vector<Comment> = vec![untouched, target].into_iter().collect();

        let mut after = before.clone();
        Comment::find_in(&mut after, &target_id)
            .expect("finding target")
            .is_deleted = true;

        assert!(!before[1].is_deleted);
        assert!(after[1].is_deleted);
        assert_eq!(before[0], after[0]);
    }

    #[test]
    fn walks_in_display_order() {
        let roots: im::Vector<Comment> = vec![
            node("a", vec![node("a1", vec![]), node("a2", vec![])]),
            node("b", vec![]),
        ]
        .into_iter()
        .collect();
        let mut seen = Vec::new();
        Comment::walk(&roots, |c| seen.push(c.text.clone()));
        assert_eq!(seen, vec!["a", "a1", "a2", "b"]);
    }

    #[test]
    fn deleted_text_is_hidden() {
        let mut c = node("secret", vec![]);
        assert_eq!(c.display_text(), "secret");
        c.is_deleted = true;
        assert_eq!(c.display_text(), DELETED_MESSAGE);
    }
}
