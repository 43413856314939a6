//! Turns the flat comment collection of a post into the roots of a tree.
//!
//! Nothing here builds nested children eagerly: roots come out unloaded and
//! annotated with how many replies sit below them, and subtrees get attached
//! one level at a time with `attach_replies`.

use std::collections::{HashMap, HashSet};

use crate::{
    api::{self, CommentId},
    Comment,
};

/// Parent to children index over a flat collection, with the size of every
/// subtree precomputed.
pub struct FlatIndex<'a> {
    comments: HashMap<CommentId, &'a api::Comment>,
    children: HashMap<CommentId, Vec<CommentId>>,
    counts: HashMap<CommentId, usize>,
}

impl<'a> FlatIndex<'a> {
    pub fn new(flat: &'a [api::Comment]) -> FlatIndex<'a> {
        let mut comments = HashMap::with_capacity(flat.len());
        let mut children = HashMap::<CommentId, Vec<CommentId>>::new();
        for c in flat {
            if comments.contains_key(&c.id) {
                tracing::warn!(comment = ?c.id, "comment listed twice, keeping first record");
                continue;
            }
            comments.insert(c.id, c);
            if let Some(parent) = c.parent_id {
                children.entry(parent).or_default().push(c.id);
            }
        }
        let counts = subtree_sizes(&comments, &children);
        FlatIndex {
            comments,
            children,
            counts,
        }
    }

    pub fn get(&self, id: &CommentId) -> Option<&'a api::Comment> {
        self.comments.get(id).copied()
    }

    /// Number of comments whose ancestor chain goes through `id`
    pub fn descendant_count(&self, id: &CommentId) -> usize {
        self.counts.get(id).copied().unwrap_or(0)
    }

    pub fn direct_children(&self, id: &CommentId) -> &[CommentId] {
        self.children.get(id).map(|v| &v[..]).unwrap_or(&[])
    }

    /// Builds an unloaded client node for `c`, counted against this index
    pub fn node(&self, c: api::Comment) -> Comment {
        let descendant_count = self.descendant_count(&c.id);
        Comment {
            descendant_count,
            children_loaded: descendant_count == 0,
            ..Comment::from(c)
        }
    }
}

fn subtree_sizes(
    comments: &HashMap<CommentId, &api::Comment>,
    children: &HashMap<CommentId, Vec<CommentId>>,
) -> HashMap<CommentId, usize> {
    let mut counts = HashMap::with_capacity(comments.len());
    // Nodes whose subtree is being summed, to stop on parent cycles
    let mut on_path = HashSet::new();
    for start in comments.keys() {
        if counts.contains_key(start) {
            continue;
        }
        let mut stack = vec![(*start, false)];
        while let Some((id, children_done)) = stack.pop() {
            if children_done {
                let total = children
                    .get(&id)
                    .map(|cs| {
                        cs.iter()
                            .map(|c| 1 + counts.get(c).copied().unwrap_or(0))
                            .sum()
                    })
                    .unwrap_or(0);
                on_path.remove(&id);
                counts.insert(id, total);
                continue;
            }
            if counts.contains_key(&id) {
                continue;
            }
            if !on_path.insert(id) {
                tracing::warn!(comment = ?id, "comment is its own ancestor");
                continue;
            }
            stack.push((id, true));
            for c in children.get(&id).into_iter().flatten() {
                if !counts.contains_key(c) {
                    stack.push((*c, false));
                }
            }
        }
    }
    counts
}

/// Root comments of `flat`, in the order the service listed them, each with
/// its descendant count and no loaded children.
pub fn build_roots(flat: &[api::Comment]) -> im::Vector<Comment> {
    let index = FlatIndex::new(flat);
    let mut seen = HashSet::new();
    flat.iter()
        .filter(|c| c.is_root() && seen.insert(c.id))
        .map(|c| index.node(c.clone()))
        .collect()
}

/// `node` with its children replaced by `direct_replies`, each counted against
/// `flat`. The count of `node` itself does not change.
///
/// A reply that was already a child keeps its loaded subtree. Children the
/// fetched set does not list, such as a reply posted from this session that
/// the service does not return yet, stay in front.
pub fn attach_replies(
    node: &Comment,
    direct_replies: Vec<api::Comment>,
    flat: &[api::Comment],
) -> Comment {
    let index = FlatIndex::new(flat);
    let mut fetched_ids = HashSet::new();
    let fetched = direct_replies
        .into_iter()
        .filter(|r| {
            if r.parent_id != Some(node.id) {
                tracing::warn!(reply = ?r.id, parent = ?node.id, "ignoring fetched reply of another comment");
                return false;
            }
            fetched_ids.insert(r.id)
        })
        .map(|r| {
            let mut fresh = index.node(r);
            if let Some(prev) = node.children.iter().find(|c| c.id == fresh.id) {
                fresh.children = prev.children.clone();
                fresh.children_loaded = prev.children_loaded;
                fresh.has_upvoted_locally = prev.has_upvoted_locally;
            }
            fresh
        })
        .collect::<im::Vector<_>>();

    let mut children = node
        .children
        .iter()
        .filter(|c| !fetched_ids.contains(&c.id))
        .cloned()
        .collect::<im::Vector<_>>();
    children.append(fetched);

    Comment {
        children,
        children_loaded: true,
        ..node.clone()
    }
}
