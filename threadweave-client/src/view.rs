use std::collections::HashSet;

use crate::{api::CommentId, Comment};

pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Mutation in flight on a comment, during which its control stays disabled
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Busy {
    Upvote,
    Delete,
    LoadReplies,
}

/// Outcome of opening or closing a node's replies
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Expansion {
    Collapsed,
    Expanded,
    /// Expanded, but the replies are not loaded yet: call `load_replies`
    NeedsLoad,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Row<'a> {
    Comment {
        comment: &'a Comment,
        depth: usize,
        expanded: bool,
        can_reply: bool,
    },

    /// Replies of `parent` are open but not loaded
    LoadingReplies { parent: CommentId, depth: usize },

    /// Gate hiding the replies of `parent`, which sits at the maximum depth
    ContinueThread {
        parent: CommentId,
        depth: usize,
        replies: usize,
    },

    /// Opened gate; the replies of `parent` follow, starting over at depth 0
    CollapseThread { parent: CommentId, depth: usize },
}

/// Render state of a thread, kept apart from the comment tree itself.
///
/// Nodes shallower than `max_depth` open their replies inline, one level
/// deeper. A node at `max_depth` shows a "continue thread" gate instead, and
/// opening it renders its replies as a new thread starting at depth 0. None of
/// this changes the tree or its counts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThreadView {
    max_depth: usize,
    expanded: HashSet<CommentId>,
    continued: HashSet<CommentId>,
    busy: HashSet<(CommentId, Busy)>,
}

impl Default for ThreadView {
    fn default() -> ThreadView {
        ThreadView::new(DEFAULT_MAX_DEPTH)
    }
}

fn needs_load(c: &Comment) -> Expansion {
    match !c.children_loaded && c.has_replies() {
        true => Expansion::NeedsLoad,
        false => Expansion::Expanded,
    }
}

impl ThreadView {
    pub fn new(max_depth: usize) -> ThreadView {
        ThreadView {
            max_depth,
            expanded: HashSet::new(),
            continued: HashSet::new(),
            busy: HashSet::new(),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn is_expanded(&self, id: &CommentId) -> bool {
        self.expanded.contains(id)
    }

    pub fn is_continued(&self, id: &CommentId) -> bool {
        self.continued.contains(id)
    }

    pub fn toggle_replies(&mut self, c: &Comment) -> Expansion {
        if self.expanded.remove(&c.id) {
            return Expansion::Collapsed;
        }
        self.expanded.insert(c.id);
        needs_load(c)
    }

    pub fn toggle_continuation(&mut self, c: &Comment) -> Expansion {
        if self.continued.remove(&c.id) {
            return Expansion::Collapsed;
        }
        self.continued.insert(c.id);
        needs_load(c)
    }

    /// Marks `busy` as started on `id`; false if it already was
    pub fn try_begin(&mut self, id: CommentId, busy: Busy) -> bool {
        self.busy.insert((id, busy))
    }

    pub fn finish(&mut self, id: CommentId, busy: Busy) {
        self.busy.remove(&(id, busy));
    }

    pub fn is_busy(&self, id: &CommentId, busy: Busy) -> bool {
        self.busy.contains(&(*id, busy))
    }

    /// Forgets all expansion state, eg. when another post gets loaded
    pub fn reset(&mut self) {
        self.expanded.clear();
        self.continued.clear();
        self.busy.clear();
    }

    /// Flattens the visible part of `roots` into display order.
    ///
    /// Uses an explicit stack, so arbitrarily deep data does not grow the call
    /// stack.
    pub fn rows<'a>(&self, roots: &'a im::Vector<Comment>) -> Vec<Row<'a>> {
        let mut rows = Vec::new();
        let mut stack = roots.iter().rev().map(|c| (c, 0)).collect::<Vec<_>>();
        while let Some((c, depth)) = stack.pop() {
            let gated = depth >= self.max_depth;
            let open = match gated {
                true => self.continued.contains(&c.id),
                false => self.expanded.contains(&c.id),
            };
            rows.push(Row::Comment {
                comment: c,
                depth,
                expanded: !gated && open,
                can_reply: !gated,
            });
            if !c.has_replies() {
                continue;
            }
            if gated {
                rows.push(match open {
                    false => Row::ContinueThread {
                        parent: c.id,
                        depth: depth + 1,
                        replies: c.descendant_count,
                    },
                    true => Row::CollapseThread {
                        parent: c.id,
                        depth: depth + 1,
                    },
                });
            }
            if !open {
                continue;
            }
            let child_depth = match gated {
                true => 0,
                false => depth + 1,
            };
            if !c.children_loaded {
                rows.push(Row::LoadingReplies {
                    parent: c.id,
                    depth: child_depth,
                });
                continue;
            }
            stack.extend(c.children.iter().rev().map(|child| (child, child_depth)));
        }
        rows
    }
}
