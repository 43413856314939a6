use std::{cmp::Reverse, fmt, str::FromStr};

use anyhow::anyhow;

use crate::Comment;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "created_at")]
    Newest,

    #[serde(rename = "oldest")]
    Oldest,

    #[serde(rename = "upvotes")]
    MostUpvoted,
}

impl SortOrder {
    pub fn sort(&self, comments: &mut [Comment]) {
        match self {
            SortOrder::Newest => comments.sort_unstable_by_key(|c| (Reverse(c.created_at), c.id)),
            SortOrder::Oldest => comments.sort_unstable_by_key(|c| (c.created_at, c.id)),
            // Ties between equally upvoted comments go to the newest one
            SortOrder::MostUpvoted => comments
                .sort_unstable_by_key(|c| (Reverse(c.upvote_count), Reverse(c.created_at), c.id)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Newest => "Newest",
            SortOrder::Oldest => "Oldest",
            SortOrder::MostUpvoted => "Top",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<SortOrder> {
        match &s.to_lowercase() as &str {
            "newest" | "created_at" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "top" | "upvotes" | "most-upvoted" => Ok(SortOrder::MostUpvoted),
            _ => Err(anyhow!("unknown sort order {s:?}")),
        }
    }
}
