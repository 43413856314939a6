use threadweave_client::{
    api::{SortOrder, Time},
    Row, UserDirectory,
};

const INDENT: &str = "    ";

pub fn header(total: usize, sort: SortOrder) -> String {
    match total {
        1 => format!("1 Comment ({sort})"),
        n => format!("{n} Comments ({sort})"),
    }
}

pub fn time_ago(t: Time, now: Time) -> String {
    let secs = (now - t).num_seconds().max(0);
    match secs {
        s if s < 60 => String::from("just now"),
        s if s < 3600 => format!("{}m ago", s / 60),
        s if s < 86400 => format!("{}h ago", s / 3600),
        s if s < 30 * 86400 => format!("{}d ago", s / 86400),
        _ => t.format("%Y-%m-%d").to_string(),
    }
}

pub fn row(row: &Row, users: &UserDirectory, now: Time) -> String {
    match row {
        Row::Comment {
            comment,
            depth,
            can_reply,
            ..
        } => {
            let indent = INDENT.repeat(*depth);
            let author = users.resolve(&comment.author_id);
            let badge = match author.is_moderator() {
                true => " [mod]",
                false => "",
            };
            let reply = match *can_reply {
                true => "",
                false => " (no reply)",
            };
            format!(
                "{indent}{}{badge} · {} · ▲{} · {}{reply}\n{indent}{}",
                author.name,
                time_ago(comment.created_at, now),
                comment.upvote_count,
                comment.id,
                comment.display_text(),
            )
        }
        Row::LoadingReplies { depth, .. } => format!("{}…", INDENT.repeat(*depth)),
        Row::ContinueThread {
            depth, replies, ..
        } => format!(
            "{}↳ continue this thread ({replies} more)",
            INDENT.repeat(*depth)
        ),
        Row::CollapseThread { depth, .. } => format!("{}↑ collapse thread", INDENT.repeat(*depth)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use threadweave_client::api::{CommentId, Uuid};

    #[test]
    fn ages() {
        let now = chrono::Utc::now();
        assert_eq!(time_ago(now, now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3h ago");
        assert_eq!(time_ago(now - Duration::days(2), now), "2d ago");
        assert_eq!(time_ago(now + Duration::minutes(5), now), "just now");
    }

    #[test]
    fn headers() {
        assert_eq!(header(1, SortOrder::Newest), "1 Comment (Newest)");
        assert_eq!(header(3, SortOrder::MostUpvoted), "3 Comments (Top)");
    }

    #[test]
    fn gates() {
        let users = UserDirectory::new();
        let r = Row::ContinueThread {
            parent: CommentId(Uuid::nil()),
            depth: 1,
            replies: 4,
        };
        assert_eq!(
            row(&r, &users, chrono::Utc::now()),
            "    ↳ continue this thread (4 more)"
        );
    }
}
