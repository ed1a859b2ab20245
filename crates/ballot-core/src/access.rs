use ballot_db::polls::PollRow;

/// Whether `caller` may see this poll at all. Public polls are visible to
/// everyone, including anonymous callers; private polls only to their creator.
pub fn can_view_poll(poll: &PollRow, caller: Option<&str>) -> bool {
    poll.is_public || caller == Some(poll.creator_id.as_str())
}

/// Whether `caller` may update or delete this poll. Only the creator may.
pub fn can_manage_poll(poll: &PollRow, caller: &str) -> bool {
    poll.creator_id == caller
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn poll(is_public: bool) -> PollRow {
        PollRow {
            id: "p1".to_string(),
            creator_id: "owner".to_string(),
            question: "Which?".to_string(),
            description: None,
            status: "active".to_string(),
            is_public,
            allow_multiple_votes: false,
            expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn public_poll_visible_to_everyone() {
        let p = poll(true);
        assert!(can_view_poll(&p, None));
        assert!(can_view_poll(&p, Some("stranger")));
        assert!(can_view_poll(&p, Some("owner")));
    }

    #[test]
    fn private_poll_visible_only_to_creator() {
        let p = poll(false);
        assert!(!can_view_poll(&p, None));
        assert!(!can_view_poll(&p, Some("stranger")));
        assert!(can_view_poll(&p, Some("owner")));
    }

    #[test]
    fn only_creator_manages() {
        let p = poll(true);
        assert!(can_manage_poll(&p, "owner"));
        assert!(!can_manage_poll(&p, "stranger"));
    }
}
