use crate::core::errors::ApiError;

/// Which resource an ownership check guards; selects the rejection reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Post,
    Comment,
}

pub fn assert_owner(resource: Resource, owner: &str, caller_id: &str) -> Result<(), ApiError> {
    if owner == caller_id {
        return Ok(());
    }
    Err(match resource {
        Resource::Post => ApiError::NotPostOwner,
        Resource::Comment => ApiError::NotCommentOwner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_passes() {
        assert!(assert_owner(Resource::Post, "alice", "alice").is_ok());
    }

    #[test]
    fn stranger_is_rejected_per_resource() {
        assert!(matches!(
            assert_owner(Resource::Post, "alice", "bob"),
            Err(ApiError::NotPostOwner)
        ));
        assert!(matches!(
            assert_owner(Resource::Comment, "alice", "bob"),
            Err(ApiError::NotCommentOwner)
        ));
    }
}
