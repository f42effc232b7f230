//! Broadcast message composition.

use std::collections::HashSet;

use crate::event::User;

/// Composes the broadcast for a ping: the message text followed by one
/// mention per distinct subscriber, in the order they were returned.
pub fn compose_broadcast(message: &str, subscribers: &[User]) -> String {
    let mut seen = HashSet::new();
    let mentions: Vec<String> = subscribers
        .iter()
        .filter(|user| seen.insert(user.id.as_str()))
        .map(User::mention)
        .collect();

    if mentions.is_empty() {
        message.to_string()
    } else {
        format!("{}\n{}", message, mentions.join(" "))
    }
}

/// Returns the subscriber ids a broadcast mentions, deduplicated.
pub fn mentioned_ids(subscribers: &[User]) -> Vec<String> {
    let mut seen = HashSet::new();
    subscribers
        .iter()
        .filter(|user| seen.insert(user.id.as_str()))
        .map(|user| user.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_then_mentions() {
        let subscribers = vec![User::new("1", "u1"), User::new("2", "u2")];
        assert_eq!(
            compose_broadcast("Starting now", &subscribers),
            "Starting now\n<@1> <@2>"
        );
    }

    #[test]
    fn duplicates_mentioned_once() {
        let subscribers = vec![
            User::new("1", "u1"),
            User::new("2", "u2"),
            User::new("1", "u1"),
        ];
        let text = compose_broadcast("Go", &subscribers);
        assert_eq!(text.matches("<@1>").count(), 1);
        assert_eq!(text.matches("<@2>").count(), 1);
        assert_eq!(mentioned_ids(&subscribers), vec!["1", "2"]);
    }

    #[test]
    fn no_subscribers_sends_message_only() {
        assert_eq!(compose_broadcast("Anyone?", &[]), "Anyone?");
    }
}
