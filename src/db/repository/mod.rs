//! Repository layer — entity-scoped database operations.
//!
//! Each sub-module owns one table and exposes free functions over a
//! borrowed connection. Transactional grouping happens a layer up, in
//! the stores.

mod message;
mod session;
mod user;

pub use message::*;
pub use session::*;
pub use user::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::models::enums::Sender;

    #[test]
    fn insert_and_fetch_user() {
        let conn = open_memory_database().unwrap();

        let id = insert_user(&conn, "alice", "salt$hash").unwrap();
        let user = get_user_by_username(&conn, "alice").unwrap().unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.username, "alice");
        assert_eq!(user.secret, "salt$hash");
        assert!(user.is_active);
    }

    #[test]
    fn unknown_user_returns_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_user_by_username(&conn, "nobody").unwrap().is_none());
        assert!(get_active_user_id(&conn, "nobody").unwrap().is_none());
    }

    #[test]
    fn active_user_id_ignores_deactivated_rows() {
        let conn = open_memory_database().unwrap();

        let id = insert_user(&conn, "bob", "s$h").unwrap();
        assert_eq!(get_active_user_id(&conn, "bob").unwrap(), Some(id));

        assert!(deactivate_user(&conn, "bob").unwrap());
        assert_eq!(get_active_user_id(&conn, "bob").unwrap(), None);

        // The row itself survives the soft delete.
        let user = get_user_by_username(&conn, "bob").unwrap().unwrap();
        assert!(!user.is_active);
    }

    #[test]
    fn deactivate_twice_reports_no_change() {
        let conn = open_memory_database().unwrap();

        insert_user(&conn, "carol", "s$h").unwrap();
        assert!(deactivate_user(&conn, "carol").unwrap());
        assert!(!deactivate_user(&conn, "carol").unwrap());
        assert!(!deactivate_user(&conn, "ghost").unwrap());
    }

    #[test]
    fn reactivate_only_matches_inactive_rows() {
        let conn = open_memory_database().unwrap();

        insert_user(&conn, "dave", "old$secret").unwrap();
        assert!(!reactivate_user(&conn, "dave", "new$secret").unwrap());

        deactivate_user(&conn, "dave").unwrap();
        assert!(reactivate_user(&conn, "dave", "new$secret").unwrap());

        let user = get_user_by_username(&conn, "dave").unwrap().unwrap();
        assert!(user.is_active);
        assert_eq!(user.secret, "new$secret");
    }

    #[test]
    fn sessions_list_newest_first() {
        let conn = open_memory_database().unwrap();
        let user_id = insert_user(&conn, "erin", "s$h").unwrap();

        let first = insert_session(&conn, user_id).unwrap();
        let second = insert_session(&conn, user_id).unwrap();
        let third = insert_session(&conn, user_id).unwrap();

        let sessions = list_sessions_for_user(&conn, user_id).unwrap();
        let ids: Vec<i64> = sessions.iter().map(|s| s.session_id).collect();
        assert_eq!(ids, vec![third, second, first]);

        assert_eq!(
            session_ids_for_user(&conn, user_id).unwrap(),
            vec![first, second, third]
        );
    }

    #[test]
    fn all_sessions_carry_owner_username() {
        let conn = open_memory_database().unwrap();
        let alice = insert_user(&conn, "alice", "s$h").unwrap();
        let bob = insert_user(&conn, "bob", "s$h").unwrap();

        insert_session(&conn, alice).unwrap();
        insert_session(&conn, bob).unwrap();

        let rows = list_all_sessions(&conn).unwrap();
        assert_eq!(rows.len(), 2);

        let names: Vec<&str> = rows.iter().map(|r| r.username.as_str()).collect();
        assert!(names.contains(&"alice"));
        assert!(names.contains(&"bob"));
    }

    #[test]
    fn messages_come_back_ordered_and_typed() {
        let conn = open_memory_database().unwrap();
        let user_id = insert_user(&conn, "frank", "s$h").unwrap();
        let session_id = insert_session(&conn, user_id).unwrap();

        insert_message(&conn, session_id, Sender::Bot, "What is a deadlock?").unwrap();
        insert_message(&conn, session_id, Sender::User, "A circular wait.").unwrap();
        insert_message(&conn, session_id, Sender::Bot, "Good answer.").unwrap();

        let messages = get_messages_by_session(&conn, session_id).unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].sender, Sender::Bot);
        assert_eq!(messages[1].sender, Sender::User);
        assert_eq!(messages[1].message, "A circular wait.");
        assert_eq!(messages[2].message, "Good answer.");
    }

    #[test]
    fn message_insert_requires_existing_session() {
        let conn = open_memory_database().unwrap();
        let result = insert_message(&conn, 999, Sender::User, "hello");
        assert!(result.is_err());
    }

    #[test]
    fn deleting_messages_leaves_session_row() {
        let conn = open_memory_database().unwrap();
        let user_id = insert_user(&conn, "gwen", "s$h").unwrap();
        let session_id = insert_session(&conn, user_id).unwrap();

        insert_message(&conn, session_id, Sender::Bot, "a").unwrap();
        insert_message(&conn, session_id, Sender::User, "b").unwrap();

        assert_eq!(delete_messages_for_session(&conn, session_id).unwrap(), 2);
        assert!(get_messages_by_session(&conn, session_id)
            .unwrap()
            .is_empty());
        assert!(get_session(&conn, session_id).unwrap().is_some());
    }

    #[test]
    fn deleting_session_row_reports_count() {
        let conn = open_memory_database().unwrap();
        let user_id = insert_user(&conn, "hank", "s$h").unwrap();
        let session_id = insert_session(&conn, user_id).unwrap();

        assert_eq!(delete_session_row(&conn, session_id).unwrap(), 1);
        assert_eq!(delete_session_row(&conn, session_id).unwrap(), 0);
        assert!(get_session(&conn, session_id).unwrap().is_none());
    }
}
