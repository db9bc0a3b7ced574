use crate::models::{ItemUser, NewItemUser};
use crate::schema::item_users;
use diesel::prelude::*;
use tracing::debug;

pub(crate) fn ensure_item_user(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<ItemUser> {
    if let Some(existing) = find_item_user(conn, user_id)? {
        return Ok(existing);
    }

    debug!("Creating item user for user {}", user_id);
    diesel::insert_into(item_users::table)
        .values(&NewItemUser::new(user_id))
        .returning(ItemUser::as_returning())
        .get_result(conn)
}

/// Looks up the `ItemUser` for `user_id` without creating one
pub(crate) fn find_item_user(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<Option<ItemUser>> {
    item_users::table
        .filter(item_users::user_id.eq(user_id))
        .filter(item_users::deleted_at.is_null())
        .select(ItemUser::as_select())
        .first(conn)
        .optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbPool;
    use crate::repo::tests::{create_test_user, setup_test_db};

    fn get_or_create_item_user(pool: &DbPool, user_id: i32) -> QueryResult<ItemUser> {
        let conn = &mut pool.get().unwrap();
        conn.transaction(|conn| ensure_item_user(conn, user_id))
    }

    #[test]
    fn test_get_or_create_is_stable() {
        let pool = setup_test_db();
        let user = create_test_user(&pool, "jake");

        let first = get_or_create_item_user(&pool, user.get_id()).unwrap();
        let second = get_or_create_item_user(&pool, user.get_id()).unwrap();

        assert_eq!(first.get_id(), second.get_id());
        assert_eq!(first.get_user_id(), user.get_id());
    }

    #[test]
    fn test_find_does_not_create() {
        let pool = setup_test_db();
        let user = create_test_user(&pool, "jake");

        let conn = &mut pool.get().unwrap();
        assert!(find_item_user(conn, user.get_id()).unwrap().is_none());
    }

    #[test]
    fn test_item_user_requires_existing_user() {
        let pool = setup_test_db();
        assert!(get_or_create_item_user(&pool, 404).is_err());
    }
}
