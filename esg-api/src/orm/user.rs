use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::db::last_insert_rowid;
use crate::models::{NewUser, User};
use crate::schema::users;

pub fn insert_user(conn: &mut SqliteConnection, new_user: &NewUser) -> QueryResult<User> {
    diesel::insert_into(users::table)
        .values(new_user)
        .execute(conn)?;

    let id = last_insert_rowid(conn)?;
    users::table.find(id).first::<User>(conn)
}

pub fn get_user_by_id(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<Option<User>> {
    users::table.find(user_id).first::<User>(conn).optional()
}

pub fn get_user_by_username(conn: &mut SqliteConnection, name: &str) -> QueryResult<Option<User>> {
    users::table
        .filter(users::username.eq(name))
        .first::<User>(conn)
        .optional()
}

pub fn username_taken(conn: &mut SqliteConnection, name: &str) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(users::table.filter(users::username.eq(name)))).get_result(conn)
}

pub fn email_taken(conn: &mut SqliteConnection, address: &str) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(users::table.filter(users::email.eq(address)))).get_result(conn)
}

pub fn record_login(conn: &mut SqliteConnection, user_id: i32, at: NaiveDateTime) -> QueryResult<usize> {
    diesel::update(users::table.find(user_id))
        .set(users::last_login_at.eq(Some(at)))
        .execute(conn)
}

pub fn update_password_hash(
    conn: &mut SqliteConnection,
    user_id: i32,
    new_hash: &str,
    at: NaiveDateTime,
) -> QueryResult<usize> {
    diesel::update(users::table.find(user_id))
        .set((users::password_hash.eq(new_hash), users::updated_at.eq(at)))
        .execute(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::orm::testing::{sample_user, setup_test_db};

    #[test]
    fn username_and_email_are_unique() {
        let mut conn = setup_test_db();
        insert_user(&mut conn, &sample_user("ana", "ana@example.com", Role::User, None)).unwrap();

        assert!(username_taken(&mut conn, "ana").unwrap());
        assert!(email_taken(&mut conn, "ana@example.com").unwrap());
        assert!(!username_taken(&mut conn, "bob").unwrap());

        let same_name = insert_user(&mut conn, &sample_user("ana", "other@example.com", Role::User, None));
        assert!(same_name.is_err());
        let same_email = insert_user(&mut conn, &sample_user("bob", "ana@example.com", Role::User, None));
        assert!(same_email.is_err());
    }

    #[test]
    fn records_last_login() {
        let mut conn = setup_test_db();
        let user = insert_user(&mut conn, &sample_user("carla", "carla@example.com", Role::Manager, None)).unwrap();
        assert!(user.last_login_at.is_none());
        assert_eq!(user.role(), Role::Manager);

        let at = user.created_at + chrono::Duration::hours(2);
        record_login(&mut conn, user.id, at).unwrap();

        let reloaded = get_user_by_id(&mut conn, user.id).unwrap().unwrap();
        assert_eq!(reloaded.last_login_at, Some(at));
    }
}
