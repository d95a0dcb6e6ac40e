use sqlx::PgPool;

use crate::db::models::StudentProfile;

const COLUMNS: &str = "id, user_id, student_name, created_at";

pub(crate) async fn find_by_user_id(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<StudentProfile>, sqlx::Error> {
    sqlx::query_as::<_, StudentProfile>(&format!(
        "SELECT {COLUMNS} FROM student_profiles WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
