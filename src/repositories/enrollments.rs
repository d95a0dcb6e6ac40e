pub(crate) async fn is_enrolled(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: i64,
    student_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM exam_enrollments WHERE exam_id = $1 AND student_id = $2)",
    )
    .bind(exam_id)
    .bind(student_id)
    .fetch_one(executor)
    .await
}
