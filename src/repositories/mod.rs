pub(crate) mod attempts;
pub(crate) mod enrollments;
pub(crate) mod examinations;
pub(crate) mod questions;
pub(crate) mod students;
pub(crate) mod test_papers;
pub(crate) mod users;
