// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod postgres_profile_repository;
pub mod postgres_project_repository;
pub mod postgres_user_repository;

pub use postgres_profile_repository::PostgresProfileRepository;
pub use postgres_project_repository::PostgresProjectRepository;
pub use postgres_user_repository::PostgresUserRepository;

/// Converts a 1-based page number into a row offset
///
/// Computed in `i64` so a hostile page number from the query string
/// cannot overflow the `u32` multiplication.
pub(crate) fn page_offset(page: u32, per_page: u32) -> i64 {
    (i64::from(page.max(1)) - 1) * i64::from(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_numbers_are_one_based() {
        assert_eq!(page_offset(0, 15), 0);
        assert_eq!(page_offset(1, 15), 0);
        assert_eq!(page_offset(2, 15), 15);
        assert_eq!(page_offset(3, 10), 20);
    }

    #[test]
    fn extreme_page_numbers_do_not_overflow() {
        assert_eq!(page_offset(u32::MAX, 15), (i64::from(u32::MAX) - 1) * 15);
    }
}
