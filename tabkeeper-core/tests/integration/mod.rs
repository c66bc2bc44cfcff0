mod cleanup_tests;
mod migration_tests;
mod pause_resume_tests;
mod reentrancy_tests;
mod round_trip_tests;
mod window_tests;
