mod closure_tests;
mod collection_tests;
mod group_tests;
mod simulation_tests;
