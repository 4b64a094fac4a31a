/// End-to-end tests across session, storage, backup files and backend
mod backend_tests;
mod persistence_tests;
mod rpc_tests;
