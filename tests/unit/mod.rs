/// Unit-level tests of the board reducer, renderer and import parsing
mod board_tests;
mod transfer_tests;
