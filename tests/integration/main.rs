//! Integration tests: the session subsystem against a mock auth API.

mod helpers;

mod permission_test;
mod renewal_test;
mod session_test;
