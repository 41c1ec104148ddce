//! Tests for the token codec and session manager

mod mocks;
