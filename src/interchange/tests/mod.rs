//! Tests for the interchange module

mod stream_tests;
