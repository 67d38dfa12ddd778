//! Test suite for CollabNotes
//!
//! This module organizes all tests
