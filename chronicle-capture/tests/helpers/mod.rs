//! Test helper utilities
//!
//! Shared mocks and fixtures for chronicle-capture integration tests.
//! Not every test binary uses every helper.
#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

#[allow(unused_imports)]
pub use fixtures::{gps_tagged_tiff, init_test_logging, png_file, selected_file, test_config};
#[allow(unused_imports)]
pub use mocks::{
    collaborators, GatedAudioDevice, GatedUploader, MockAudioDevice, MockLocations, MockPublisher,
    MockStories, MockTranscriber, MockUploader,
};
