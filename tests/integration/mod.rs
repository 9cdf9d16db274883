//! Integration tests for the layerfold configuration pipeline

mod fragment_sources;
mod observed_artifact;
mod pipeline_scenarios;
mod test_utils;
