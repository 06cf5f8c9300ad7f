// Path and File Name : /home/decepticloud/core/trainer/src/tests/mod.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Test tree for the trainer crate

#[cfg(test)]
mod replay_tests;
#[cfg(test)]
mod network_tests;
#[cfg(test)]
mod metrics_tests;
