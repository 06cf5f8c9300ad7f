// Path and File Name : /home/decepticloud/core/deception/src/tests/mod.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Test tree for the deception environment crate

#[cfg(test)]
mod registry_tests;
#[cfg(test)]
mod reward_tests;
#[cfg(test)]
mod teardown_tests;
#[cfg(test)]
mod integration_tests;
