/*!
# OMEGA DevKit - Test doubles and utilities for the controller

Library that keeps the controller test suites short:
- Scripted link establisher and recording sync peer (no external systems needed)
- Operation builders for well-formed and malformed requests
- Test harness wiring a controller to the doubles, with polling helpers
*/

pub mod builders;
pub mod doubles;
pub mod test_utils;

pub use builders::OperationBuilder;
pub use doubles::{RecordingPeer, ScriptedLinks};
pub use test_utils::{fast_config, init_tracing, TestHarness};
