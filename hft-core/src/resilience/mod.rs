//! Failure-containment primitives: the risk gate's kill switch lives here,
//! separate from the pipeline-wide cancellation token in `engine`.

pub mod kill_switch;

pub use kill_switch::KillSwitch;
