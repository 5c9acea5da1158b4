//! External collaborators behind trait seams: camera, landmark detector,
//! emotion classifier, input hooks, notification and report sinks.

pub mod camera;
pub mod classifier;
pub mod detector;
pub mod input;
pub mod notifier;
pub mod report;
