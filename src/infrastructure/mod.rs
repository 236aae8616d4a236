pub mod collaborators;

pub use collaborators::{
    EventBusNotifier, FanoutNotifier, RecordingLogger, RecordingNotifier, TracingLogger,
    TracingNotifier,
};
