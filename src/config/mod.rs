mod settings;

pub use settings::{Command, Config, MergeCli};
