mod settings;

pub use settings::{
    CategorySettings, HourBasis, Settings, TargetSettings, ThemeSettings, ViewSettings,
};
