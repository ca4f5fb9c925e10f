pub mod fetch;
pub mod fund;
pub mod portfolio;
pub mod settings;
pub mod stats;
pub mod trunk;
pub mod view;
