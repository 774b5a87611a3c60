pub mod dashboard;

pub use dashboard::{charge_color, DashboardRenderer};
