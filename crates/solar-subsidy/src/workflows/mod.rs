pub mod applications;
pub mod estimator;
