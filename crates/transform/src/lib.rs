//! Modelling-scale transforms for stage and discharge.
//!
//! Discharge spans orders of magnitude, so rating models work on a
//! log-standardised scale and report summaries back in discharge units.
//! Every transform here is fitted once from reference data and is then
//! immutable; missing values (NaN) are ignored when fitting and pass through
//! unchanged when transforming.
//!
//! # Pipeline
//!
//! ```text
//!  ┌──────────────┐     ┌────────────────┐     ┌──────────────────┐
//!  │     fit      │────▶│   transform    │────▶│   untransform    │
//!  │ (reference)  │     │ (model scale)  │     │ (mean / sigma)   │
//!  └──────────────┘     └────────────────┘     └──────────────────┘
//! ```
//!
//! [`Dmatrix`] builds natural cubic regression spline design matrices over
//! stage for spline-based rating models.
//!
//! # Quick start
//!
//! ```rust
//! use ratingcurve_transform::{LogZTransform, Transform};
//!
//! let q = [1.0, 2.0, 4.0, 8.0, 16.0];
//! let t = LogZTransform::fit(&q).unwrap();
//! let z = t.transform(&q).unwrap();
//! let back = t.untransform(&z);
//! assert!((back[4] - 16.0).abs() < 1e-9);
//! ```

pub mod error;
pub mod log_z;
pub mod spline;
pub mod transform;
pub mod unit;
pub mod z;

pub use error::TransformError;
pub use log_z::LogZTransform;
pub use spline::{Dmatrix, SplineForm};
pub use transform::Transform;
pub use unit::UnitTransform;
pub use z::ZTransform;
