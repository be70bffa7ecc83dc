//! Bayesian multi-segment power-law rating curves.
//!
//! A rating curve maps river stage to discharge. This crate implements the
//! segmented power law `q = exp(a + sum_i w[i] * b_i(h))` on a log-z
//! discharge scale, where each segment's basis `b_i` switches on above its
//! breakpoint and freezes above the next one (Reitan et al. 2019). The
//! breakpoints are parameters with an ordered prior, so samplers can locate
//! them.
//!
//! # Pipeline
//!
//! ```text
//!  ┌──────────────┐     ┌────────────────┐     ┌──────────────────┐     ┌──────────────┐
//!  │ Observations │────▶│  ReitanRating  │────▶│ InferenceEngine  │────▶│   predict    │
//!  │  (q, h, σq)  │     │ (priors, log p)│     │ (PosteriorTrace) │     │ (RatingTable)│
//!  └──────────────┘     └────────────────┘     └──────────────────┘     └──────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use ratingcurve_model::{Observations, PosteriorModel, RatingConfig, ReitanRating};
//!
//! let obs = Observations::new(
//!     vec![1.0, 2.0, 4.0, 8.0, 16.0],
//!     vec![1.0, 2.0, 3.0, 4.0, 5.0],
//!     None,
//! )
//! .unwrap();
//! let model = ReitanRating::new(&obs, &RatingConfig::new(1)).unwrap();
//!
//! assert_eq!(model.dim(), 4);
//! assert!(model.log_density(&model.initial_point()).is_finite());
//! ```

pub mod basis;
pub mod config;
pub mod density;
pub mod engine;
pub mod error;
pub mod observations;
pub mod ordered;
pub mod params;
pub mod predict;
pub mod prior;
pub mod rating_table;
pub mod reitan;
pub mod trace;

pub use basis::{basis_matrix, linear_predictor, segment_basis, segment_offsets};
pub use config::RatingConfig;
pub use engine::{Chain, InferenceEngine, PosteriorModel};
pub use error::ModelError;
pub use observations::Observations;
pub use params::{ParameterLayout, RatingParameters};
pub use predict::stage_grid;
pub use prior::{BreakpointPrior, PriorConfig};
pub use rating_table::RatingTable;
pub use reitan::ReitanRating;
pub use trace::PosteriorTrace;
