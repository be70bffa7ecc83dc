//! Multi-segment power-law rating with the Reitan parameterisation.

use ndarray::Array2;
use ratingcurve_transform::{LogZTransform, Transform};
use tracing::{debug, info};

use crate::basis::{basis_matrix, linear_predictor, segment_offsets};
use crate::config::RatingConfig;
use crate::density::{FixedPriors, SLOPE_MU, normal_ln_pdf};
use crate::engine::{Chain, InferenceEngine, PosteriorModel};
use crate::error::ModelError;
use crate::observations::{Observations, check_stage, check_uncertainty, log_uncertainty};
use crate::ordered::is_strictly_increasing;
use crate::params::{ParameterLayout, RatingParameters};
use crate::prior::BreakpointPrior;
use crate::trace::{BREAKPOINTS, INTERCEPT, PosteriorTrace, SCALE, SLOPES};

/// Starting residual scale on the log-z discharge scale.
const INITIAL_SIGMA: f64 = 0.5;

/// A multi-segment power-law rating model.
///
/// Discharge is modelled on the log-z scale as
/// `y ~ Normal(a + sum_i w[i] * b_i(h), sigma + q_sigma_log)` where `b_i` is
/// the piecewise log basis of [`crate::basis`] and the breakpoints `hs` carry
/// an ordered prior.
///
/// Priors: `w[i] ~ Normal(1.6, 0.5)`, `a ~ Normal(0, 2)`,
/// `sigma ~ HalfCauchy(0.1)`, `hs` per [`BreakpointPrior`].
#[derive(Debug, Clone)]
pub struct ReitanRating {
    name: String,
    layout: ParameterLayout,
    q: Vec<f64>,
    q_transform: LogZTransform,
    y: Vec<f64>,
    h: Vec<f64>,
    q_sigma_log: Vec<f64>,
    offsets: Vec<f64>,
    prior: BreakpointPrior,
    fixed: FixedPriors,
    init: Vec<f64>,
}

impl ReitanRating {
    /// Builds the model from observations.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`ModelError::InvalidSegments`] | `segments < 1` |
    /// | [`ModelError::InvalidPrior`] | unusable breakpoint prior parameters |
    /// | [`ModelError::Transform`] | discharge cannot be standardised (e.g. constant) |
    /// | [`ModelError::Distribution`] | a fixed prior cannot be constructed |
    #[tracing::instrument(skip_all, fields(name = config.name(), segments = config.segments(), n_obs = observations.len()))]
    pub fn new(observations: &Observations, config: &RatingConfig) -> Result<Self, ModelError> {
        config.validate()?;
        let segments = config.segments();
        let prior = config
            .prior()
            .resolve(observations.stage_range(), segments)?;

        let q = observations.discharge().to_vec();
        let q_transform = LogZTransform::fit(&q)?;
        let y = q_transform.transform(&q)?;
        let layout = ParameterLayout::new(segments);

        let mut init = vec![0.0; layout.dim()];
        for slot in layout.slopes() {
            init[slot] = SLOPE_MU;
        }
        let hs_init = prior.unconstrain(&prior.initial(segments))?;
        init[layout.breakpoints()].copy_from_slice(&hs_init);
        init[layout.log_scale()] = INITIAL_SIGMA.ln();

        debug!(prior = ?prior, "resolved breakpoint prior");
        info!(
            prior = config.prior().name(),
            dim = layout.dim(),
            "built rating model"
        );

        Ok(Self {
            name: config.name().to_string(),
            layout,
            q_sigma_log: observations.log_q_sigma(),
            h: observations.stage().to_vec(),
            q,
            q_transform,
            y,
            offsets: segment_offsets(segments),
            prior,
            fixed: FixedPriors::new()?,
            init,
        })
    }

    /// Replaces the observed stage and discharge uncertainty without
    /// rebuilding priors or structure.
    ///
    /// `q_sigma` is in discharge units; `None` means no uncertainty.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::LengthMismatch`] if either input differs in
    /// length from the observed discharge, [`ModelError::NonFiniteStage`] or
    /// [`ModelError::InvalidUncertainty`] for invalid values.
    pub fn set_observed_inputs(
        &mut self,
        h: &[f64],
        q_sigma: Option<&[f64]>,
    ) -> Result<(), ModelError> {
        let n = self.q.len();
        if h.len() != n {
            return Err(ModelError::LengthMismatch {
                field: "stage",
                expected: n,
                actual: h.len(),
            });
        }
        check_stage(h)?;
        if let Some(sigma) = q_sigma {
            check_uncertainty(sigma, n)?;
        }
        self.h = h.to_vec();
        self.q_sigma_log = log_uncertainty(&self.q, q_sigma);
        Ok(())
    }

    /// Returns the model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of segments.
    pub fn segments(&self) -> usize {
        self.layout.segments()
    }

    /// Returns the unconstrained parameter layout.
    pub fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    /// Returns the fitted discharge transform.
    pub fn q_transform(&self) -> &LogZTransform {
        &self.q_transform
    }

    /// Returns the modelling target: log-z transformed discharge.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Returns the observed stage.
    pub fn stage(&self) -> &[f64] {
        &self.h
    }

    /// Returns the discharge uncertainty on the log scale.
    pub fn q_sigma_log(&self) -> &[f64] {
        &self.q_sigma_log
    }

    /// Returns the per-segment log offsets.
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// Returns the resolved breakpoint prior.
    pub fn prior(&self) -> &BreakpointPrior {
        &self.prior
    }

    /// Maps an unconstrained vector to parameter values.
    pub fn constrain(&self, theta: &[f64]) -> RatingParameters {
        self.layout.constrain(theta, &self.prior)
    }

    /// Piecewise basis of shape `(segments, n_obs)` at the observed stages.
    pub fn basis(&self, hs: &[f64]) -> Array2<f64> {
        basis_matrix(&self.h, hs)
    }

    /// Log prior density of `params` on the natural scale.
    pub fn log_prior(&self, params: &RatingParameters) -> f64 {
        self.fixed.ln_intercept(params.a())
            + params
                .w()
                .iter()
                .map(|&w| self.fixed.ln_slope(w))
                .sum::<f64>()
            + self.prior.log_density(params.hs())
            + self.fixed.ln_scale(params.sigma())
    }

    /// Log likelihood of the observed discharge under `params`.
    ///
    /// Returns `-inf` if the breakpoints are not strictly increasing.
    pub fn log_likelihood(&self, params: &RatingParameters) -> f64 {
        if !is_strictly_increasing(params.hs()) {
            return f64::NEG_INFINITY;
        }
        self.h
            .iter()
            .zip(&self.y)
            .zip(&self.q_sigma_log)
            .map(|((&h, &y), &qs)| {
                let mu = linear_predictor(h, params.a(), params.w(), params.hs(), &self.offsets);
                normal_ln_pdf(y, mu, params.sigma() + qs)
            })
            .sum()
    }

    /// Samples the posterior with `engine` and returns the named trace.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Inference`] wrapping the engine's error, or
    /// [`ModelError::TraceShape`] if the engine returns draws of the wrong
    /// width.
    #[tracing::instrument(skip_all, fields(name = %self.name, segments = self.segments()))]
    pub fn sample<E: InferenceEngine + ?Sized>(
        &self,
        engine: &E,
    ) -> Result<PosteriorTrace, ModelError> {
        let chains = engine.sample(self).map_err(|e| ModelError::Inference {
            reason: e.to_string(),
        })?;
        let trace = self.trace_from_chains(&chains)?;
        info!(
            chains = trace.chains(),
            draws = trace.n_draws(),
            "posterior sampled"
        );
        Ok(trace)
    }

    /// Converts unconstrained chains into a named trace.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::TraceShape`] if any chain's width differs from
    /// the layout dimension.
    pub fn trace_from_chains(&self, chains: &[Chain]) -> Result<PosteriorTrace, ModelError> {
        let dim = self.layout.dim();
        let mut draws = Vec::new();
        for chain in chains {
            if chain.draws().ncols() != dim {
                return Err(ModelError::TraceShape {
                    name: "theta".to_string(),
                    what: "components",
                    expected: dim,
                    actual: chain.draws().ncols(),
                });
            }
            for row in chain.draws().rows() {
                let theta: Vec<f64> = row.to_vec();
                draws.push(self.constrain(&theta));
            }
        }

        let s = self.segments();
        let n = draws.len();
        Ok(PosteriorTrace::new(chains.len())
            .with_variable(INTERCEPT, Array2::from_shape_fn((n, 1), |(d, _)| draws[d].a()))
            .with_variable(SLOPES, Array2::from_shape_fn((n, s), |(d, i)| draws[d].w()[i]))
            .with_variable(
                BREAKPOINTS,
                Array2::from_shape_fn((n, s), |(d, i)| draws[d].hs()[i]),
            )
            .with_variable(SCALE, Array2::from_shape_fn((n, 1), |(d, _)| draws[d].sigma())))
    }
}

impl PosteriorModel for ReitanRating {
    fn dim(&self) -> usize {
        self.layout.dim()
    }

    fn log_density(&self, theta: &[f64]) -> f64 {
        if theta.len() != self.layout.dim() {
            return f64::NEG_INFINITY;
        }
        let params = self.constrain(theta);
        let log_sigma = theta[self.layout.log_scale()];

        // Prior terms on the unconstrained scale: breakpoints via their
        // ordered map, sigma via exp.
        let prior = self.fixed.ln_intercept(params.a())
            + params
                .w()
                .iter()
                .map(|&w| self.fixed.ln_slope(w))
                .sum::<f64>()
            + self
                .prior
                .log_density_unconstrained(&theta[self.layout.breakpoints()])
            + self.fixed.ln_scale(params.sigma())
            + log_sigma;
        if !prior.is_finite() {
            return f64::NEG_INFINITY;
        }

        let lp = prior + self.log_likelihood(&params);
        if lp.is_nan() { f64::NEG_INFINITY } else { lp }
    }

    fn initial_point(&self) -> Vec<f64> {
        self.init.clone()
    }

    fn parameter_names(&self) -> Vec<String> {
        self.layout.names()
    }
}
