//! Request pipeline module
//!
//! The ordered middleware composition feeding the router. Stage order is an
//! explicit list of descriptors evaluated by a fixed runner, so the order is
//! a visible property rather than a registration-order convention.

pub mod cors;
pub mod decode;

pub use cors::CorsPolicy;

use crate::config::HttpConfig;
use crate::error::PipelineError;
use crate::http::{Request, ResponseBuilder};

/// Outcome of a pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Hand the request to the next stage (or the router)
    Continue,
    /// The response is complete; remaining stages and the router are skipped
    Halt,
}

/// A pipeline stage descriptor. Each variant carries its own policy so the
/// stage list fully describes the pipeline.
pub enum Stage {
    /// Cross-origin policy filter (short-circuits preflights)
    CrossOrigin(CorsPolicy),
    /// JSON body decoder with a byte limit on the raw payload
    DecodeBody { limit: u64 },
}

impl Stage {
    fn run(&self, req: &mut Request, resp: &mut ResponseBuilder) -> Result<Flow, PipelineError> {
        match self {
            Self::CrossOrigin(policy) => Ok(cors::apply(policy, req, resp)),
            Self::DecodeBody { limit } => {
                decode::decode(req, *limit)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Stage name for logging and tests
    pub fn name(&self) -> &'static str {
        match self {
            Self::CrossOrigin(_) => "cross-origin",
            Self::DecodeBody { .. } => "decode-body",
        }
    }
}

/// The ordered stage list plus the runner that evaluates it.
///
/// Every request passes through the stages in order exactly once; a stage
/// either continues, halts with a finished response, or fails with a
/// `PipelineError`. No stage re-enters the pipeline.
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// The standard composition: cross-origin filter, then body decoder.
    /// The filter is omitted when cross-origin handling is disabled.
    pub fn from_config(http: &HttpConfig) -> Self {
        let mut stages = Vec::new();
        if http.enable_cors {
            stages.push(Stage::CrossOrigin(CorsPolicy::default()));
        }
        stages.push(Stage::DecodeBody {
            limit: http.max_body_size,
        });
        Self::new(stages)
    }

    /// Run all stages in order. Stops at the first `Halt` or error.
    pub fn run(
        &self,
        req: &mut Request,
        resp: &mut ResponseBuilder,
    ) -> Result<Flow, PipelineError> {
        for stage in &self.stages {
            if stage.run(req, resp)? == Flow::Halt {
                return Ok(Flow::Halt);
            }
        }
        Ok(Flow::Continue)
    }

    /// Stage names in evaluation order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }
}
