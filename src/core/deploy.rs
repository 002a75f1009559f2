//! Deployment orchestration: validate, log in, apply every pipeline in
//! order, verify, fetch, fingerprint.
//!
//! Runs strictly sequentially. Any failure aborts the run; there is no
//! partial result and no fingerprint for a failed deployment.

use std::path::{Path, PathBuf};

use crate::api::PipelineLister;
use crate::checksum;
use crate::error::{Error, Result};
use crate::fly::FlyCommand;
use crate::request::{MetadataField, OutRequest, OutResponse, PipelineSpec};
use crate::session::Session;

/// A pipeline's configuration as the server reports it after apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedPipeline {
    pub name: String,
    pub config: Vec<u8>,
}

pub struct Deployer<'a> {
    fly: &'a dyn FlyCommand,
    sources_dir: PathBuf,
}

impl<'a> Deployer<'a> {
    /// `sources_dir` is the directory pipeline config and vars paths are relative to.
    pub fn new(fly: &'a dyn FlyCommand, sources_dir: impl Into<PathBuf>) -> Self {
        Self {
            fly,
            sources_dir: sources_dir.into(),
        }
    }

    pub fn run(&self, request: &OutRequest, lister: &dyn PipelineLister) -> Result<OutResponse> {
        let pipelines = request.validate()?;
        let session = Session::open(self.fly, &request.source)?;

        let mut unpaused = Vec::new();
        for pipeline in pipelines {
            self.apply(pipeline)?;

            if pipeline.should_unpause(request.params.unpause) {
                log_status!("deploy", "Unpausing {}", pipeline.name);
                self.fly.unpause_pipeline(&pipeline.name)?;
                unpaused.push(pipeline.name.as_str());
            }
        }

        verify_applied(lister, session.team(), pipelines)?;

        let applied = self.fetch_all(pipelines)?;
        let version = checksum::version_for(applied.iter().map(|p| &p.config));
        log_status!("deploy", "Pipelines checksum {}", version.pipelines_checksum);

        Ok(OutResponse {
            version,
            metadata: metadata(&request.source.target, session.team(), pipelines, &unpaused),
        })
    }

    fn apply(&self, pipeline: &PipelineSpec) -> Result<()> {
        let config_path = resolve(&self.sources_dir, &pipeline.config_file);
        let vars_paths: Vec<PathBuf> = pipeline
            .vars_files
            .iter()
            .map(|vars| resolve(&self.sources_dir, vars))
            .collect();

        log_status!(
            "deploy",
            "Applying {} from {}",
            pipeline.name,
            config_path.display()
        );
        self.fly
            .set_pipeline(&pipeline.name, &config_path, &vars_paths)?;
        Ok(())
    }

    fn fetch_all(&self, pipelines: &[PipelineSpec]) -> Result<Vec<AppliedPipeline>> {
        pipelines
            .iter()
            .map(|pipeline| {
                Ok(AppliedPipeline {
                    name: pipeline.name.clone(),
                    config: self.fly.get_pipeline(&pipeline.name)?,
                })
            })
            .collect()
    }
}

/// Join a request path onto the sources directory. Absolute paths win.
pub fn resolve(sources_dir: &Path, relative: &str) -> PathBuf {
    sources_dir.join(relative)
}

/// Every applied pipeline must appear in the server's listing.
fn verify_applied(
    lister: &dyn PipelineLister,
    team: &str,
    pipelines: &[PipelineSpec],
) -> Result<()> {
    let existing = lister.pipelines(team)?;

    for pipeline in pipelines {
        if !existing.iter().any(|p| p.name == pipeline.name) {
            return Err(Error::pipeline_not_found(&pipeline.name, team));
        }
    }

    Ok(())
}

fn metadata(
    target: &str,
    team: &str,
    pipelines: &[PipelineSpec],
    unpaused: &[&str],
) -> Vec<MetadataField> {
    let names: Vec<&str> = pipelines.iter().map(|p| p.name.as_str()).collect();

    let mut fields = vec![
        MetadataField::new("target", target),
        MetadataField::new("team", team),
        MetadataField::new("pipelines", names.join(", ")),
    ];

    if !unpaused.is_empty() {
        fields.push(MetadataField::new("unpaused", unpaused.join(", ")));
    }

    fields
}
