#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use pipeline_deploy::api::{ApiPipeline, PipelineLister};
use pipeline_deploy::error::ToolCommandFailedDetails;
use pipeline_deploy::fly::FlyConn;
use pipeline_deploy::request::{OutParams, OutRequest, PipelineSpec, Source};
use pipeline_deploy::{Error, Result};

/// In-memory fly: records every argument vector and scripts outputs.
#[derive(Default)]
pub struct FakeConn {
    calls: RefCell<Vec<Vec<String>>>,
    configs: HashMap<String, String>,
    listing: String,
    failures: Vec<(String, Option<String>)>,
}

impl FakeConn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content returned by `get-pipeline -p <name>`.
    pub fn with_config(mut self, name: &str, config: &str) -> Self {
        self.configs.insert(name.to_string(), config.to_string());
        self
    }

    /// Stdout returned by `pipelines`.
    pub fn with_listing(mut self, listing: &str) -> Self {
        self.listing = listing.to_string();
        self
    }

    /// Fail `action`, or only `action -p <pipeline>` when a pipeline is given.
    pub fn failing(mut self, action: &str, pipeline: Option<&str>) -> Self {
        self.failures
            .push((action.to_string(), pipeline.map(str::to_string)));
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c[0].clone()).collect()
    }

    pub fn calls_for(&self, action: &str) -> Vec<Vec<String>> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c[0] == action)
            .cloned()
            .collect()
    }

    fn should_fail(&self, args: &[String]) -> bool {
        self.failures.iter().any(|(action, pipeline)| {
            args[0] == *action
                && pipeline
                    .as_ref()
                    .map_or(true, |name| pipeline_arg(args) == Some(name.as_str()))
        })
    }
}

fn pipeline_arg(args: &[String]) -> Option<&str> {
    args.iter()
        .position(|a| a == "-p")
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

impl FlyConn for FakeConn {
    fn run(&self, args: &[String]) -> Result<Vec<u8>> {
        self.calls.borrow_mut().push(args.to_vec());

        if self.should_fail(args) {
            return Err(Error::tool_command_failed(
                format!("fly {} failed: exit status: 1 - boom", args[0]),
                ToolCommandFailedDetails {
                    command: args.join(" "),
                    exit_code: 1,
                    stdout: String::new(),
                    stderr: "boom".to_string(),
                },
            ));
        }

        let output = match args[0].as_str() {
            "get-pipeline" => pipeline_arg(args)
                .and_then(|name| self.configs.get(name))
                .cloned()
                .unwrap_or_default(),
            "pipelines" => self.listing.clone(),
            _ => String::new(),
        };

        Ok(output.into_bytes())
    }
}

/// Lister returning a fixed set of names, or a fixed error.
pub struct FakeLister {
    result: std::result::Result<Vec<ApiPipeline>, Error>,
    pub teams: RefCell<Vec<String>>,
}

impl FakeLister {
    pub fn with_names(names: &[&str]) -> Self {
        Self {
            result: Ok(names
                .iter()
                .map(|name| ApiPipeline {
                    name: name.to_string(),
                    url: format!("/teams/main/pipelines/{}", name),
                })
                .collect()),
            teams: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(err: Error) -> Self {
        Self {
            result: Err(err),
            teams: RefCell::new(Vec::new()),
        }
    }
}

impl PipelineLister for FakeLister {
    fn pipelines(&self, team: &str) -> Result<Vec<ApiPipeline>> {
        self.teams.borrow_mut().push(team.to_string());
        self.result.clone()
    }
}

pub const PIPELINE_1: &str = "---\npipeline1: foo\n";
pub const PIPELINE_2: &str = "---\npipeline2: foo\n";
pub const PIPELINE_3: &str = "---\npipeline3: foo\n";

pub fn source() -> Source {
    Source {
        target: "https://ci.example.com".to_string(),
        team: None,
        username: "some user".to_string(),
        password: "some password".to_string(),
        insecure: false,
    }
}

pub fn request(pipelines: Vec<PipelineSpec>) -> OutRequest {
    OutRequest {
        source: source(),
        params: OutParams {
            pipelines: Some(pipelines),
            unpause: false,
        },
    }
}

pub fn two_pipelines() -> Vec<PipelineSpec> {
    vec![
        PipelineSpec::new("pipeline-1", "pipeline_1.yml"),
        PipelineSpec::new("pipeline-2", "pipeline_2.yml"),
    ]
}

pub fn server_conn() -> FakeConn {
    FakeConn::new()
        .with_config("pipeline-1", PIPELINE_1)
        .with_config("pipeline-2", PIPELINE_2)
        .with_config("pipeline-3", PIPELINE_3)
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
