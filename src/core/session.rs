//! An authenticated fly session and the single-shot operations run on it.

use serde::Serialize;

use crate::error::Result;
use crate::fly::{listing, FlyCommand};
use crate::request::Source;

/// Fly after a successful `login` + `sync` against one source.
pub struct Session<'a> {
    fly: &'a dyn FlyCommand,
    team: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub name: String,
    pub config: String,
}

impl<'a> Session<'a> {
    /// Validate the source and log in. Fails before running fly if any
    /// required source field is empty.
    pub fn open(fly: &'a dyn FlyCommand, source: &Source) -> Result<Self> {
        source.validate()?;
        let team = source.team_name();

        log_status!("session", "Logging in to {} (team {})", source.target, team);
        fly.login(
            &source.target,
            &team,
            &source.username,
            &source.password,
            source.insecure,
        )?;

        Ok(Self { fly, team })
    }

    pub fn team(&self) -> &str {
        &self.team
    }

    /// Pipeline names with the listing's blank trailing entry removed.
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(listing::non_empty(self.fly.pipelines()?))
    }

    pub fn get(&self, name: &str) -> Result<PipelineConfig> {
        let config = self.fly.get_pipeline(name)?;
        Ok(PipelineConfig {
            name: name.to_string(),
            config: String::from_utf8_lossy(&config).into_owned(),
        })
    }

    pub fn destroy(&self, name: &str) -> Result<String> {
        log_status!("session", "Destroying pipeline {}", name);
        let output = self.fly.destroy_pipeline(name)?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}
