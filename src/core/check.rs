//! Version of what is currently on the server, without applying anything.

use crate::checksum;
use crate::error::Result;
use crate::fly::FlyCommand;
use crate::request::{Source, Version};
use crate::session::Session;

/// Fingerprint every pipeline in the team, in `fly pipelines` order.
///
/// Returns a single-element list, the shape CI servers expect from `check`.
pub fn current_version(fly: &dyn FlyCommand, source: &Source) -> Result<Vec<Version>> {
    let session = Session::open(fly, source)?;

    let mut configs = Vec::new();
    for name in session.list()? {
        configs.push(fly.get_pipeline(&name)?);
    }

    Ok(vec![checksum::version_for(&configs)])
}
