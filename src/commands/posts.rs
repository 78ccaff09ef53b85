//! Generate static post pages

use anyhow::Result;

use crate::generator::{GenerateReport, Generator};
use crate::Site;

pub fn run(site: &Site) -> Result<GenerateReport> {
    Generator::new(site)?.generate()
}
