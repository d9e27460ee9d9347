use std::convert::Infallible;

use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct Version;

#[async_trait::async_trait]
impl crate::cli::op::Op for Version {
    type Error = Infallible;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        Ok(format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::op::{Op, OpContext};
    use pods::Config;

    #[tokio::test]
    async fn test_reports_package_version() {
        let output = Version.execute(&OpContext::new(Config::default())).await.unwrap();
        assert_eq!(output, format!("pods-cli {}", env!("CARGO_PKG_VERSION")));
    }
}
