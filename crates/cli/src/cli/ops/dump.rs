use clap::Args;
use serde_json::json;

use pods::{Cluster, ConfigError, Resource, StoreError};

/// Build a small populated store and print its property maps
#[derive(Args, Debug, Clone)]
pub struct Dump {
    #[arg(long, default_value = "http://cluster.local")]
    pub cluster: String,

    #[arg(long, default_value = "http://pod1.local")]
    pub pod: String,

    /// Number of sample pages to create
    #[arg(long, default_value_t = 3)]
    pub pages: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Dump {
    type Error = DumpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let cluster = Cluster::with_config(&self.cluster, ctx.config.clone())?;
        let (pod, _) = cluster.new_pod(&self.pod);

        let mut pages = Vec::with_capacity(self.pages + 1);
        for i in 0..self.pages {
            let page = pod.new_page();
            page.set_content("text/plain", format!("sample page {i}"), None)
                .into_result()?;
            page.properties().set("title", format!("Page {i}"))?;
            pages.push(page);
        }

        let profile = pod.new_data_page();
        profile.properties().set("name", "sample user")?;
        pages.push(profile);

        let pages: Vec<_> = pages
            .iter()
            .map(|page| page.properties().to_map())
            .collect();
        let dump = json!({
            "cluster": cluster.properties().to_map(),
            "pod": pod.properties().to_map(),
            "pages": pages,
        });
        Ok(serde_json::to_string_pretty(&dump)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::cli::op::{Op, OpContext};
    use pods::Config;

    #[tokio::test]
    async fn test_dump_lists_every_page() {
        let op = Dump {
            cluster: "http://c.local".to_string(),
            pod: "http://p.local".to_string(),
            pages: 2,
        };
        let output = op.execute(&OpContext::new(Config::default())).await.unwrap();
        let dump: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(dump["cluster"]["_podCount"], 1);
        assert_eq!(dump["pod"]["_pageCount"], 3);
        assert_eq!(dump["pages"][1]["title"], "Page 1");
        assert_eq!(dump["pages"][2]["name"], "sample user");
        assert!(dump["pages"][2].get("_content").is_none());
    }
}
